//! Geographic scope and dataset errors.

use std::io;
use thiserror::Error;

/// Error resolving a geo scope declaration.
///
/// Both variants are configuration errors and are fatal at registry load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    /// A token matched no wildcard, ISO code, country name, region, or subregion.
    #[error("Invalid geo scope token '{token}'")]
    InvalidScopeToken { token: String },

    /// No scope was declared at all. An empty declaration is not "everywhere".
    #[error("Geo scope is not configured (use \"*\" for no restriction)")]
    Unconfigured,
}

/// Error loading the country dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read country dataset: {0}")]
    Io(#[from] io::Error),

    #[error("Country dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// An ISO code appears on more than one record.
    #[error("Duplicate country code '{code}' in dataset")]
    DuplicateCode { code: String },

    /// A record carries a malformed ISO code or an empty name.
    #[error("Invalid country record '{code}': {reason}")]
    InvalidRecord { code: String, reason: &'static str },
}
