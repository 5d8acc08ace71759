//! Registry error types.

use crate::capability::{Family, MissingCapability, UnknownFamily};
use crate::errors::ProviderError;
use crate::geo::GeoError;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// One problem found while loading the registry.
#[derive(Debug, Error)]
pub enum LoadIssue {
    /// Two entries resolve to the same provider id.
    #[error("Duplicate provider id '{provider_id}'")]
    DuplicateProviderId { provider_id: String },

    /// `supported_types` names a family that does not exist.
    #[error("Provider '{provider_id}': {source}")]
    UnknownFamily {
        provider_id: String,
        #[source]
        source: UnknownFamily,
    },

    /// No factory registered for the entry's `kind`.
    #[error("Provider '{provider_id}': unknown provider kind '{kind}'")]
    UnknownProviderKind { provider_id: String, kind: String },

    /// A settings key required by the factory is absent.
    #[error("Provider '{provider_id}': missing required config key '{key}'")]
    MissingConfigKey { provider_id: String, key: String },

    /// A family's scope declaration could not be resolved.
    #[error("Provider '{provider_id}', family {family}: {source}")]
    InvalidScope {
        provider_id: String,
        family: Family,
        #[source]
        source: GeoError,
    },

    /// The factory failed to build the implementation.
    #[error("Provider '{provider_id}': build failed: {source}")]
    Build {
        provider_id: String,
        #[source]
        source: ProviderError,
    },

    #[error(transparent)]
    MissingCapability(#[from] MissingCapability),
}

impl LoadIssue {
    pub fn provider_id(&self) -> &str {
        match self {
            LoadIssue::DuplicateProviderId { provider_id }
            | LoadIssue::UnknownFamily { provider_id, .. }
            | LoadIssue::UnknownProviderKind { provider_id, .. }
            | LoadIssue::MissingConfigKey { provider_id, .. }
            | LoadIssue::InvalidScope { provider_id, .. }
            | LoadIssue::Build { provider_id, .. } => provider_id,
            LoadIssue::MissingCapability(missing) => &missing.provider_id,
        }
    }
}

/// Every issue found by one load attempt.
#[derive(Debug)]
pub struct LoadReport {
    issues: Vec<LoadIssue>,
}

impl LoadReport {
    pub(crate) fn new(issues: Vec<LoadIssue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[LoadIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<LoadIssue> {
        self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn missing_capabilities(&self) -> impl Iterator<Item = &MissingCapability> {
        self.issues.iter().filter_map(|issue| match issue {
            LoadIssue::MissingCapability(missing) => Some(missing),
            _ => None,
        })
    }

    pub fn scope_errors(&self) -> impl Iterator<Item = (&str, Family, &GeoError)> {
        self.issues.iter().filter_map(|issue| match issue {
            LoadIssue::InvalidScope {
                provider_id,
                family,
                source,
            } => Some((provider_id.as_str(), *family, source)),
            _ => None,
        })
    }
}

impl Display for LoadReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Registry load failed with {} issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadReport {}

/// Registry-level errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Configuration was rejected; no registry was produced.
    #[error("{0}")]
    Load(#[from] LoadReport),

    #[error("Provider '{provider_id}' not found")]
    NotFound { provider_id: String },

    #[error("Invalid registry configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Failed to read registry configuration: {0}")]
    Io(#[from] std::io::Error),
}
