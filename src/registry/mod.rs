//! Provider registry.
//!
//! Which providers exist, which families each serves, and where each may
//! deliver are all read from a [`RegistryConfig`]. Code only contributes
//! [`ProviderFactories`] that know how to build a provider `kind`.

pub(crate) mod config;
pub(crate) mod descriptor;
pub(crate) mod error;
pub(crate) mod factory;
pub(crate) mod handle;
pub(crate) mod structure;

pub use config::{ProviderConfig, ProviderSettings, RegistryConfig, provider_id_from_kind};
pub use descriptor::ProviderDescriptor;
pub use error::{LoadIssue, LoadReport, RegistryError};
pub use factory::{ProviderFactories, ProviderFactory};
pub use handle::RegistryHandle;
pub use structure::ProviderRegistry;
