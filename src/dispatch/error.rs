//! Dispatch error types.

use crate::capability::{Family, Operation};
use crate::errors::{ProviderError, RetryableError};
use thiserror::Error;

/// Errors returned by [`Dispatcher::dispatch`](super::Dispatcher::dispatch).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No provider in the registry declares the family.
    #[error("No provider registered for family {family}")]
    NoProviderForFamily { family: Family },

    /// Providers declare the family but none covers the destination.
    #[error("No {family} provider covers destination {destination} ({candidates} excluded by scope)")]
    NoProviderForDestination {
        family: Family,
        destination: String,
        /// Providers removed by the geo filter.
        candidates: usize,
    },

    /// The destination is not a country code known to the dataset.
    #[error("Unknown destination country '{destination}'")]
    UnknownDestination { destination: String },

    /// The pinned provider does not exist or does not serve the family.
    #[error("Provider '{provider_id}' is not registered for family {family}")]
    ProviderNotFound { provider_id: String, family: Family },

    /// The selector declined every candidate.
    #[error("Selector chose none of {candidates} {family} provider(s)")]
    NoProviderSelected { family: Family, candidates: usize },

    /// The chosen provider has no callable for the operation.
    #[error("Provider '{provider_id}' has no {} callable", operation.method_name(*family))]
    MissingOperation {
        provider_id: String,
        family: Family,
        operation: Operation,
    },

    /// The provider ran the operation and failed. The source is untouched.
    #[error("Provider '{provider_id}' failed: {source}")]
    Provider {
        provider_id: String,
        #[source]
        source: ProviderError,
    },
}

impl DispatchError {
    /// Provider that handled the request, when one was reached.
    pub fn provider_id(&self) -> Option<&str> {
        match self {
            DispatchError::Provider { provider_id, .. }
            | DispatchError::MissingOperation { provider_id, .. } => Some(provider_id),
            _ => None,
        }
    }

    /// Stable label for the failure kind, used in metrics.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            DispatchError::NoProviderForFamily { .. } => "no_provider_for_family",
            DispatchError::NoProviderForDestination { .. } => "no_provider_for_destination",
            DispatchError::UnknownDestination { .. } => "unknown_destination",
            DispatchError::ProviderNotFound { .. } => "provider_not_found",
            DispatchError::NoProviderSelected { .. } => "no_provider_selected",
            DispatchError::MissingOperation { .. } => "missing_operation",
            DispatchError::Provider { .. } => "provider_error",
        }
    }
}

impl RetryableError for DispatchError {
    fn is_retryable(&self) -> bool {
        match self {
            DispatchError::Provider { source, .. } => source.is_retryable(),
            DispatchError::NoProviderForFamily { .. }
            | DispatchError::NoProviderForDestination { .. }
            | DispatchError::UnknownDestination { .. }
            | DispatchError::ProviderNotFound { .. }
            | DispatchError::NoProviderSelected { .. }
            | DispatchError::MissingOperation { .. } => false,
        }
    }

    fn should_retry_operation(&self) -> bool {
        match self {
            DispatchError::Provider { source, .. } => source.should_retry_operation(),
            DispatchError::NoProviderForFamily { .. }
            | DispatchError::NoProviderForDestination { .. } => true,
            DispatchError::UnknownDestination { .. }
            | DispatchError::ProviderNotFound { .. }
            | DispatchError::NoProviderSelected { .. }
            | DispatchError::MissingOperation { .. } => false,
        }
    }
}
