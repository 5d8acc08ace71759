//! Error classification shared by the dispatch core and provider implementations.

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Trait for errors that can be classified as retryable or permanent.
///
/// Provider implementations classify their own failures; the dispatch core
/// only forwards the classification and never retries on its own.
///
/// 1. **In place** (`is_retryable`): the same operation against the same
///    provider may succeed if repeated. Network timeouts, rate limits.
///
/// 2. **Elsewhere** (`should_retry_operation`): the operation might succeed
///    through another provider, family, or destination.
///
/// # Examples
///
/// ```rust
/// use missive_dispatch::RetryableError;
///
/// enum GatewayError {
///     Timeout,
///     RecipientBlocked,
///     InvalidCredentials,
/// }
///
/// impl RetryableError for GatewayError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, GatewayError::Timeout)
///     }
///
///     fn should_retry_operation(&self) -> bool {
///         match self {
///             GatewayError::Timeout => true,
///             GatewayError::RecipientBlocked => true,
///             GatewayError::InvalidCredentials => false,
///         }
///     }
/// }
/// ```
pub trait RetryableError {
    /// Returns true if this error represents a transient failure
    /// that might succeed when the same call is repeated.
    fn is_retryable(&self) -> bool;

    /// Returns true if a fresh attempt elsewhere might succeed.
    ///
    /// Default implementation returns the same as `is_retryable()`.
    fn should_retry_operation(&self) -> bool {
        self.is_retryable()
    }
}

/// Opaque error returned by a provider implementation.
///
/// The dispatch core passes it through unchanged; the classification flags are
/// captured from the originating error when it is wrapped.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct ProviderError {
    #[source]
    source: Box<dyn StdError + Send + Sync>,
    is_retryable: bool,
    should_retry_operation: bool,
}

impl ProviderError {
    /// Wrap an error that knows its own retry classification.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + RetryableError + Send + Sync + 'static,
    {
        let is_retryable = error.is_retryable();
        let should_retry_operation = error.should_retry_operation();
        Self {
            source: Box::new(error),
            is_retryable,
            should_retry_operation,
        }
    }

    /// Wrap an error that should not be retried anywhere.
    pub fn permanent<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self {
            source: error.into(),
            is_retryable: false,
            should_retry_operation: false,
        }
    }

    /// Wrap an error that may succeed if the call is repeated.
    pub fn transient<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self {
            source: error.into(),
            is_retryable: true,
            should_retry_operation: true,
        }
    }

    /// Wrap an error that rules out this provider but not the operation.
    pub fn rejected<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self {
            source: error.into(),
            is_retryable: false,
            should_retry_operation: true,
        }
    }

    /// Attempt to view the wrapped error as a concrete type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref::<E>()
    }

    /// Consume the wrapper and return the original error.
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.source
    }
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        self.is_retryable
    }

    fn should_retry_operation(&self) -> bool {
        self.should_retry_operation
    }
}

/// Result alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Plain message error for collaborators that have nothing richer to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMessage(pub String);

impl fmt::Display for ProviderMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for ProviderMessage {}
