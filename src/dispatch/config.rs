//! Dispatcher configuration types.

use super::selector::{SelectionPolicy, Selector};
use std::sync::Arc;

/// Configuration for the [`Dispatcher`](super::Dispatcher).
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Chooses among providers that survived the geo filter.
    pub selector: Arc<dyn Selector>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            selector: SelectionPolicy::default().into_selector(),
        }
    }
}

impl DispatcherConfig {
    /// Create a new builder for DispatcherConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use missive_dispatch::dispatch::{DispatcherConfig, SelectionPolicy};
    ///
    /// let config = DispatcherConfig::builder()
    ///     .policy(SelectionPolicy::RoundRobin)
    ///     .build();
    ///
    /// assert!(format!("{:?}", config.selector).contains("RoundRobin"));
    /// ```
    pub fn builder() -> DispatcherConfigBuilder {
        DispatcherConfigBuilder::default()
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.selector = policy.into_selector();
        self
    }

    pub fn with_selector<S: Selector + 'static>(mut self, selector: S) -> Self {
        self.selector = Arc::new(selector);
        self
    }
}

/// Builder for DispatcherConfig.
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfigBuilder {
    pub(crate) selector: Option<Arc<dyn Selector>>,
}

impl DispatcherConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a built-in selection policy.
    ///
    /// Default: `FirstMatch`
    pub fn policy(mut self, policy: SelectionPolicy) -> Self {
        self.selector = Some(policy.into_selector());
        self
    }

    /// Use a custom selector.
    pub fn selector<S: Selector + 'static>(mut self, selector: S) -> Self {
        self.selector = Some(Arc::new(selector));
        self
    }

    pub fn build(self) -> DispatcherConfig {
        DispatcherConfig {
            selector: self
                .selector
                .unwrap_or_else(|| SelectionPolicy::default().into_selector()),
        }
    }
}
