//! Provider factories, keyed by the `kind` named in configuration.

use super::config::ProviderSettings;
use crate::capability::ProviderBindings;
use crate::errors::ProviderError;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Builds the implementation of one provider kind from its settings.
pub trait ProviderFactory: Send + Sync {
    /// Name used in the `kind` field of provider entries.
    fn kind(&self) -> &str;

    /// Settings keys that must be present; checked before `build`.
    fn required_config_keys(&self) -> &[&str] {
        &[]
    }

    fn build(&self, settings: &ProviderSettings) -> Result<ProviderBindings, ProviderError>;
}

type BuildFn = Box<dyn Fn(&ProviderSettings) -> Result<ProviderBindings, ProviderError> + Send + Sync>;

struct FnFactory {
    kind: String,
    required: Vec<&'static str>,
    build: BuildFn,
}

impl ProviderFactory for FnFactory {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn required_config_keys(&self) -> &[&str] {
        &self.required
    }

    fn build(&self, settings: &ProviderSettings) -> Result<ProviderBindings, ProviderError> {
        (self.build)(settings)
    }
}

/// Set of known provider kinds.
///
/// Which providers exist is decided entirely by configuration; this only maps
/// a `kind` to the code that can build it.
///
/// # Example
///
/// ```rust
/// use missive_dispatch::capability::ProviderBindings;
/// use missive_dispatch::registry::ProviderFactories;
///
/// let mut factories = ProviderFactories::new();
/// factories.register_fn("noop", &[], |_settings| Ok(ProviderBindings::new()));
/// assert!(factories.contains("noop"));
/// ```
#[derive(Clone, Default)]
pub struct ProviderFactories {
    factories: HashMap<String, Arc<dyn ProviderFactory>>,
}

impl ProviderFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under its own `kind`, replacing any previous one.
    pub fn register<F: ProviderFactory + 'static>(&mut self, factory: F) -> &mut Self {
        self.factories
            .insert(factory.kind().to_string(), Arc::new(factory));
        self
    }

    /// Register a closure as the factory for `kind`.
    pub fn register_fn<F>(
        &mut self,
        kind: impl Into<String>,
        required_config_keys: &[&'static str],
        build: F,
    ) -> &mut Self
    where
        F: Fn(&ProviderSettings) -> Result<ProviderBindings, ProviderError> + Send + Sync + 'static,
    {
        self.register(FnFactory {
            kind: kind.into(),
            required: required_config_keys.to_vec(),
            build: Box::new(build),
        })
    }

    pub fn get(&self, kind: &str) -> Option<&Arc<dyn ProviderFactory>> {
        self.factories.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Debug for ProviderFactories {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.kinds().collect();
        kinds.sort_unstable();
        f.debug_struct("ProviderFactories")
            .field("kinds", &kinds)
            .finish()
    }
}
