//! Shared, swappable registry snapshot.

use super::config::RegistryConfig;
use super::error::RegistryError;
use super::factory::ProviderFactories;
use super::structure::ProviderRegistry;
use std::sync::Arc;
use tokio::sync::watch;

#[cfg(feature = "tracing")]
use tracing::info;

/// Publishes the current registry to dispatchers and subscribers.
///
/// Readers take an `Arc` snapshot and keep using it for as long as they need;
/// a replacement never mutates a snapshot already handed out.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    tx: Arc<watch::Sender<Arc<ProviderRegistry>>>,
}

impl RegistryHandle {
    pub fn new(registry: ProviderRegistry) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(registry));
        Self { tx: Arc::new(tx) }
    }

    /// Current registry.
    pub fn snapshot(&self) -> Arc<ProviderRegistry> {
        Arc::clone(&self.tx.borrow())
    }

    /// Install a new registry, returning the previous one.
    pub fn replace(&self, registry: ProviderRegistry) -> Arc<ProviderRegistry> {
        let previous = self.tx.send_replace(Arc::new(registry));
        #[cfg(feature = "tracing")]
        info!(
            previous = previous.len(),
            current = self.tx.borrow().len(),
            "Provider registry replaced"
        );
        previous
    }

    /// Load `config` against the current dataset and install it.
    ///
    /// On failure the current registry stays in place.
    pub fn reload(
        &self,
        config: &RegistryConfig,
        factories: &ProviderFactories,
    ) -> Result<Arc<ProviderRegistry>, RegistryError> {
        let dataset = Arc::clone(self.snapshot().dataset());
        let registry = ProviderRegistry::load(config, factories, dataset)?;
        Ok(self.replace(registry))
    }

    /// Receiver notified on every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ProviderRegistry>> {
        self.tx.subscribe()
    }
}

impl From<ProviderRegistry> for RegistryHandle {
    fn from(registry: ProviderRegistry) -> Self {
        Self::new(registry)
    }
}
