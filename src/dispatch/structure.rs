//! Dispatcher implementation.

use super::config::DispatcherConfig;
use super::error::DispatchError;
use super::request::{DispatchRequest, Dispatched};
use crate::geo::CountryDataset;
use crate::registry::{ProviderRegistry, RegistryHandle};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::{Span, debug, warn};
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Routes operations to providers.
///
/// Each call runs `FamilyLookup → GeoFilter → Select → Invoke` against the
/// registry snapshot current when the call started. The dispatcher never
/// retries and never enforces the request deadline; both are left to the
/// caller and the provider.
///
/// # Example
///
/// ```rust,ignore
/// use missive_dispatch::dispatch::{Dispatcher, DispatchRequest};
/// use missive_dispatch::{Family, MessagePayload};
///
/// let dispatcher = Dispatcher::with_registry(registry);
/// let dispatched = dispatcher
///     .dispatch(DispatchRequest::send(Family::Sms, "US", MessagePayload::new("+15550100")))
///     .await?;
/// println!("sent via {}", dispatched.provider_id);
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: RegistryHandle,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(registry: impl Into<RegistryHandle>, config: DispatcherConfig) -> Self {
        Self {
            registry: registry.into(),
            config,
        }
    }

    /// Create a dispatcher with default configuration.
    pub fn with_registry(registry: impl Into<RegistryHandle>) -> Self {
        Self::new(registry, DispatcherConfig::default())
    }

    /// Handle used to swap the registry; shared with every clone of this dispatcher.
    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Route one operation and return the provider's outcome.
    ///
    /// Provider errors come back as [`DispatchError::Provider`] with the
    /// original error as source.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "Dispatcher::dispatch",
            skip_all,
            fields(
                family = %request.family,
                destination = %request.destination,
                operation = %request.operation.operation(),
                provider_id = tracing::field::Empty,
            )
        )
    )]
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<Dispatched, DispatchError> {
        #[cfg(feature = "metrics")]
        let (family, operation) = (request.family, request.operation.operation());

        let registry = self.registry.snapshot();
        let result = self.route(&registry, request).await;

        #[cfg(feature = "metrics")]
        crate::metrics::record_dispatch(
            family,
            operation,
            match &result {
                Ok(_) => "ok",
                Err(e) => e.outcome_label(),
            },
        );

        #[cfg(feature = "tracing")]
        {
            match &result {
                Ok(dispatched) => {
                    Span::current()
                        .record("provider_id", dispatched.provider_id.as_str())
                        .set_status(Status::Ok);
                }
                Err(e) => {
                    let span = Span::current();
                    if let Some(provider_id) = e.provider_id() {
                        span.record("provider_id", provider_id);
                    }
                    span.set_status(Status::error(e.to_string()));
                    warn!(error = %e, "Dispatch failed");
                }
            }
        }

        result
    }

    async fn route(
        &self,
        registry: &Arc<ProviderRegistry>,
        request: DispatchRequest,
    ) -> Result<Dispatched, DispatchError> {
        let family = request.family;

        // FamilyLookup
        let mut candidates = registry.list_by_family(family);
        if candidates.is_empty() {
            return Err(DispatchError::NoProviderForFamily { family });
        }

        if let Some(pinned) = &request.provider {
            candidates.retain(|p| p.id() == pinned);
            if candidates.is_empty() {
                return Err(DispatchError::ProviderNotFound {
                    provider_id: pinned.clone(),
                    family,
                });
            }
        }

        // GeoFilter
        let destination = destination_iso2(registry.dataset(), &request.destination)?;
        let before = candidates.len();
        candidates.retain(|p| p.covers(family, &destination));

        #[cfg(feature = "tracing")]
        debug!(
            candidates = candidates.len(),
            excluded = before - candidates.len(),
            "Geo filter applied"
        );

        if candidates.is_empty() {
            return Err(DispatchError::NoProviderForDestination {
                family,
                destination,
                candidates: before,
            });
        }

        // Select
        let chosen = self
            .config
            .selector
            .select(&request, &candidates)
            .ok_or(DispatchError::NoProviderSelected {
                family,
                candidates: candidates.len(),
            })?;
        let provider_id = chosen.id().to_string();
        let operation = request.operation.operation();

        // Invoke
        let call = chosen
            .implementation()
            .channel(family)
            .and_then(|channel| channel.invoke(request.operation, request.context))
            .ok_or_else(|| DispatchError::MissingOperation {
                provider_id: provider_id.clone(),
                family,
                operation,
            })?;

        match call.await {
            Ok(outcome) => Ok(Dispatched {
                provider_id,
                outcome,
            }),
            Err(source) => Err(DispatchError::Provider {
                provider_id,
                source,
            }),
        }
    }
}

/// Normalize a destination to an ISO alpha-2 code known to the dataset.
fn destination_iso2(dataset: &CountryDataset, destination: &str) -> Result<String, DispatchError> {
    dataset
        .by_code(destination)
        .map(|country| country.iso2.clone())
        .ok_or_else(|| DispatchError::UnknownDestination {
            destination: destination.to_string(),
        })
}
