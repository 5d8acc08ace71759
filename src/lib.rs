//! # Missive Dispatch
//!
//! Provider-agnostic routing core for multi-channel notifications.
//!
//! Providers (postal, email, SMS, push, voice, branded, notification,
//! registered e-mail, RCS) are declared in configuration, verified against a
//! per-family capability contract when the registry loads, and selected per
//! request by family and destination country.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use missive_dispatch::capability::ProviderBindings;
//! use missive_dispatch::dispatch::{DispatchRequest, Dispatcher};
//! use missive_dispatch::geo::CountryDataset;
//! use missive_dispatch::registry::{ProviderFactories, ProviderRegistry, RegistryConfig};
//! use missive_dispatch::{Family, MessagePayload};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut factories = ProviderFactories::new();
//!     factories.register_fn("gateway", &["api_key"], |settings| {
//!         let sms = Arc::new(GatewaySms::new(settings.get_str("api_key").unwrap_or_default()));
//!         Ok(ProviderBindings::new().bind(Family::Sms, sms))
//!     });
//!
//!     let config = RegistryConfig::from_path("providers.json")?;
//!     let registry = ProviderRegistry::load(&config, &factories, CountryDataset::embedded())?;
//!     let dispatcher = Dispatcher::with_registry(registry);
//!
//!     let dispatched = dispatcher
//!         .dispatch(DispatchRequest::send(Family::Sms, "US", MessagePayload::new("+15550100")))
//!         .await?;
//!     println!("sent via {}", dispatched.provider_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! RegistryConfig ──load──▶ ProviderRegistry ◀──swap── RegistryHandle
//!   (<family>_geo)              │   (GeoScope per family,
//!                               │    verified ProviderBindings)
//!                               ▼
//!                          Dispatcher ──Selector──▶ Channel / ChannelBindings
//! ```
//!
//! ## Features
//!
//! - `tracing` - OpenTelemetry tracing instrumentation (enabled by default)
//! - `metrics` - OpenTelemetry dispatch counters
//! - `random` - `RandomChoice` selection policy (enabled by default)

pub mod capability;
pub mod dispatch;
pub mod errors;
pub mod geo;
#[cfg(feature = "metrics")]
mod metrics;
pub mod registry;
pub mod types;
mod utils;

// Re-export commonly used types at the crate root
pub use capability::{Channel, Family, InvocationContext, Operation, OperationOutcome, OperationRequest};
pub use dispatch::{DispatchError, DispatchRequest, Dispatched, Dispatcher, DispatcherConfig};
pub use errors::{ProviderError, ProviderMessage, ProviderResult, RetryableError};
pub use geo::{CountryDataset, GeoError, GeoScope, ScopeInput};
pub use registry::{ProviderRegistry, RegistryConfig, RegistryError, RegistryHandle};
pub use types::{
    CancelOutcome, DeliveryReport, MessageId, MessagePayload, MissiveStatus, ParsedEvent,
    RawEvent, RiskLevel, RiskScore, SendReceipt, ServiceInfo,
};
