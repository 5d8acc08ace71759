//! Dispatch core.
//!
//! ```text
//! DispatchRequest
//!        │
//!        ▼
//!  FamilyLookup ── none ──▶ NoProviderForFamily
//!        │
//!   (pinned id) ── absent ─▶ ProviderNotFound
//!        │
//!   GeoFilter ── none ────▶ NoProviderForDestination
//!        │
//!    Select (Selector)
//!        │
//!    Invoke ── error ─────▶ DispatchError::Provider { provider_id, source }
//!        │
//!        ▼
//!    Dispatched { provider_id, outcome }
//! ```

pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod request;
pub(crate) mod selector;
pub(crate) mod structure;

pub use config::{DispatcherConfig, DispatcherConfigBuilder};
pub use error::DispatchError;
pub use request::{DispatchRequest, Dispatched};
#[cfg(feature = "random")]
pub use selector::RandomChoice;
pub use selector::{FirstMatch, HighestPriority, RoundRobin, SelectionPolicy, Selector};
pub use structure::Dispatcher;
