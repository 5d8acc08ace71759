//! Capability contract.
//!
//! Every family requires the same seven operations. A provider declares the
//! families it serves and attaches one operation table per family; the
//! registry refuses to load a provider whose tables leave any declared
//! `(family, operation)` pair unbound.
//!
//! Tables come from a complete [`Channel`] implementation or are assembled
//! callable by callable with [`ChannelBindings`]:
//!
//! ```rust
//! use missive_dispatch::capability::{verify_bindings, ChannelBindings, ProviderBindings};
//! use missive_dispatch::{Family, Operation, SendReceipt};
//!
//! let sms = ChannelBindings::new()
//!     .on_send(|payload, _ctx| async move { Ok(SendReceipt::new(payload.recipient)) });
//! let bindings = ProviderBindings::new().with_channel(Family::Sms, sms);
//!
//! let err = verify_bindings("gateway", [Family::Sms], &bindings).unwrap_err();
//! assert_eq!(err.gaps.len(), 6);
//! assert!(err.contains(Family::Sms, Operation::Cancel));
//! ```

pub(crate) mod bindings;
pub(crate) mod context;
pub(crate) mod error;
pub(crate) mod family;
pub(crate) mod operation;
pub mod probe;
pub(crate) mod traits;
pub(crate) mod verify;

pub use bindings::{ChannelBindings, ProviderBindings};
pub use context::InvocationContext;
pub use error::{CapabilityError, CapabilityGap, MissingCapability};
pub use family::{Family, FamilyCapability, UnknownFamily};
pub use operation::{Operation, OperationOutcome, OperationRequest};
pub use probe::{ProbeFixtures, ProbeReport, ProbeResult, probe};
pub use traits::Channel;
pub use verify::{verify, verify_bindings};
