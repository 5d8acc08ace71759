//! Geographic scope resolution.
//!
//! A provider declares, per family, where it may deliver using tokens such as
//! `"*"`, `"FR"`, `"DEU"`, `"Spain"`, `"Europe"`, or `"North America"`.
//! [`GeoScope::resolve`] turns such a declaration into an immutable predicate
//! over destination ISO alpha-2 codes, using a [`CountryDataset`].
//!
//! Token classification order: ISO alpha-2 / alpha-3 code, country name,
//! region, subregion. Names win over regions when both would match.
//!
//! ```rust
//! use missive_dispatch::geo::{CountryDataset, GeoScope, ScopeInput};
//!
//! let dataset = CountryDataset::embedded();
//! let scope = GeoScope::resolve(&ScopeInput::from("FR, Western Europe"), &dataset).unwrap();
//! assert!(scope.evaluate("fr"));
//! assert!(scope.evaluate("BE"));
//! assert!(!scope.evaluate("US"));
//! ```

pub(crate) mod dataset;
pub(crate) mod error;
pub(crate) mod scope;

pub use dataset::{CountryDataset, CountryRecord};
pub use error::{DatasetError, GeoError};
pub use scope::{Coverage, GeoScope, ScopeInput, ScopeKind, WILDCARD};
