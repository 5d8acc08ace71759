//! Loaded provider descriptor.

use super::config::ProviderSettings;
use crate::capability::{Family, ProviderBindings};
use crate::geo::GeoScope;
use std::collections::{BTreeSet, HashMap};

/// A provider as seen by the dispatch core.
///
/// Only [`ProviderRegistry::load`](super::ProviderRegistry::load) creates
/// descriptors, so every descriptor has passed capability verification and
/// carries a resolved scope for each declared family.
#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    pub(crate) id: String,
    pub(crate) kind: String,
    pub(crate) supported_types: BTreeSet<Family>,
    pub(crate) scopes: HashMap<Family, GeoScope>,
    pub(crate) settings: ProviderSettings,
    pub(crate) priority: i32,
    pub(crate) implementation: ProviderBindings,
}

impl ProviderDescriptor {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn supported_types(&self) -> &BTreeSet<Family> {
        &self.supported_types
    }

    pub fn supports(&self, family: Family) -> bool {
        self.supported_types.contains(&family)
    }

    pub fn scope(&self, family: Family) -> Option<&GeoScope> {
        self.scopes.get(&family)
    }

    /// Whether this provider may deliver `family` to the ISO alpha-2 destination.
    pub fn covers(&self, family: Family, destination_iso2: &str) -> bool {
        self.scope(family)
            .is_some_and(|scope| scope.evaluate(destination_iso2))
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn implementation(&self) -> &ProviderBindings {
        &self.implementation
    }
}
