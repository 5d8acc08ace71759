//! Provider registry implementation.

use super::config::{ProviderConfig, ProviderSettings, RegistryConfig};
use super::descriptor::ProviderDescriptor;
use super::error::{LoadIssue, LoadReport, RegistryError};
use super::factory::ProviderFactories;
use crate::capability::{Family, verify_bindings};
use crate::geo::{CountryDataset, GeoError, GeoScope, ScopeInput};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

/// Immutable set of verified providers.
///
/// Built in one step by [`ProviderRegistry::load`], which either yields a
/// registry in which every provider passed capability and scope checks, or an
/// error listing every problem found. There is no partially loaded state.
///
/// # Example
///
/// ```rust
/// use missive_dispatch::capability::{ChannelBindings, ProviderBindings};
/// use missive_dispatch::geo::CountryDataset;
/// use missive_dispatch::registry::{ProviderFactories, ProviderRegistry, RegistryConfig};
/// use missive_dispatch::Family;
///
/// let mut factories = ProviderFactories::new();
/// factories.register_fn("half", &[], |_| {
///     Ok(ProviderBindings::new().with_channel(Family::Sms, ChannelBindings::new()))
/// });
///
/// let config = RegistryConfig::from_json_str(
///     r#"{"providers": [{"kind": "half", "supported_types": ["sms"], "sms_geo": "Atlantis"}]}"#,
/// ).unwrap();
///
/// let err = ProviderRegistry::load(&config, &factories, CountryDataset::embedded()).unwrap_err();
/// // One scope issue plus one capability issue listing all seven operations.
/// assert!(err.to_string().contains("Atlantis"));
/// assert!(err.to_string().contains("validate_sms_webhook_signature"));
/// ```
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<ProviderDescriptor>,
    by_id: HashMap<String, usize>,
    by_family: BTreeMap<Family, Vec<usize>>,
    dataset: Arc<CountryDataset>,
}

impl ProviderRegistry {
    /// Registry with no providers.
    pub fn empty(dataset: Arc<CountryDataset>) -> Self {
        Self {
            providers: Vec::new(),
            by_id: HashMap::new(),
            by_family: BTreeMap::new(),
            dataset,
        }
    }

    /// Build, scope-resolve, and verify every configured provider.
    ///
    /// All entries are checked even after a failure, so the returned
    /// [`LoadReport`] is exhaustive.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ProviderRegistry::load",
            skip_all,
            fields(providers = config.providers.len())
        )
    )]
    pub fn load(
        config: &RegistryConfig,
        factories: &ProviderFactories,
        dataset: Arc<CountryDataset>,
    ) -> Result<Self, RegistryError> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        let mut registry = Self::empty(Arc::clone(&dataset));

        for entry in &config.providers {
            let provider_id = entry.provider_id();
            if !seen.insert(provider_id.clone()) {
                issues.push(LoadIssue::DuplicateProviderId { provider_id });
                continue;
            }

            match load_entry(&provider_id, entry, factories, &dataset) {
                Ok(descriptor) => {
                    #[cfg(feature = "tracing")]
                    debug!(
                        provider_id = %descriptor.id,
                        families = descriptor.supported_types.len(),
                        "Provider loaded"
                    );
                    registry.insert(descriptor);
                }
                Err(mut entry_issues) => issues.append(&mut entry_issues),
            }
        }

        if !issues.is_empty() {
            #[cfg(feature = "tracing")]
            warn!(issues = issues.len(), "Provider registry rejected");
            return Err(RegistryError::Load(LoadReport::new(issues)));
        }

        #[cfg(feature = "tracing")]
        info!(providers = registry.len(), "Provider registry loaded");

        Ok(registry)
    }

    /// Read a JSON configuration file and load it.
    pub fn load_path(
        path: impl AsRef<std::path::Path>,
        factories: &ProviderFactories,
        dataset: Arc<CountryDataset>,
    ) -> Result<Self, RegistryError> {
        let file = std::fs::File::open(path)?;
        let config = RegistryConfig::from_reader(std::io::BufReader::new(file))?;
        Self::load(&config, factories, dataset)
    }

    fn insert(&mut self, descriptor: ProviderDescriptor) {
        let index = self.providers.len();
        self.by_id.insert(descriptor.id.clone(), index);
        for family in &descriptor.supported_types {
            self.by_family.entry(*family).or_default().push(index);
        }
        self.providers.push(descriptor);
    }

    pub fn get(&self, provider_id: &str) -> Option<&ProviderDescriptor> {
        self.by_id.get(provider_id).map(|i| &self.providers[*i])
    }

    /// Like [`get`](Self::get), as an error.
    pub fn require(&self, provider_id: &str) -> Result<&ProviderDescriptor, RegistryError> {
        self.get(provider_id).ok_or_else(|| RegistryError::NotFound {
            provider_id: provider_id.to_string(),
        })
    }

    /// Providers declaring `family`, in configuration order.
    pub fn list_by_family(&self, family: Family) -> Vec<&ProviderDescriptor> {
        self.by_family
            .get(&family)
            .map(|indices| indices.iter().map(|i| &self.providers[*i]).collect())
            .unwrap_or_default()
    }

    /// Provider ids grouped by family, each group in configuration order.
    pub fn families(&self) -> BTreeMap<Family, Vec<&str>> {
        self.by_family
            .iter()
            .map(|(family, indices)| {
                let ids = indices
                    .iter()
                    .map(|i| self.providers[*i].id.as_str())
                    .collect();
                (*family, ids)
            })
            .collect()
    }

    pub fn dataset(&self) -> &Arc<CountryDataset> {
        &self.dataset
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// All providers in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter()
    }
}

fn load_entry(
    provider_id: &str,
    entry: &ProviderConfig,
    factories: &ProviderFactories,
    dataset: &CountryDataset,
) -> Result<ProviderDescriptor, Vec<LoadIssue>> {
    let mut issues = Vec::new();

    let mut supported_types = BTreeSet::new();
    for tag in &entry.supported_types {
        match tag.parse::<Family>() {
            Ok(family) => {
                supported_types.insert(family);
            }
            Err(source) => issues.push(LoadIssue::UnknownFamily {
                provider_id: provider_id.to_string(),
                source,
            }),
        }
    }

    let mut scopes = HashMap::new();
    for family in &supported_types {
        match resolve_scope(entry, *family, dataset) {
            Ok(scope) => {
                scopes.insert(*family, scope);
            }
            Err(source) => issues.push(LoadIssue::InvalidScope {
                provider_id: provider_id.to_string(),
                family: *family,
                source,
            }),
        }
    }

    let settings = ProviderSettings::new(provider_id, entry.kind.as_str(), entry.settings());

    let implementation = match factories.get(&entry.kind) {
        None => {
            issues.push(LoadIssue::UnknownProviderKind {
                provider_id: provider_id.to_string(),
                kind: entry.kind.clone(),
            });
            None
        }
        Some(factory) => {
            let missing: Vec<&str> = factory
                .required_config_keys()
                .iter()
                .copied()
                .filter(|key| !settings.contains(key))
                .collect();

            if missing.is_empty() {
                match factory.build(&settings) {
                    Ok(bindings) => Some(bindings),
                    Err(source) => {
                        issues.push(LoadIssue::Build {
                            provider_id: provider_id.to_string(),
                            source,
                        });
                        None
                    }
                }
            } else {
                issues.extend(missing.into_iter().map(|key| LoadIssue::MissingConfigKey {
                    provider_id: provider_id.to_string(),
                    key: key.to_string(),
                }));
                None
            }
        }
    };

    if let Some(bindings) = &implementation {
        if let Err(missing) = verify_bindings(provider_id, supported_types.iter().copied(), bindings)
        {
            issues.push(missing.into());
        }
    }

    match implementation {
        Some(implementation) if issues.is_empty() => Ok(ProviderDescriptor {
            id: provider_id.to_string(),
            kind: entry.kind.clone(),
            supported_types,
            scopes,
            settings,
            priority: entry.priority,
            implementation,
        }),
        _ => Err(issues),
    }
}

fn resolve_scope(
    entry: &ProviderConfig,
    family: Family,
    dataset: &CountryDataset,
) -> Result<GeoScope, GeoError> {
    let value = entry.geo(family).ok_or(GeoError::Unconfigured)?;
    let input: ScopeInput =
        serde_json::from_value(value.clone()).map_err(|_| GeoError::InvalidScopeToken {
            token: value.to_string(),
        })?;
    GeoScope::resolve(&input, dataset)
}
