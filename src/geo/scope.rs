//! Geo scope declarations and their resolved, evaluable form.

use super::dataset::{CountryDataset, CountryRecord};
use super::error::GeoError;
use crate::utils::normalize::code;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

#[cfg(feature = "tracing")]
use tracing::debug;

/// Token that lifts every geographic restriction.
pub const WILDCARD: &str = "*";

/// Raw scope declaration as it appears in configuration.
///
/// Accepts `"*"`, a comma-separated string, or a list of tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScopeInput {
    Text(String),
    List(Vec<String>),
}

impl ScopeInput {
    /// Trimmed, non-empty tokens in declaration order.
    pub fn tokens(&self) -> Vec<String> {
        let parts: Box<dyn Iterator<Item = &str>> = match self {
            ScopeInput::Text(text) => Box::new(text.split(',')),
            ScopeInput::List(items) => Box::new(items.iter().map(String::as_str)),
        };
        parts
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl From<&str> for ScopeInput {
    fn from(text: &str) -> Self {
        ScopeInput::Text(text.to_string())
    }
}

impl From<String> for ScopeInput {
    fn from(text: String) -> Self {
        ScopeInput::Text(text)
    }
}

impl From<Vec<String>> for ScopeInput {
    fn from(items: Vec<String>) -> Self {
        ScopeInput::List(items)
    }
}

impl From<Vec<&str>> for ScopeInput {
    fn from(items: Vec<&str>) -> Self {
        ScopeInput::List(items.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ScopeInput {
    fn from(items: [&str; N]) -> Self {
        ScopeInput::List(items.iter().map(|s| s.to_string()).collect())
    }
}

/// What a single token resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenMatch<'a> {
    Country(&'a CountryRecord),
    Region(&'a str),
    Subregion(&'a str),
}

/// Classify one token. ISO codes first, then names, then regions, then subregions.
fn classify<'a>(token: &str, dataset: &'a CountryDataset) -> Option<TokenMatch<'a>> {
    if let Some(country) = dataset.by_code(token) {
        return Some(TokenMatch::Country(country));
    }
    if let Some(country) = dataset.by_name(token) {
        return Some(TokenMatch::Country(country));
    }
    if let Some(mut members) = dataset.in_region(token) {
        return members.next().map(|c| TokenMatch::Region(c.region.as_str()));
    }
    if let Some(mut members) = dataset.in_subregion(token) {
        return members
            .next()
            .and_then(|c| c.subregion())
            .map(TokenMatch::Subregion);
    }
    None
}

/// Countries covered by a restricted scope, with the tokens that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    countries: BTreeSet<String>,
    regions: BTreeSet<String>,
    subregions: BTreeSet<String>,
    members: BTreeSet<String>,
}

impl Coverage {
    /// ISO2 codes named directly (by code or by name).
    pub fn countries(&self) -> &BTreeSet<String> {
        &self.countries
    }

    pub fn regions(&self) -> &BTreeSet<String> {
        &self.regions
    }

    pub fn subregions(&self) -> &BTreeSet<String> {
        &self.subregions
    }

    /// Every ISO2 code the scope admits.
    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    fn contains(&self, iso2: &str) -> bool {
        self.members.contains(iso2)
    }
}

/// Shape of a resolved scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Unrestricted,
    CountrySet,
    RegionSet,
    SubregionSet,
    Mixed,
}

/// Resolved geographic eligibility of a provider for one family.
///
/// Immutable once built. `Unrestricted` admits every destination; the
/// restricted variants admit exactly their coverage members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoScope {
    Unrestricted,
    CountrySet(Coverage),
    RegionSet(Coverage),
    SubregionSet(Coverage),
    Mixed(Coverage),
}

impl GeoScope {
    /// Resolve a raw declaration against the dataset.
    ///
    /// A `*` token anywhere makes the scope unrestricted and the remaining
    /// tokens are not examined. An empty declaration is an error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "GeoScope::resolve", skip_all, fields(input = ?input))
    )]
    pub fn resolve(input: &ScopeInput, dataset: &CountryDataset) -> Result<Self, GeoError> {
        Self::resolve_tokens(input.tokens(), dataset)
    }

    /// Resolve already-split tokens.
    pub fn resolve_tokens<I, S>(tokens: I, dataset: &CountryDataset) -> Result<Self, GeoError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<S> = tokens.into_iter().collect();
        let tokens: Vec<&str> = tokens
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.is_empty() {
            return Err(GeoError::Unconfigured);
        }

        if tokens.contains(&WILDCARD) {
            #[cfg(feature = "tracing")]
            if tokens.len() > 1 {
                debug!(
                    ignored = tokens.len() - 1,
                    "Wildcard present, other scope tokens ignored"
                );
            }
            return Ok(GeoScope::Unrestricted);
        }

        let mut coverage = Coverage::default();
        for token in tokens {
            match classify(token, dataset) {
                Some(TokenMatch::Country(country)) => {
                    coverage.countries.insert(country.iso2.clone());
                    coverage.members.insert(country.iso2.clone());
                }
                Some(TokenMatch::Region(region)) => {
                    if coverage.regions.insert(region.to_string()) {
                        let members = dataset.in_region(region).into_iter().flatten();
                        coverage.members.extend(members.map(|c| c.iso2.clone()));
                    }
                }
                Some(TokenMatch::Subregion(subregion)) => {
                    if coverage.subregions.insert(subregion.to_string()) {
                        let members = dataset.in_subregion(subregion).into_iter().flatten();
                        coverage.members.extend(members.map(|c| c.iso2.clone()));
                    }
                }
                None => {
                    return Err(GeoError::InvalidScopeToken {
                        token: token.to_string(),
                    });
                }
            }
        }

        let kind = match (
            coverage.countries.is_empty(),
            coverage.regions.is_empty(),
            coverage.subregions.is_empty(),
        ) {
            (false, true, true) => ScopeKind::CountrySet,
            (true, false, true) => ScopeKind::RegionSet,
            (true, true, false) => ScopeKind::SubregionSet,
            _ => ScopeKind::Mixed,
        };

        #[cfg(feature = "tracing")]
        debug!(kind = ?kind, members = coverage.members.len(), "Geo scope resolved");

        Ok(match kind {
            ScopeKind::CountrySet => GeoScope::CountrySet(coverage),
            ScopeKind::RegionSet => GeoScope::RegionSet(coverage),
            ScopeKind::SubregionSet => GeoScope::SubregionSet(coverage),
            _ => GeoScope::Mixed(coverage),
        })
    }

    /// Whether a destination (ISO alpha-2, any case) is eligible.
    pub fn evaluate(&self, destination_iso2: &str) -> bool {
        match self.coverage() {
            None => true,
            Some(coverage) => coverage.contains(&code(destination_iso2)),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        match self {
            GeoScope::Unrestricted => ScopeKind::Unrestricted,
            GeoScope::CountrySet(_) => ScopeKind::CountrySet,
            GeoScope::RegionSet(_) => ScopeKind::RegionSet,
            GeoScope::SubregionSet(_) => ScopeKind::SubregionSet,
            GeoScope::Mixed(_) => ScopeKind::Mixed,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, GeoScope::Unrestricted)
    }

    /// Coverage of a restricted scope; `None` when unrestricted.
    pub fn coverage(&self) -> Option<&Coverage> {
        match self {
            GeoScope::Unrestricted => None,
            GeoScope::CountrySet(c)
            | GeoScope::RegionSet(c)
            | GeoScope::SubregionSet(c)
            | GeoScope::Mixed(c) => Some(c),
        }
    }
}

impl Display for GeoScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Some(coverage) = self.coverage() else {
            return f.write_str(WILDCARD);
        };
        let tokens: Vec<&str> = coverage
            .countries
            .iter()
            .chain(&coverage.regions)
            .chain(&coverage.subregions)
            .map(String::as_str)
            .collect();
        f.write_str(&tokens.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> std::sync::Arc<CountryDataset> {
        CountryDataset::embedded()
    }

    #[test]
    fn test_input_shapes_normalize_to_same_tokens() {
        let text = ScopeInput::from(" FR , Germany,,");
        let list = ScopeInput::from(vec![" FR", "Germany ", ""]);
        assert_eq!(text.tokens(), vec!["FR", "Germany"]);
        assert_eq!(text.tokens(), list.tokens());
    }

    #[test]
    fn test_input_deserializes_from_string_or_list() {
        let text: ScopeInput = serde_json::from_str(r#""FR, DE""#).unwrap();
        let list: ScopeInput = serde_json::from_str(r#"["FR", "DE"]"#).unwrap();
        assert_eq!(text.tokens(), list.tokens());
    }

    #[test]
    fn test_wildcard_is_unrestricted() {
        let scope = GeoScope::resolve(&"*".into(), &dataset()).unwrap();
        assert!(scope.is_unrestricted());
        assert_eq!(scope.kind(), ScopeKind::Unrestricted);
        assert!(scope.evaluate("US"));
        assert!(scope.evaluate("aq"));
    }

    #[test]
    fn test_wildcard_dominates_invalid_tokens() {
        let scope = GeoScope::resolve(&["FR", "Atlantis", "*"].into(), &dataset()).unwrap();
        assert!(scope.is_unrestricted());
    }

    #[test]
    fn test_empty_declaration_is_unconfigured() {
        assert_eq!(
            GeoScope::resolve(&" , ".into(), &dataset()),
            Err(GeoError::Unconfigured)
        );
        assert_eq!(
            GeoScope::resolve(&ScopeInput::List(vec![]), &dataset()),
            Err(GeoError::Unconfigured)
        );
    }

    #[test]
    fn test_iso_codes() {
        let scope = GeoScope::resolve(&"fr, DEU".into(), &dataset()).unwrap();
        assert_eq!(scope.kind(), ScopeKind::CountrySet);
        assert!(scope.evaluate("FR"));
        assert!(scope.evaluate("de"));
        assert!(!scope.evaluate("ES"));
    }

    #[test]
    fn test_country_names_ignore_case() {
        let scope = GeoScope::resolve(&"SPAIN".into(), &dataset()).unwrap();
        assert_eq!(scope.kind(), ScopeKind::CountrySet);
        assert!(scope.evaluate("ES"));
    }

    #[test]
    fn test_region_token() {
        let data = dataset();
        let scope = GeoScope::resolve(&"europe".into(), &data).unwrap();
        assert_eq!(scope.kind(), ScopeKind::RegionSet);
        assert!(scope.coverage().unwrap().regions().contains("Europe"));
        for country in data.iter() {
            assert_eq!(
                scope.evaluate(&country.iso2),
                country.region == "Europe",
                "{}",
                country.iso2
            );
        }
    }

    #[test]
    fn test_subregion_token() {
        let scope = GeoScope::resolve(&"North America".into(), &dataset()).unwrap();
        assert_eq!(scope.kind(), ScopeKind::SubregionSet);
        assert!(scope.evaluate("US"));
        assert!(scope.evaluate("CA"));
        assert!(!scope.evaluate("BR"));
    }

    #[test]
    fn test_overlapping_tokens_union_without_error() {
        let scope = GeoScope::resolve(&["FR", "Western Europe"].into(), &dataset()).unwrap();
        assert_eq!(scope.kind(), ScopeKind::Mixed);
        assert!(scope.evaluate("FR"));
        assert!(scope.evaluate("BE"));
        let coverage = scope.coverage().unwrap();
        assert_eq!(
            coverage.members().iter().filter(|c| *c == "FR").count(),
            1
        );
    }

    #[test]
    fn test_invalid_token_reported() {
        let err = GeoScope::resolve(&"FR, Atlantis".into(), &dataset()).unwrap_err();
        assert_eq!(
            err,
            GeoError::InvalidScopeToken {
                token: "Atlantis".into()
            }
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let data = dataset();
        let input: ScopeInput = "Americas, JP, Northern Europe".into();
        let first = GeoScope::resolve(&input, &data).unwrap();
        let second = GeoScope::resolve(&input, &data).unwrap();
        assert_eq!(first, second);
        for country in data.iter() {
            assert_eq!(first.evaluate(&country.iso2), second.evaluate(&country.iso2));
        }
    }

    #[test]
    fn test_display() {
        let data = dataset();
        assert_eq!(GeoScope::Unrestricted.to_string(), "*");
        let scope = GeoScope::resolve(&"Western Europe, fr".into(), &data).unwrap();
        assert_eq!(scope.to_string(), "FR, Western Europe");
    }
}
