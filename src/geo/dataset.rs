//! Country/region dataset used to resolve geo scope tokens.

use super::error::DatasetError;
use crate::utils::normalize::{code, fold, looks_like_code};
use keshvar::CountryIterator;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

/// Countries JSON embedded at compile time.
static COUNTRIES_JSON: &str = include_str!("../../assets/countries.json");

static EMBEDDED: Lazy<Arc<CountryDataset>> = Lazy::new(|| {
    Arc::new(CountryDataset::from_json_str(COUNTRIES_JSON).expect("countries.json is invalid"))
});

/// One country row of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub iso2: String,
    pub iso3: String,
    pub common_name: String,
    pub region: String,
    /// Empty for territories without a subregion (e.g. Antarctica).
    #[serde(default)]
    pub subregion: String,
}

impl CountryRecord {
    pub fn subregion(&self) -> Option<&str> {
        Some(self.subregion.as_str()).filter(|s| !s.is_empty())
    }
}

/// Read-only, indexed country table.
///
/// Built once and shared behind an `Arc`; nothing mutates it after
/// construction, so concurrent lookups need no locking.
#[derive(Debug, Clone)]
pub struct CountryDataset {
    records: Vec<CountryRecord>,
    by_iso2: HashMap<String, usize>,
    by_iso3: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    /// ISO short names known to keshvar that differ from the common name.
    by_alias: HashMap<String, usize>,
    by_region: HashMap<String, Vec<usize>>,
    by_subregion: HashMap<String, Vec<usize>>,
}

impl CountryDataset {
    /// Index a set of records.
    ///
    /// Codes are upper-cased; ISO2 and ISO3 codes must each be unique.
    pub fn new(records: Vec<CountryRecord>) -> Result<Self, DatasetError> {
        let mut dataset = Self {
            records: Vec::with_capacity(records.len()),
            by_iso2: HashMap::with_capacity(records.len()),
            by_iso3: HashMap::with_capacity(records.len()),
            by_name: HashMap::with_capacity(records.len()),
            by_alias: HashMap::new(),
            by_region: HashMap::new(),
            by_subregion: HashMap::new(),
        };

        for mut record in records {
            record.iso2 = code(&record.iso2);
            record.iso3 = code(&record.iso3);
            record.common_name = record.common_name.trim().to_string();
            record.region = record.region.trim().to_string();
            record.subregion = record.subregion.trim().to_string();

            if record.iso2.len() != 2 || !looks_like_code(&record.iso2) {
                return Err(DatasetError::InvalidRecord {
                    code: record.iso2,
                    reason: "iso2 must be two letters",
                });
            }
            if record.iso3.len() != 3 || !looks_like_code(&record.iso3) {
                return Err(DatasetError::InvalidRecord {
                    code: record.iso2,
                    reason: "iso3 must be three letters",
                });
            }
            if record.common_name.is_empty() {
                return Err(DatasetError::InvalidRecord {
                    code: record.iso2,
                    reason: "common name is empty",
                });
            }

            let idx = dataset.records.len();
            if dataset.by_iso2.insert(record.iso2.clone(), idx).is_some() {
                return Err(DatasetError::DuplicateCode { code: record.iso2 });
            }
            if dataset.by_iso3.insert(record.iso3.clone(), idx).is_some() {
                return Err(DatasetError::DuplicateCode { code: record.iso3 });
            }

            dataset
                .by_name
                .entry(fold(&record.common_name))
                .or_insert(idx);
            if !record.region.is_empty() {
                dataset
                    .by_region
                    .entry(fold(&record.region))
                    .or_default()
                    .push(idx);
            }
            if let Some(subregion) = record.subregion() {
                dataset
                    .by_subregion
                    .entry(fold(subregion))
                    .or_default()
                    .push(idx);
            }

            dataset.records.push(record);
        }

        for country in CountryIterator::new() {
            let alpha2 = country.alpha2().to_string();
            let Some(&idx) = dataset.by_iso2.get(&alpha2) else {
                continue;
            };
            let key = fold(country.iso_short_name());
            if !dataset.by_name.contains_key(&key) {
                dataset.by_alias.entry(key).or_insert(idx);
            }
        }

        Ok(dataset)
    }

    /// Shared instance built from the dataset bundled with the crate.
    pub fn embedded() -> Arc<CountryDataset> {
        Arc::clone(&EMBEDDED)
    }

    /// Parse a JSON array of country records.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let records: Vec<CountryRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let records: Vec<CountryRecord> = serde_json::from_reader(reader)?;
        Self::new(records)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryRecord> {
        self.records.iter()
    }

    /// Look up by ISO alpha-2 code, ignoring case.
    pub fn by_iso2(&self, iso2: &str) -> Option<&CountryRecord> {
        self.by_iso2.get(&code(iso2)).map(|&i| &self.records[i])
    }

    /// Look up by ISO alpha-3 code, ignoring case.
    pub fn by_iso3(&self, iso3: &str) -> Option<&CountryRecord> {
        self.by_iso3.get(&code(iso3)).map(|&i| &self.records[i])
    }

    /// Look up by either ISO code form.
    pub fn by_code(&self, value: &str) -> Option<&CountryRecord> {
        let value = value.trim();
        if !looks_like_code(value) {
            return None;
        }
        match value.len() {
            2 => self.by_iso2(value),
            _ => self.by_iso3(value),
        }
    }

    /// Look up by common name, then by ISO short name, ignoring case.
    pub fn by_name(&self, name: &str) -> Option<&CountryRecord> {
        let key = fold(name);
        self.by_name
            .get(&key)
            .or_else(|| self.by_alias.get(&key))
            .map(|&i| &self.records[i])
    }

    /// Countries in a region, or `None` if no such region exists.
    pub fn in_region<'a>(
        &'a self,
        region: &str,
    ) -> Option<impl Iterator<Item = &'a CountryRecord> + use<'a>> {
        self.by_region
            .get(&fold(region))
            .map(move |indices| indices.iter().map(move |&i| &self.records[i]))
    }

    /// Countries in a subregion, or `None` if no such subregion exists.
    pub fn in_subregion<'a>(
        &'a self,
        subregion: &str,
    ) -> Option<impl Iterator<Item = &'a CountryRecord> + use<'a>> {
        self.by_subregion
            .get(&fold(subregion))
            .map(move |indices| indices.iter().map(move |&i| &self.records[i]))
    }

    /// Canonical region names.
    pub fn regions(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .map(|r| r.region.as_str())
            .filter(|r| !r.is_empty())
            .collect()
    }

    /// Canonical subregion names.
    pub fn subregions(&self) -> BTreeSet<&str> {
        self.records.iter().filter_map(|r| r.subregion()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(iso2: &str, iso3: &str, name: &str, region: &str, sub: &str) -> CountryRecord {
        CountryRecord {
            iso2: iso2.into(),
            iso3: iso3.into(),
            common_name: name.into(),
            region: region.into(),
            subregion: sub.into(),
        }
    }

    #[test]
    fn test_embedded_dataset_valid() {
        let dataset = CountryDataset::embedded();
        assert!(
            dataset.len() > 240,
            "Too few countries: {}",
            dataset.len()
        );
    }

    #[test]
    fn test_code_lookup_ignores_case() {
        let dataset = CountryDataset::embedded();
        assert_eq!(dataset.by_iso2("fr").unwrap().iso3, "FRA");
        assert_eq!(dataset.by_iso3("usa").unwrap().iso2, "US");
        assert_eq!(dataset.by_code("DEU").unwrap().iso2, "DE");
        assert_eq!(dataset.by_code(" gb ").unwrap().iso3, "GBR");
        assert!(dataset.by_code("Germany").is_none());
        assert!(dataset.by_code("ZZ").is_none());
    }

    #[test]
    fn test_name_lookup() {
        let dataset = CountryDataset::embedded();
        assert_eq!(dataset.by_name("france").unwrap().iso2, "FR");
        assert_eq!(dataset.by_name("UNITED   STATES").unwrap().iso2, "US");
        assert_eq!(dataset.by_name("Åland Islands").unwrap().iso2, "AX");
        assert!(dataset.by_name("Atlantis").is_none());
    }

    #[test]
    fn test_iso_short_name_alias() {
        let dataset = CountryDataset::embedded();
        assert_eq!(
            dataset.by_name("United States of America").unwrap().iso2,
            "US"
        );
    }

    #[test]
    fn test_region_and_subregion_indexes() {
        let dataset = CountryDataset::embedded();
        let europe: Vec<_> = dataset.in_region("europe").unwrap().collect();
        assert!(europe.iter().any(|c| c.iso2 == "FR"));
        assert!(europe.iter().all(|c| c.region == "Europe"));

        let north_america: Vec<_> = dataset
            .in_subregion("North America")
            .unwrap()
            .map(|c| c.iso2.as_str())
            .collect();
        assert!(north_america.contains(&"US"));
        assert!(north_america.contains(&"CA"));
        assert!(!north_america.contains(&"BR"));

        assert!(dataset.in_region("Atlantis").is_none());
    }

    #[test]
    fn test_regions_listing() {
        let dataset = CountryDataset::embedded();
        let regions = dataset.regions();
        for expected in ["Africa", "Americas", "Asia", "Europe", "Oceania"] {
            assert!(regions.contains(expected), "missing region {expected}");
        }
        assert!(dataset.subregions().contains("Western Europe"));
    }

    #[test]
    fn test_antarctica_has_no_subregion() {
        let dataset = CountryDataset::embedded();
        assert_eq!(dataset.by_iso2("AQ").unwrap().subregion(), None);
    }

    #[test]
    fn test_duplicate_iso2_rejected() {
        let result = CountryDataset::new(vec![
            record("FR", "FRA", "France", "Europe", "Western Europe"),
            record("fr", "FRX", "Other France", "Europe", "Western Europe"),
        ]);
        assert!(matches!(result, Err(DatasetError::DuplicateCode { code }) if code == "FR"));
    }

    #[test]
    fn test_duplicate_iso3_rejected() {
        let result = CountryDataset::new(vec![
            record("FR", "FRA", "France", "Europe", "Western Europe"),
            record("FX", "fra", "Metropolitan France", "Europe", "Western Europe"),
        ]);
        assert!(matches!(result, Err(DatasetError::DuplicateCode { code }) if code == "FRA"));
    }

    #[test]
    fn test_malformed_code_rejected() {
        let result = CountryDataset::new(vec![record(
            "F1",
            "FRA",
            "France",
            "Europe",
            "Western Europe",
        )]);
        assert!(matches!(result, Err(DatasetError::InvalidRecord { .. })));
    }

    #[test]
    fn test_from_json_str() {
        let dataset = CountryDataset::from_json_str(
            r#"[{"iso2":"jp","iso3":"jpn","common_name":"Japan","region":"Asia","subregion":"Eastern Asia"}]"#,
        )
        .unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.by_iso2("JP").unwrap().iso3, "JPN");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            CountryDataset::from_json_str("{not json"),
            Err(DatasetError::Parse(_))
        ));
    }
}
