//! Registry configuration types.

use crate::capability::Family;
use crate::geo::ScopeInput;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Full provider registry configuration.
///
/// Provider order is significant: it is the candidate order seen by the
/// dispatch selector.
///
/// # Example
///
/// ```rust
/// use missive_dispatch::registry::RegistryConfig;
///
/// let config = RegistryConfig::from_json_str(r#"{
///     "providers": [
///         {
///             "kind": "vendors.sms.TwilioProvider",
///             "supported_types": ["sms", "voice"],
///             "sms_geo": "*",
///             "voice_geo": ["US", "CA"],
///             "api_key": "k"
///         }
///     ]
/// }"#).unwrap();
///
/// let entry = &config.providers[0];
/// assert_eq!(entry.provider_id(), "twilio");
/// assert!(entry.settings().contains_key("api_key"));
/// assert!(!entry.settings().contains_key("sms_geo"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl RegistryConfig {
    pub fn new(providers: Vec<ProviderConfig>) -> Self {
        Self { providers }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file)).map_err(std::io::Error::from)
    }

    /// Append a provider entry.
    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.providers.push(provider);
        self
    }
}

/// One provider entry.
///
/// Family tags stay raw strings here so that an unknown tag is reported by
/// registry loading together with every other problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Factory name.
    pub kind: String,
    #[serde(default)]
    pub supported_types: Vec<String>,
    /// Used by the `HighestPriority` selector.
    #[serde(default)]
    pub priority: i32,
    /// Provider settings plus the `<family>_geo` scope keys.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl ProviderConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            supported_types: Vec::new(),
            priority: 0,
            options: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_family(mut self, family: Family) -> Self {
        self.supported_types.push(family.as_str().to_string());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the scope declaration for a family.
    pub fn with_geo(mut self, family: Family, scope: impl Into<ScopeInput>) -> Self {
        let value = match scope.into() {
            ScopeInput::Text(text) => Value::String(text),
            ScopeInput::List(items) => Value::from(items),
        };
        for key in family.geo_keys() {
            self.options.remove(&key);
        }
        self.options.insert(family.geo_key(), value);
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Configured id, or the id derived from `kind`.
    pub fn provider_id(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => provider_id_from_kind(&self.kind),
        }
    }

    /// Raw scope declaration for a family, if any.
    ///
    /// Looks the keys of [`Family::geo_keys`] up in order.
    pub fn geo(&self, family: Family) -> Option<&Value> {
        family
            .geo_keys()
            .iter()
            .find_map(|key| self.options.get(key))
    }

    /// Options that are not scope declarations.
    pub fn settings(&self) -> Map<String, Value> {
        self.options
            .iter()
            .filter(|(key, _)| !is_geo_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

fn is_geo_key(key: &str) -> bool {
    Family::ALL
        .iter()
        .any(|f| f.geo_keys().iter().any(|k| k == key))
}

/// Derive a provider id from a factory name.
///
/// Takes the last `.` / `::` / `/` separated segment, drops a trailing
/// `Provider`, and lowercases: `vendors.sms.TwilioProvider` becomes `twilio`.
pub fn provider_id_from_kind(kind: &str) -> String {
    let segment = kind
        .rsplit(['.', ':', '/'])
        .find(|s| !s.is_empty())
        .unwrap_or(kind);
    let stem = segment.strip_suffix("Provider").unwrap_or(segment);
    let stem = if stem.is_empty() { segment } else { stem };
    stem.to_lowercase()
}

/// Settings handed to a provider factory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderSettings {
    provider_id: String,
    kind: String,
    values: Map<String, Value>,
}

impl ProviderSettings {
    pub fn new(
        provider_id: impl Into<String>,
        kind: impl Into<String>,
        values: Map<String, Value>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            kind: kind.into(),
            values,
        }
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Deserialize the settings into a typed provider config.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.values.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_id_from_kind() {
        assert_eq!(provider_id_from_kind("vendors.sms.TwilioProvider"), "twilio");
        assert_eq!(provider_id_from_kind("crate::email::Brevo"), "brevo");
        assert_eq!(provider_id_from_kind("mailgun"), "mailgun");
        assert_eq!(provider_id_from_kind("Provider"), "provider");
    }

    #[test]
    fn test_explicit_id_wins() {
        let entry = ProviderConfig::new("vendors.TwilioProvider").with_id("twilio-eu");
        assert_eq!(entry.provider_id(), "twilio-eu");
    }

    #[test]
    fn test_parse_entry_splits_geo_and_settings() {
        let config = RegistryConfig::from_json_str(
            r#"{"providers": [{
                "kind": "acme",
                "supported_types": ["email"],
                "priority": 3,
                "email_geo": "Europe, US",
                "from": "noreply@example.com"
            }]}"#,
        )
        .unwrap();

        let entry = &config.providers[0];
        assert_eq!(entry.priority, 3);
        assert_eq!(entry.geo(Family::Email), Some(&json!("Europe, US")));
        assert_eq!(entry.geo(Family::Sms), None);
        assert_eq!(entry.settings(), json!({"from": "noreply@example.com"}).as_object().cloned().unwrap());
    }

    #[test]
    fn test_long_type_name_scope_keys() {
        let config = RegistryConfig::from_json_str(
            r#"{"providers": [{
                "kind": "acme",
                "supported_types": ["VOICE_CALL", "PUSH_NOTIFICATION", "sms"],
                "voice_call_geo": "*",
                "push_notification_geographic_coverage": ["FR"],
                "sms_geographic_coverage": "Europe",
                "sms_geo": "US",
                "api_key": "k"
            }]}"#,
        )
        .unwrap();

        let entry = &config.providers[0];
        assert_eq!(entry.geo(Family::Voice), Some(&json!("*")));
        assert_eq!(entry.geo(Family::Push), Some(&json!(["FR"])));
        assert_eq!(entry.geo(Family::Sms), Some(&json!("Europe")));
        assert_eq!(entry.settings(), json!({"api_key": "k"}).as_object().cloned().unwrap());
    }

    #[test]
    fn test_with_geo_replaces_every_scope_key() {
        let entry = ProviderConfig::new("acme")
            .with_setting("sms_geographic_coverage", "Europe")
            .with_geo(Family::Sms, "US");
        assert_eq!(entry.geo(Family::Sms), Some(&json!("US")));
        assert!(entry.settings().is_empty());
    }

    #[test]
    fn test_builder_round_trips_through_json() {
        let entry = ProviderConfig::new("acme")
            .with_family(Family::Sms)
            .with_geo(Family::Sms, vec!["FR", "DE"])
            .with_setting("token", "t");
        let text = serde_json::to_string(&RegistryConfig::new(vec![entry.clone()])).unwrap();
        let parsed = RegistryConfig::from_json_str(&text).unwrap();
        assert_eq!(parsed.providers, vec![entry]);
    }

    #[test]
    fn test_settings_deserialize() {
        #[derive(Deserialize)]
        struct Acme {
            token: String,
        }

        let settings = ProviderSettings::new("acme", "acme", json!({"token": "t"}).as_object().cloned().unwrap());
        let acme: Acme = settings.deserialize().unwrap();
        assert_eq!(acme.token, "t");
        assert_eq!(settings.get_str("token"), Some("t"));
    }
}
