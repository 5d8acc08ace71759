//! Channel families and the operation set each one requires.

use super::operation::Operation;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Error parsing a family tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown service family '{0}'")]
pub struct UnknownFamily(pub String);

/// Channel category a provider can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Family {
    Postal,
    Email,
    Sms,
    Push,
    Voice,
    Branded,
    Notification,
    /// Lettre recommandée électronique (registered e-mail with legal proof).
    Lre,
    Rcs,
}

impl Family {
    pub const ALL: [Family; 9] = [
        Family::Postal,
        Family::Email,
        Family::Sms,
        Family::Push,
        Family::Voice,
        Family::Branded,
        Family::Notification,
        Family::Lre,
        Family::Rcs,
    ];

    /// Lower-case tag used in configuration keys and method names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Postal => "postal",
            Family::Email => "email",
            Family::Sms => "sms",
            Family::Push => "push",
            Family::Voice => "voice",
            Family::Branded => "branded",
            Family::Notification => "notification",
            Family::Lre => "lre",
            Family::Rcs => "rcs",
        }
    }

    /// Long type name accepted as an alias of the tag.
    pub fn long_name(&self) -> Option<&'static str> {
        match self {
            Family::Push => Some("push_notification"),
            Family::Voice => Some("voice_call"),
            _ => None,
        }
    }

    /// Configuration key holding this family's geo scope (`sms_geo`, ...).
    pub fn geo_key(&self) -> String {
        format!("{}_geo", self.as_str())
    }

    /// Every key accepted for this family's geo scope, in lookup order.
    ///
    /// `<name>_geographic_coverage` is preferred over `<name>_geo`; the
    /// short tag comes before the long type name.
    pub fn geo_keys(&self) -> Vec<String> {
        std::iter::once(self.as_str())
            .chain(self.long_name())
            .flat_map(|name| [format!("{name}_geographic_coverage"), format!("{name}_geo")])
            .collect()
    }

    /// Operations a provider must implement to serve this family.
    pub fn capability(&self) -> FamilyCapability {
        FamilyCapability {
            family: *self,
            operations: &Operation::ALL,
        }
    }
}

impl Display for Family {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = UnknownFamily;

    /// Case-insensitive; also accepts the long type names
    /// (`PUSH_NOTIFICATION`, `VOICE_CALL`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase().replace('-', "_");
        let family = match tag.as_str() {
            "postal" => Family::Postal,
            "email" => Family::Email,
            "sms" => Family::Sms,
            "push" | "push_notification" => Family::Push,
            "voice" | "voice_call" => Family::Voice,
            "branded" => Family::Branded,
            "notification" => Family::Notification,
            "lre" => Family::Lre,
            "rcs" => Family::Rcs,
            _ => return Err(UnknownFamily(s.to_string())),
        };
        Ok(family)
    }
}

impl TryFrom<String> for Family {
    type Error = UnknownFamily;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Family> for String {
    fn from(family: Family) -> Self {
        family.as_str().to_string()
    }
}

/// Required operation set of one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyCapability {
    pub family: Family,
    pub operations: &'static [Operation],
}

impl FamilyCapability {
    /// Conventional method names, e.g. `send_sms`, `check_sms_delivery_status`.
    pub fn method_names(&self) -> Vec<String> {
        self.operations
            .iter()
            .map(|op| op.method_name(self.family))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("SMS".parse::<Family>().unwrap(), Family::Sms);
        assert_eq!(" Email ".parse::<Family>().unwrap(), Family::Email);
    }

    #[test]
    fn test_parse_long_type_names() {
        assert_eq!(
            "PUSH_NOTIFICATION".parse::<Family>().unwrap(),
            Family::Push
        );
        assert_eq!("voice-call".parse::<Family>().unwrap(), Family::Voice);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "fax".parse::<Family>(),
            Err(UnknownFamily("fax".to_string()))
        );
    }

    #[test]
    fn test_serde_round_trip_uses_tag() {
        let json = serde_json::to_string(&Family::Lre).unwrap();
        assert_eq!(json, r#""lre""#);
        let family: Family = serde_json::from_str(r#""RCS""#).unwrap();
        assert_eq!(family, Family::Rcs);
        assert!(serde_json::from_str::<Family>(r#""fax""#).is_err());
    }

    #[test]
    fn test_geo_key() {
        assert_eq!(Family::Sms.geo_key(), "sms_geo");
        assert_eq!(Family::Notification.geo_key(), "notification_geo");
    }

    #[test]
    fn test_geo_keys_cover_long_names() {
        assert_eq!(
            Family::Voice.geo_keys(),
            vec![
                "voice_geographic_coverage",
                "voice_geo",
                "voice_call_geographic_coverage",
                "voice_call_geo",
            ]
        );
        assert_eq!(Family::Email.geo_keys(), vec!["email_geographic_coverage", "email_geo"]);
    }

    #[test]
    fn test_capability_lists_all_methods() {
        let names = Family::Sms.capability().method_names();
        assert_eq!(
            names,
            vec![
                "send_sms",
                "cancel_sms",
                "check_sms_delivery_status",
                "get_sms_service_info",
                "calculate_sms_delivery_risk",
                "handle_sms_webhook",
                "validate_sms_webhook_signature",
            ]
        );
    }
}
