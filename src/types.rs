//! Payload and result types exchanged with provider implementations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

// =============================================================================
// MessageId
// =============================================================================

/// Provider-side identifier of a dispatched message.
///
/// Returned by a successful send and used for cancellation and status checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Create a new MessageId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// =============================================================================
// MissiveStatus
// =============================================================================

/// Lifecycle status of a message as reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissiveStatus {
    Draft,
    Pending,
    Sent,
    Delivered,
    Read,
    Failed,
    Cancelled,
}

impl MissiveStatus {
    /// States after which no further transition is expected.
    pub const TERMINAL: [MissiveStatus; 4] = [
        MissiveStatus::Delivered,
        MissiveStatus::Read,
        MissiveStatus::Failed,
        MissiveStatus::Cancelled,
    ];

    /// Whether this status is final.
    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(self)
    }

    /// Map a raw provider event name (`delivered`, `bounced`, ...) to a status.
    ///
    /// Unknown events yield `None`.
    pub fn from_event_name(event: &str) -> Option<Self> {
        match event.trim().to_ascii_lowercase().as_str() {
            "delivered" => Some(MissiveStatus::Delivered),
            "opened" | "clicked" | "read" => Some(MissiveStatus::Read),
            "bounced" | "failed" | "rejected" | "dropped" => Some(MissiveStatus::Failed),
            _ => None,
        }
    }

    /// Upper-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MissiveStatus::Draft => "DRAFT",
            MissiveStatus::Pending => "PENDING",
            MissiveStatus::Sent => "SENT",
            MissiveStatus::Delivered => "DELIVERED",
            MissiveStatus::Read => "READ",
            MissiveStatus::Failed => "FAILED",
            MissiveStatus::Cancelled => "CANCELLED",
        }
    }
}

impl Display for MissiveStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Message handed to a provider for sending or risk scoring.
///
/// Only the recipient is interpreted generically; everything else is
/// family-specific and travels in `subject`, `body`, and `metadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Address, phone number, device token, or postal reference.
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl MessagePayload {
    /// Create a payload for the given recipient.
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            ..Self::default()
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Raw inbound webhook event, as received by the caller's HTTP layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub payload: Value,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl RawEvent {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// =============================================================================
// Results
// =============================================================================

/// Outcome of a successful send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub message_id: MessageId,
    pub status: MissiveStatus,
    #[serde(default)]
    pub details: Value,
}

impl SendReceipt {
    pub fn new(message_id: impl Into<MessageId>) -> Self {
        Self {
            message_id: message_id.into(),
            status: MissiveStatus::Sent,
            details: Value::Null,
        }
    }
}

/// Outcome of a cancellation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOutcome {
    pub cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CancelOutcome {
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            reason: None,
        }
    }

    pub fn refused(reason: impl Into<String>) -> Self {
        Self {
            cancelled: false,
            reason: Some(reason.into()),
        }
    }
}

/// Delivery status as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub status: MissiveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub details: Value,
}

impl DeliveryReport {
    pub fn new(status: MissiveStatus) -> Self {
        Self {
            status,
            error_code: None,
            error_message: None,
            details: Value::Null,
        }
    }
}

/// Service information for one family of a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub is_available: Option<bool>,
    pub credits: Option<f64>,
    /// Unit of `credits` (`count`, `amount`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_type: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub limits: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub details: Value,
}

/// Coarse risk bucket derived from a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=24 => RiskLevel::Low,
            25..=49 => RiskLevel::Medium,
            50..=74 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}

/// Score at or above which a message should not be sent.
pub const SEND_RISK_THRESHOLD: u8 = 70;

/// Delivery risk assessment for a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// 0 (safe) to 100 (certain failure).
    pub score: u8,
    pub level: RiskLevel,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub factors: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    pub should_send: bool,
}

impl RiskScore {
    /// Build a score, clamping to 100 and deriving level and `should_send`.
    pub fn from_score(score: u32) -> Self {
        let score = score.min(100) as u8;
        Self {
            score,
            level: RiskLevel::from_score(score),
            factors: Map::new(),
            recommendations: Vec::new(),
            should_send: score < SEND_RISK_THRESHOLD,
        }
    }

    pub fn with_factor(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.factors.insert(name.into(), value.into());
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendations.push(recommendation.into());
        self
    }
}

/// Normalized webhook event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEvent {
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MissiveStatus>,
    #[serde(default)]
    pub details: Value,
}

impl ParsedEvent {
    /// Build an event, deriving the status from the event name.
    pub fn new(event_type: impl Into<String>) -> Self {
        let event_type = event_type.into();
        let status = MissiveStatus::from_event_name(&event_type);
        Self {
            event_type,
            message_id: None,
            status,
            details: Value::Null,
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<MessageId>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }
}
