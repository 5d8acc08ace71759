//! Operation kinds and their typed requests and outcomes.

use super::family::Family;
use crate::types::{
    CancelOutcome, DeliveryReport, MessageId, MessagePayload, ParsedEvent, RawEvent, RiskScore,
    SendReceipt, ServiceInfo,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// One of the seven operations every family requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Send,
    Cancel,
    CheckDeliveryStatus,
    GetServiceInfo,
    CalculateDeliveryRisk,
    HandleWebhook,
    ValidateWebhookSignature,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Send,
        Operation::Cancel,
        Operation::CheckDeliveryStatus,
        Operation::GetServiceInfo,
        Operation::CalculateDeliveryRisk,
        Operation::HandleWebhook,
        Operation::ValidateWebhookSignature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Send => "send",
            Operation::Cancel => "cancel",
            Operation::CheckDeliveryStatus => "check_delivery_status",
            Operation::GetServiceInfo => "get_service_info",
            Operation::CalculateDeliveryRisk => "calculate_delivery_risk",
            Operation::HandleWebhook => "handle_webhook",
            Operation::ValidateWebhookSignature => "validate_webhook_signature",
        }
    }

    /// Conventional per-family method name.
    pub fn method_name(&self, family: Family) -> String {
        let f = family.as_str();
        match self {
            Operation::Send => format!("send_{f}"),
            Operation::Cancel => format!("cancel_{f}"),
            Operation::CheckDeliveryStatus => format!("check_{f}_delivery_status"),
            Operation::GetServiceInfo => format!("get_{f}_service_info"),
            Operation::CalculateDeliveryRisk => format!("calculate_{f}_delivery_risk"),
            Operation::HandleWebhook => format!("handle_{f}_webhook"),
            Operation::ValidateWebhookSignature => format!("validate_{f}_webhook_signature"),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation plus its input.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    Send(MessagePayload),
    Cancel(MessageId),
    CheckDeliveryStatus(MessageId),
    GetServiceInfo,
    CalculateDeliveryRisk(MessagePayload),
    HandleWebhook(RawEvent),
    ValidateWebhookSignature { event: RawEvent, signature: String },
}

impl OperationRequest {
    pub fn operation(&self) -> Operation {
        match self {
            OperationRequest::Send(_) => Operation::Send,
            OperationRequest::Cancel(_) => Operation::Cancel,
            OperationRequest::CheckDeliveryStatus(_) => Operation::CheckDeliveryStatus,
            OperationRequest::GetServiceInfo => Operation::GetServiceInfo,
            OperationRequest::CalculateDeliveryRisk(_) => Operation::CalculateDeliveryRisk,
            OperationRequest::HandleWebhook(_) => Operation::HandleWebhook,
            OperationRequest::ValidateWebhookSignature { .. } => {
                Operation::ValidateWebhookSignature
            }
        }
    }
}

/// Result of an operation, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Sent(SendReceipt),
    Cancelled(CancelOutcome),
    DeliveryStatus(DeliveryReport),
    ServiceInfo(ServiceInfo),
    DeliveryRisk(RiskScore),
    Webhook(ParsedEvent),
    SignatureValid(bool),
}

impl OperationOutcome {
    pub fn operation(&self) -> Operation {
        match self {
            OperationOutcome::Sent(_) => Operation::Send,
            OperationOutcome::Cancelled(_) => Operation::Cancel,
            OperationOutcome::DeliveryStatus(_) => Operation::CheckDeliveryStatus,
            OperationOutcome::ServiceInfo(_) => Operation::GetServiceInfo,
            OperationOutcome::DeliveryRisk(_) => Operation::CalculateDeliveryRisk,
            OperationOutcome::Webhook(_) => Operation::HandleWebhook,
            OperationOutcome::SignatureValid(_) => Operation::ValidateWebhookSignature,
        }
    }
}
