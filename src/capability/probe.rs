//! Generic harness exercising every declared `(family, operation)` pair.
//!
//! Provider authors get uniform coverage from one call instead of writing
//! per-family tests:
//!
//! ```rust,ignore
//! let report = probe(&descriptor, &ProbeFixtures::default()).await;
//! assert!(report.is_clean(), "{:?}", report.failures().collect::<Vec<_>>());
//! ```

use super::context::InvocationContext;
use super::error::{CapabilityError, CapabilityGap};
use super::family::Family;
use super::operation::{Operation, OperationOutcome, OperationRequest};
use crate::registry::ProviderDescriptor;
use crate::types::{MessageId, MessagePayload, RawEvent};
use serde_json::json;

/// Inputs fed to each probed operation.
#[derive(Debug, Clone)]
pub struct ProbeFixtures {
    pub payload: MessagePayload,
    pub message_id: MessageId,
    pub event: RawEvent,
    pub signature: String,
    pub context: InvocationContext,
}

impl Default for ProbeFixtures {
    fn default() -> Self {
        Self {
            payload: MessagePayload::new("probe-recipient")
                .with_subject("probe")
                .with_body("probe"),
            message_id: MessageId::from("probe-message"),
            event: RawEvent::new(json!({ "event": "delivered", "id": "probe-message" })),
            signature: "probe-signature".to_string(),
            context: InvocationContext::default(),
        }
    }
}

impl ProbeFixtures {
    fn request(&self, operation: Operation) -> OperationRequest {
        match operation {
            Operation::Send => OperationRequest::Send(self.payload.clone()),
            Operation::Cancel => OperationRequest::Cancel(self.message_id.clone()),
            Operation::CheckDeliveryStatus => {
                OperationRequest::CheckDeliveryStatus(self.message_id.clone())
            }
            Operation::GetServiceInfo => OperationRequest::GetServiceInfo,
            Operation::CalculateDeliveryRisk => {
                OperationRequest::CalculateDeliveryRisk(self.payload.clone())
            }
            Operation::HandleWebhook => OperationRequest::HandleWebhook(self.event.clone()),
            Operation::ValidateWebhookSignature => OperationRequest::ValidateWebhookSignature {
                event: self.event.clone(),
                signature: self.signature.clone(),
            },
        }
    }
}

/// Result of one probed pair.
#[derive(Debug)]
pub struct ProbeResult {
    pub family: Family,
    pub operation: Operation,
    pub outcome: Result<OperationOutcome, CapabilityError>,
}

/// Results for every declared pair of one provider.
#[derive(Debug)]
pub struct ProbeReport {
    pub provider_id: String,
    pub results: Vec<ProbeResult>,
}

impl ProbeReport {
    pub fn is_clean(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CapabilityError> {
        self.results.iter().filter_map(|r| r.outcome.as_ref().err())
    }

    /// Number of pairs that ran successfully.
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_ok()).count()
    }
}

/// Run every operation of every declared family once, in canonical order.
///
/// Provider errors are collected, not propagated.
pub async fn probe(descriptor: &ProviderDescriptor, fixtures: &ProbeFixtures) -> ProbeReport {
    let mut results = Vec::new();

    for family in descriptor.supported_types().iter().copied() {
        let channel = descriptor.implementation().channel(family);

        for operation in family.capability().operations.iter().copied() {
            let gap = CapabilityGap::new(family, operation);
            let request = fixtures.request(operation);

            let call = channel.and_then(|c| c.invoke(request, fixtures.context.clone()));
            let outcome = match call {
                None => Err(CapabilityError::Missing { gap }),
                Some(fut) => fut
                    .await
                    .map_err(|source| CapabilityError::Provider { gap, source }),
            };

            results.push(ProbeResult {
                family,
                operation,
                outcome,
            });
        }
    }

    ProbeReport {
        provider_id: descriptor.id().to_string(),
        results,
    }
}
