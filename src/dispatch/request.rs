//! Dispatch request and result types.

use crate::capability::{Family, InvocationContext, OperationOutcome, OperationRequest};
use crate::types::{MessageId, MessagePayload, RawEvent};
use std::time::Duration;

/// One operation to route to a provider.
///
/// # Example
///
/// ```rust
/// use missive_dispatch::dispatch::DispatchRequest;
/// use missive_dispatch::{Family, MessagePayload, Operation};
/// use std::time::Duration;
///
/// let request = DispatchRequest::send(Family::Sms, "US", MessagePayload::new("+15550100"))
///     .with_timeout(Duration::from_secs(10));
///
/// assert_eq!(request.operation.operation(), Operation::Send);
/// assert!(request.context.deadline().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub family: Family,
    /// ISO alpha-2 (or alpha-3) destination country.
    pub destination: String,
    pub operation: OperationRequest,
    /// Forwarded untouched to the provider.
    pub context: InvocationContext,
    /// Restrict routing to this provider id.
    pub provider: Option<String>,
}

impl DispatchRequest {
    pub fn new(family: Family, destination: impl Into<String>, operation: OperationRequest) -> Self {
        Self {
            family,
            destination: destination.into(),
            operation,
            context: InvocationContext::default(),
            provider: None,
        }
    }

    pub fn send(family: Family, destination: impl Into<String>, payload: MessagePayload) -> Self {
        Self::new(family, destination, OperationRequest::Send(payload))
    }

    pub fn cancel(family: Family, destination: impl Into<String>, message_id: impl Into<MessageId>) -> Self {
        Self::new(family, destination, OperationRequest::Cancel(message_id.into()))
    }

    pub fn check_delivery_status(
        family: Family,
        destination: impl Into<String>,
        message_id: impl Into<MessageId>,
    ) -> Self {
        Self::new(
            family,
            destination,
            OperationRequest::CheckDeliveryStatus(message_id.into()),
        )
    }

    pub fn service_info(family: Family, destination: impl Into<String>) -> Self {
        Self::new(family, destination, OperationRequest::GetServiceInfo)
    }

    pub fn delivery_risk(family: Family, destination: impl Into<String>, payload: MessagePayload) -> Self {
        Self::new(family, destination, OperationRequest::CalculateDeliveryRisk(payload))
    }

    /// Webhooks arrive for a known provider; pin it with [`with_provider`](Self::with_provider).
    pub fn webhook(family: Family, destination: impl Into<String>, event: RawEvent) -> Self {
        Self::new(family, destination, OperationRequest::HandleWebhook(event))
    }

    pub fn validate_webhook_signature(
        family: Family,
        destination: impl Into<String>,
        event: RawEvent,
        signature: impl Into<String>,
    ) -> Self {
        Self::new(
            family,
            destination,
            OperationRequest::ValidateWebhookSignature {
                event,
                signature: signature.into(),
            },
        )
    }

    pub fn with_context(mut self, context: InvocationContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.context = self.context.with_timeout(timeout);
        self
    }

    /// Pin a provider. The pinned provider must still serve the family and
    /// cover the destination.
    pub fn with_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider = Some(provider_id.into());
        self
    }
}

/// Outcome of a dispatch, tagged with the provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub provider_id: String,
    pub outcome: OperationOutcome,
}

impl Dispatched {
    pub fn into_outcome(self) -> OperationOutcome {
        self.outcome
    }
}
