//! Channel trait definition.

use super::context::InvocationContext;
use crate::errors::ProviderResult;
use crate::types::{
    CancelOutcome, DeliveryReport, MessageId, MessagePayload, ParsedEvent, RawEvent, RiskScore,
    SendReceipt, ServiceInfo,
};
use async_trait::async_trait;

/// Complete implementation of one family by one provider.
///
/// Every operation is required, so a type implementing `Channel` satisfies the
/// family's capability contract by construction. Bind it to a family with
/// [`ChannelBindings::from_channel`](super::ChannelBindings::from_channel).
///
/// Providers that assemble a family from individual functions instead use the
/// [`ChannelBindings`](super::ChannelBindings) builder; those bindings are
/// checked for completeness when the registry loads.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use missive_dispatch::capability::{Channel, InvocationContext};
/// use missive_dispatch::{ProviderResult, MessagePayload, SendReceipt};
///
/// struct GatewaySms { client: GatewayClient }
///
/// #[async_trait]
/// impl Channel for GatewaySms {
///     async fn send(&self, payload: MessagePayload, ctx: InvocationContext) -> ProviderResult<SendReceipt> {
///         // Call the upstream API, honoring ctx.deadline()
///     }
///
///     // ... the six remaining operations
/// }
/// ```
#[async_trait]
pub trait Channel: Send + Sync {
    /// `send_<family>`
    async fn send(
        &self,
        payload: MessagePayload,
        ctx: InvocationContext,
    ) -> ProviderResult<SendReceipt>;

    /// `cancel_<family>`
    async fn cancel(
        &self,
        message_id: MessageId,
        ctx: InvocationContext,
    ) -> ProviderResult<CancelOutcome>;

    /// `check_<family>_delivery_status`
    async fn check_delivery_status(
        &self,
        message_id: MessageId,
        ctx: InvocationContext,
    ) -> ProviderResult<DeliveryReport>;

    /// `get_<family>_service_info`
    async fn service_info(&self, ctx: InvocationContext) -> ProviderResult<ServiceInfo>;

    /// `calculate_<family>_delivery_risk`
    async fn delivery_risk(
        &self,
        payload: MessagePayload,
        ctx: InvocationContext,
    ) -> ProviderResult<RiskScore>;

    /// `handle_<family>_webhook`
    async fn handle_webhook(
        &self,
        event: RawEvent,
        ctx: InvocationContext,
    ) -> ProviderResult<ParsedEvent>;

    /// `validate_<family>_webhook_signature`
    async fn validate_webhook_signature(
        &self,
        event: RawEvent,
        signature: String,
        ctx: InvocationContext,
    ) -> ProviderResult<bool>;
}
