//! Per-family operation tables.

use super::context::InvocationContext;
use super::family::Family;
use super::operation::{Operation, OperationOutcome, OperationRequest};
use super::traits::Channel;
use crate::errors::ProviderResult;
use crate::types::{
    CancelOutcome, DeliveryReport, MessageId, MessagePayload, ParsedEvent, RawEvent, RiskScore,
    SendReceipt, ServiceInfo,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

type Handler<I, T> = Arc<dyn Fn(I, InvocationContext) -> BoxFuture<'static, ProviderResult<T>> + Send + Sync>;

type SendFn = Handler<MessagePayload, SendReceipt>;
type CancelFn = Handler<MessageId, CancelOutcome>;
type StatusFn = Handler<MessageId, DeliveryReport>;
type InfoFn = Handler<(), ServiceInfo>;
type RiskFn = Handler<MessagePayload, RiskScore>;
type WebhookFn = Handler<RawEvent, ParsedEvent>;
type SignatureFn = Handler<(RawEvent, String), bool>;

fn handler<I, T, F, Fut>(f: F) -> Handler<I, T>
where
    F: Fn(I, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProviderResult<T>> + Send + 'static,
{
    Arc::new(move |input, ctx| f(input, ctx).boxed())
}

/// Operation table for one family of one provider.
///
/// Each slot holds the callable for one operation. A table built from a
/// [`Channel`] has every slot filled; a table assembled with the `on_*`
/// methods may have gaps, which registry loading reports.
///
/// # Example
///
/// ```rust
/// use missive_dispatch::capability::ChannelBindings;
/// use missive_dispatch::{Operation, SendReceipt};
///
/// let bindings = ChannelBindings::new()
///     .on_send(|payload, _ctx| async move { Ok(SendReceipt::new(payload.recipient)) });
///
/// assert!(bindings.supports(Operation::Send));
/// assert!(!bindings.supports(Operation::Cancel));
/// ```
#[derive(Clone, Default)]
pub struct ChannelBindings {
    send: Option<SendFn>,
    cancel: Option<CancelFn>,
    check_delivery_status: Option<StatusFn>,
    service_info: Option<InfoFn>,
    delivery_risk: Option<RiskFn>,
    handle_webhook: Option<WebhookFn>,
    validate_webhook_signature: Option<SignatureFn>,
}

impl ChannelBindings {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete table backed by a [`Channel`] implementation.
    pub fn from_channel<C: Channel + 'static>(channel: Arc<C>) -> Self {
        let c = Arc::clone(&channel);
        let bindings = Self::new().on_send(move |payload, ctx| {
            let c = Arc::clone(&c);
            async move { c.send(payload, ctx).await }
        });
        let c = Arc::clone(&channel);
        let bindings = bindings.on_cancel(move |id, ctx| {
            let c = Arc::clone(&c);
            async move { c.cancel(id, ctx).await }
        });
        let c = Arc::clone(&channel);
        let bindings = bindings.on_check_delivery_status(move |id, ctx| {
            let c = Arc::clone(&c);
            async move { c.check_delivery_status(id, ctx).await }
        });
        let c = Arc::clone(&channel);
        let bindings = bindings.on_service_info(move |ctx| {
            let c = Arc::clone(&c);
            async move { c.service_info(ctx).await }
        });
        let c = Arc::clone(&channel);
        let bindings = bindings.on_delivery_risk(move |payload, ctx| {
            let c = Arc::clone(&c);
            async move { c.delivery_risk(payload, ctx).await }
        });
        let c = Arc::clone(&channel);
        let bindings = bindings.on_handle_webhook(move |event, ctx| {
            let c = Arc::clone(&c);
            async move { c.handle_webhook(event, ctx).await }
        });
        let c = channel;
        bindings.on_validate_webhook_signature(move |event, signature, ctx| {
            let c = Arc::clone(&c);
            async move { c.validate_webhook_signature(event, signature, ctx).await }
        })
    }

    pub fn on_send<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(MessagePayload, InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProviderResult<SendReceipt>> + Send + 'static,
    {
        self.send = Some(handler(f));
        self
    }

    pub fn on_cancel<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(MessageId, InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProviderResult<CancelOutcome>> + Send + 'static,
    {
        self.cancel = Some(handler(f));
        self
    }

    pub fn on_check_delivery_status<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(MessageId, InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProviderResult<DeliveryReport>> + Send + 'static,
    {
        self.check_delivery_status = Some(handler(f));
        self
    }

    pub fn on_service_info<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProviderResult<ServiceInfo>> + Send + 'static,
    {
        self.service_info = Some(handler(move |(), ctx| f(ctx)));
        self
    }

    pub fn on_delivery_risk<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(MessagePayload, InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProviderResult<RiskScore>> + Send + 'static,
    {
        self.delivery_risk = Some(handler(f));
        self
    }

    pub fn on_handle_webhook<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(RawEvent, InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProviderResult<ParsedEvent>> + Send + 'static,
    {
        self.handle_webhook = Some(handler(f));
        self
    }

    pub fn on_validate_webhook_signature<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(RawEvent, String, InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProviderResult<bool>> + Send + 'static,
    {
        self.validate_webhook_signature =
            Some(handler(move |(event, signature), ctx| f(event, signature, ctx)));
        self
    }

    /// Whether a callable is bound for the operation.
    pub fn supports(&self, operation: Operation) -> bool {
        match operation {
            Operation::Send => self.send.is_some(),
            Operation::Cancel => self.cancel.is_some(),
            Operation::CheckDeliveryStatus => self.check_delivery_status.is_some(),
            Operation::GetServiceInfo => self.service_info.is_some(),
            Operation::CalculateDeliveryRisk => self.delivery_risk.is_some(),
            Operation::HandleWebhook => self.handle_webhook.is_some(),
            Operation::ValidateWebhookSignature => self.validate_webhook_signature.is_some(),
        }
    }

    /// Bound operations, in canonical order.
    pub fn operations(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| self.supports(*op))
            .collect()
    }

    /// Unbound operations, in canonical order.
    pub fn missing(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| !self.supports(*op))
            .collect()
    }

    /// Start the call for a request, or `None` if its operation is unbound.
    pub fn invoke(
        &self,
        request: OperationRequest,
        ctx: InvocationContext,
    ) -> Option<BoxFuture<'static, ProviderResult<OperationOutcome>>> {
        let future = match request {
            OperationRequest::Send(payload) => {
                let fut = (self.send.as_ref()?)(payload, ctx);
                fut.map(|r| r.map(OperationOutcome::Sent)).boxed()
            }
            OperationRequest::Cancel(id) => {
                let fut = (self.cancel.as_ref()?)(id, ctx);
                fut.map(|r| r.map(OperationOutcome::Cancelled)).boxed()
            }
            OperationRequest::CheckDeliveryStatus(id) => {
                let fut = (self.check_delivery_status.as_ref()?)(id, ctx);
                fut.map(|r| r.map(OperationOutcome::DeliveryStatus)).boxed()
            }
            OperationRequest::GetServiceInfo => {
                let fut = (self.service_info.as_ref()?)((), ctx);
                fut.map(|r| r.map(OperationOutcome::ServiceInfo)).boxed()
            }
            OperationRequest::CalculateDeliveryRisk(payload) => {
                let fut = (self.delivery_risk.as_ref()?)(payload, ctx);
                fut.map(|r| r.map(OperationOutcome::DeliveryRisk)).boxed()
            }
            OperationRequest::HandleWebhook(event) => {
                let fut = (self.handle_webhook.as_ref()?)(event, ctx);
                fut.map(|r| r.map(OperationOutcome::Webhook)).boxed()
            }
            OperationRequest::ValidateWebhookSignature { event, signature } => {
                let fut = (self.validate_webhook_signature.as_ref()?)((event, signature), ctx);
                fut.map(|r| r.map(OperationOutcome::SignatureValid)).boxed()
            }
        };
        Some(future)
    }
}

impl Debug for ChannelBindings {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelBindings")
            .field("operations", &self.operations())
            .finish()
    }
}

/// All family tables of one provider implementation.
#[derive(Debug, Clone, Default)]
pub struct ProviderBindings {
    channels: BTreeMap<Family, ChannelBindings>,
}

impl ProviderBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a table for a family, replacing any previous one.
    pub fn with_channel(mut self, family: Family, bindings: ChannelBindings) -> Self {
        self.channels.insert(family, bindings);
        self
    }

    /// Attach a complete [`Channel`] implementation for a family.
    pub fn bind<C: Channel + 'static>(self, family: Family, channel: Arc<C>) -> Self {
        self.with_channel(family, ChannelBindings::from_channel(channel))
    }

    pub fn channel(&self, family: Family) -> Option<&ChannelBindings> {
        self.channels.get(&family)
    }

    /// Families with a table attached.
    pub fn families(&self) -> impl Iterator<Item = Family> + '_ {
        self.channels.keys().copied()
    }
}
