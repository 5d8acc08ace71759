//! Basic usage example for Missive Dispatch.
//!
//! Registers an in-memory SMS "gateway" provider kind, loads two providers
//! from JSON configuration with different geo scopes, and routes a few
//! messages.
//!
//! # Running
//!
//! ```bash
//! cargo run --example basic_dispatch
//! ```

use async_trait::async_trait;
use missive_dispatch::capability::ProviderBindings;
use missive_dispatch::dispatch::{DispatchRequest, Dispatcher};
use missive_dispatch::registry::{ProviderFactories, ProviderRegistry, RegistryConfig};
use missive_dispatch::{
    CancelOutcome, Channel, CountryDataset, DeliveryReport, Family, InvocationContext, MessageId,
    MessagePayload, MissiveStatus, ParsedEvent, ProviderResult, RawEvent, RiskScore, SendReceipt,
    ServiceInfo,
};
use std::sync::Arc;

const CONFIG: &str = r#"{
    "providers": [
        {
            "kind": "demo.GatewayProvider",
            "id": "gateway-eu",
            "supported_types": ["sms"],
            "sms_geo": "Europe",
            "sender": "ACME"
        },
        {
            "kind": "demo.GatewayProvider",
            "id": "gateway-na",
            "supported_types": ["sms"],
            "sms_geo": ["North America"],
            "sender": "+15550000"
        }
    ]
}"#;

/// Pretends to be an SMS API.
struct GatewaySms {
    sender: String,
}

#[async_trait]
impl Channel for GatewaySms {
    async fn send(&self, payload: MessagePayload, _ctx: InvocationContext) -> ProviderResult<SendReceipt> {
        println!("  [{}] -> {}: {}", self.sender, payload.recipient, payload.body.unwrap_or_default());
        Ok(SendReceipt::new(format!("{}-{}", self.sender, payload.recipient)))
    }

    async fn cancel(&self, _message_id: MessageId, _ctx: InvocationContext) -> ProviderResult<CancelOutcome> {
        Ok(CancelOutcome::refused("SMS cannot be recalled"))
    }

    async fn check_delivery_status(
        &self,
        _message_id: MessageId,
        _ctx: InvocationContext,
    ) -> ProviderResult<DeliveryReport> {
        Ok(DeliveryReport::new(MissiveStatus::Delivered))
    }

    async fn service_info(&self, _ctx: InvocationContext) -> ProviderResult<ServiceInfo> {
        Ok(ServiceInfo {
            is_available: Some(true),
            ..ServiceInfo::default()
        })
    }

    async fn delivery_risk(&self, payload: MessagePayload, _ctx: InvocationContext) -> ProviderResult<RiskScore> {
        let score = if payload.recipient.starts_with('+') { 10 } else { 80 };
        Ok(RiskScore::from_score(score))
    }

    async fn handle_webhook(&self, event: RawEvent, _ctx: InvocationContext) -> ProviderResult<ParsedEvent> {
        Ok(ParsedEvent::new(event.payload["status"].as_str().unwrap_or("unknown")))
    }

    async fn validate_webhook_signature(
        &self,
        event: RawEvent,
        signature: String,
        _ctx: InvocationContext,
    ) -> ProviderResult<bool> {
        Ok(event.header("x-gateway-signature") == Some(signature.as_str()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut factories = ProviderFactories::new();
    factories.register_fn("demo.GatewayProvider", &["sender"], |settings| {
        let sender = settings.get_str("sender").unwrap_or_default().to_string();
        Ok(ProviderBindings::new().bind(Family::Sms, Arc::new(GatewaySms { sender })))
    });

    let config = RegistryConfig::from_json_str(CONFIG)?;
    let registry = ProviderRegistry::load(&config, &factories, CountryDataset::embedded())?;
    println!("Loaded providers: {:?}", registry.families());

    let dispatcher = Dispatcher::with_registry(registry);

    for destination in ["FR", "US", "MEX", "JP"] {
        println!("\nSMS to {destination}:");
        let request = DispatchRequest::send(
            Family::Sms,
            destination,
            MessagePayload::new("+10000000000").with_body("Your code is 4242"),
        );
        match dispatcher.dispatch(request).await {
            Ok(dispatched) => println!("  routed via {}", dispatched.provider_id),
            Err(e) => println!("  not routed: {e}"),
        }
    }

    match dispatcher.dispatch(DispatchRequest::service_info(Family::Email, "FR")).await {
        Ok(_) => println!("\nunexpected email provider"),
        Err(e) => println!("\nEmail: {e}"),
    }

    Ok(())
}
