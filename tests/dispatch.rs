//! End-to-end routing through registry, geo filter, selector, and provider.

use missive_dispatch::capability::{ChannelBindings, ProviderBindings};
use missive_dispatch::dispatch::{DispatchRequest, Dispatcher, DispatcherConfig, SelectionPolicy};
use missive_dispatch::registry::{ProviderFactories, ProviderRegistry, RegistryConfig};
use missive_dispatch::{
    CancelOutcome, CountryDataset, DeliveryReport, DispatchError, Family, InvocationContext,
    MessagePayload, MissiveStatus, OperationOutcome, ParsedEvent, ProviderError, RawEvent,
    RetryableError, RiskScore, SendReceipt, ServiceInfo,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
#[error("recipient {0} is blocklisted")]
struct Blocklisted(String);

impl RetryableError for Blocklisted {
    fn is_retryable(&self) -> bool {
        false
    }

    fn should_retry_operation(&self) -> bool {
        true
    }
}

/// Complete bindings whose send receipt id is `<provider>:<recipient>`.
fn echo(provider_id: String) -> ChannelBindings {
    ChannelBindings::new()
        .on_send(move |payload, ctx: InvocationContext| {
            let provider_id = provider_id.clone();
            async move {
                if ctx.is_cancelled() {
                    return Err(ProviderError::permanent("cancelled by caller"));
                }
                if payload.recipient == "blocked" {
                    return Err(ProviderError::new(Blocklisted(payload.recipient)));
                }
                let mut receipt = SendReceipt::new(format!("{provider_id}:{}", payload.recipient));
                receipt.details = json!({ "has_deadline": ctx.deadline().is_some() });
                Ok(receipt)
            }
        })
        .on_cancel(|_, _| async { Ok(CancelOutcome::cancelled()) })
        .on_check_delivery_status(|_, _| async { Ok(DeliveryReport::new(MissiveStatus::Delivered)) })
        .on_service_info(|_| async { Ok(ServiceInfo::default()) })
        .on_delivery_risk(|payload, _| async move {
            Ok(RiskScore::from_score(payload.recipient.len() as u32))
        })
        .on_handle_webhook(|event, _| async move {
            let name = event.payload["event"].as_str().unwrap_or_default().to_string();
            Ok(ParsedEvent::new(name))
        })
        .on_validate_webhook_signature(|event, signature, _| async move {
            Ok(event.header("x-signature") == Some(signature.as_str()))
        })
}

fn factories() -> ProviderFactories {
    let mut factories = ProviderFactories::new();
    factories.register_fn("echo", &[], |settings| {
        let mut bindings = ProviderBindings::new();
        for family in Family::ALL {
            bindings = bindings.with_channel(family, echo(settings.provider_id().to_string()));
        }
        Ok(bindings)
    });
    factories
}

fn registry(json: &str) -> ProviderRegistry {
    let config = RegistryConfig::from_json_str(json).unwrap();
    ProviderRegistry::load(&config, &factories(), CountryDataset::embedded()).unwrap()
}

const TWO_SMS: &str = r#"{"providers": [
    {"id": "eu-sms", "kind": "echo", "supported_types": ["sms"], "sms_geo": "Europe"},
    {"id": "na-sms", "kind": "echo", "supported_types": ["sms", "email"], "sms_geo": "North America", "email_geo": "*"}
]}"#;

fn send(family: Family, destination: &str) -> DispatchRequest {
    DispatchRequest::send(family, destination, MessagePayload::new("+15550100"))
}

fn message_id(outcome: &OperationOutcome) -> &str {
    match outcome {
        OperationOutcome::Sent(receipt) => receipt.message_id.as_str(),
        other => panic!("expected send receipt, got {other:?}"),
    }
}

#[tokio::test]
async fn test_geo_filter_picks_only_covering_provider() {
    let dispatcher = Dispatcher::with_registry(registry(TWO_SMS));

    let dispatched = dispatcher.dispatch(send(Family::Sms, "US")).await.unwrap();
    assert_eq!(dispatched.provider_id, "na-sms");
    assert_eq!(message_id(&dispatched.outcome), "na-sms:+15550100");

    let dispatched = dispatcher.dispatch(send(Family::Sms, "fr")).await.unwrap();
    assert_eq!(dispatched.provider_id, "eu-sms");
}

#[tokio::test]
async fn test_iso3_destination_is_normalized() {
    let dispatcher = Dispatcher::with_registry(registry(TWO_SMS));
    let dispatched = dispatcher.dispatch(send(Family::Sms, "CAN")).await.unwrap();
    assert_eq!(dispatched.provider_id, "na-sms");
}

#[tokio::test]
async fn test_family_without_providers() {
    let dispatcher = Dispatcher::with_registry(registry(TWO_SMS));
    let err = dispatcher.dispatch(send(Family::Push, "US")).await.unwrap_err();
    assert!(matches!(err, DispatchError::NoProviderForFamily { family: Family::Push }));
    assert!(err.should_retry_operation());
}

#[tokio::test]
async fn test_destination_outside_every_scope() {
    let dispatcher = Dispatcher::with_registry(registry(TWO_SMS));
    let err = dispatcher.dispatch(send(Family::Sms, "JP")).await.unwrap_err();
    match err {
        DispatchError::NoProviderForDestination {
            family,
            destination,
            candidates,
        } => {
            assert_eq!(family, Family::Sms);
            assert_eq!(destination, "JP");
            assert_eq!(candidates, 2);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_destination() {
    let dispatcher = Dispatcher::with_registry(registry(TWO_SMS));
    let err = dispatcher.dispatch(send(Family::Email, "XX")).await.unwrap_err();
    assert!(matches!(err, DispatchError::UnknownDestination { .. }));
}

#[tokio::test]
async fn test_pinned_provider_is_still_geo_filtered() {
    let dispatcher = Dispatcher::with_registry(registry(TWO_SMS));

    let dispatched = dispatcher
        .dispatch(send(Family::Sms, "DE").with_provider("eu-sms"))
        .await
        .unwrap();
    assert_eq!(dispatched.provider_id, "eu-sms");

    let err = dispatcher
        .dispatch(send(Family::Sms, "DE").with_provider("na-sms"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::NoProviderForDestination { candidates: 1, .. }));

    let err = dispatcher
        .dispatch(send(Family::Sms, "DE").with_provider("nobody"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::ProviderNotFound { .. }));
}

#[tokio::test]
async fn test_provider_error_passes_through_tagged() {
    let dispatcher = Dispatcher::with_registry(registry(TWO_SMS));
    let request = DispatchRequest::send(Family::Sms, "US", MessagePayload::new("blocked"));

    let err = dispatcher.dispatch(request).await.unwrap_err();
    assert_eq!(err.provider_id(), Some("na-sms"));
    assert!(!err.is_retryable());
    assert!(err.should_retry_operation());

    let DispatchError::Provider { source, .. } = err else {
        panic!("expected provider error");
    };
    let original = source.downcast_ref::<Blocklisted>().unwrap();
    assert_eq!(original.0, "blocked");
}

#[tokio::test]
async fn test_context_reaches_provider() {
    let dispatcher = Dispatcher::with_registry(registry(TWO_SMS));

    let dispatched = dispatcher
        .dispatch(send(Family::Sms, "US").with_timeout(Duration::from_secs(5)))
        .await
        .unwrap();
    match dispatched.outcome {
        OperationOutcome::Sent(receipt) => assert_eq!(receipt.details["has_deadline"], json!(true)),
        other => panic!("unexpected outcome {other:?}"),
    }

    let token = CancellationToken::new();
    token.cancel();
    let err = dispatcher
        .dispatch(send(Family::Sms, "US").with_context(InvocationContext::new().with_cancellation(token)))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Provider { .. }));
}

#[tokio::test]
async fn test_every_operation_routes() {
    let dispatcher = Dispatcher::with_registry(registry(TWO_SMS));

    let outcome = dispatcher
        .dispatch(DispatchRequest::cancel(Family::Email, "BR", "m-1"))
        .await
        .unwrap()
        .into_outcome();
    assert_eq!(outcome, OperationOutcome::Cancelled(CancelOutcome::cancelled()));

    let outcome = dispatcher
        .dispatch(DispatchRequest::check_delivery_status(Family::Email, "BR", "m-1"))
        .await
        .unwrap()
        .into_outcome();
    assert!(matches!(outcome, OperationOutcome::DeliveryStatus(r) if r.status == MissiveStatus::Delivered));

    let outcome = dispatcher
        .dispatch(DispatchRequest::service_info(Family::Email, "BR"))
        .await
        .unwrap()
        .into_outcome();
    assert!(matches!(outcome, OperationOutcome::ServiceInfo(_)));

    let outcome = dispatcher
        .dispatch(DispatchRequest::delivery_risk(
            Family::Email,
            "BR",
            MessagePayload::new("x".repeat(80)),
        ))
        .await
        .unwrap()
        .into_outcome();
    assert!(matches!(outcome, OperationOutcome::DeliveryRisk(r) if !r.should_send));

    let event = RawEvent::new(json!({"event": "bounced"})).with_header("X-Signature", "sig");
    let outcome = dispatcher
        .dispatch(DispatchRequest::webhook(Family::Email, "BR", event.clone()).with_provider("na-sms"))
        .await
        .unwrap()
        .into_outcome();
    assert!(matches!(outcome, OperationOutcome::Webhook(e) if e.status == Some(MissiveStatus::Failed)));

    let outcome = dispatcher
        .dispatch(DispatchRequest::validate_webhook_signature(Family::Email, "BR", event, "sig"))
        .await
        .unwrap()
        .into_outcome();
    assert_eq!(outcome, OperationOutcome::SignatureValid(true));
}

#[tokio::test]
async fn test_round_robin_and_priority_policies() {
    let json = r#"{"providers": [
        {"id": "a", "kind": "echo", "supported_types": ["email"], "email_geo": "*"},
        {"id": "b", "kind": "echo", "supported_types": ["email"], "email_geo": "*", "priority": 10}
    ]}"#;

    let round_robin = Dispatcher::new(
        registry(json),
        DispatcherConfig::builder().policy(SelectionPolicy::RoundRobin).build(),
    );
    let mut picks = Vec::new();
    for _ in 0..4 {
        picks.push(round_robin.dispatch(send(Family::Email, "IT")).await.unwrap().provider_id);
    }
    assert_eq!(picks, vec!["a", "b", "a", "b"]);

    let priority = Dispatcher::new(
        registry(json),
        DispatcherConfig::default().with_policy(SelectionPolicy::HighestPriority),
    );
    let dispatched = priority.dispatch(send(Family::Email, "IT")).await.unwrap();
    assert_eq!(dispatched.provider_id, "b");
}

#[tokio::test]
async fn test_concurrent_dispatches_share_registry() {
    let dispatcher = Dispatcher::with_registry(registry(TWO_SMS));

    let calls = ["US", "FR", "CA", "DE", "MX", "ES"]
        .into_iter()
        .map(|country| dispatcher.dispatch(send(Family::Sms, country)));
    let results = futures::future::join_all(calls).await;

    let ids: Vec<String> = results.into_iter().map(|r| r.unwrap().provider_id).collect();
    assert_eq!(ids, vec!["na-sms", "eu-sms", "na-sms", "eu-sms", "na-sms", "eu-sms"]);
}

#[tokio::test]
async fn test_in_flight_dispatch_keeps_its_snapshot() {
    let gate = Arc::new(Notify::new());
    let entered = Arc::new(Notify::new());

    let mut factories = factories();
    let (wait_on, signal) = (Arc::clone(&gate), Arc::clone(&entered));
    factories.register_fn("gated", &[], move |settings| {
        let (gate, entered) = (Arc::clone(&wait_on), Arc::clone(&signal));
        let id = settings.provider_id().to_string();
        let sms = echo(id.clone()).on_send(move |payload, _| {
            let (gate, entered, id) = (Arc::clone(&gate), Arc::clone(&entered), id.clone());
            async move {
                entered.notify_one();
                gate.notified().await;
                Ok(SendReceipt::new(format!("{id}:{}", payload.recipient)))
            }
        });
        Ok(ProviderBindings::new().with_channel(Family::Sms, sms))
    });

    let config = RegistryConfig::from_json_str(
        r#"{"providers": [{"id": "old", "kind": "gated", "supported_types": ["sms"], "sms_geo": "*"}]}"#,
    )
    .unwrap();
    let dispatcher = Dispatcher::with_registry(
        ProviderRegistry::load(&config, &factories, CountryDataset::embedded()).unwrap(),
    );

    let in_flight = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.dispatch(send(Family::Sms, "US")).await })
    };
    entered.notified().await;

    let previous = dispatcher.registry().replace(registry(
        r#"{"providers": [{"id": "new", "kind": "echo", "supported_types": ["sms"], "sms_geo": "*"}]}"#,
    ));
    assert!(previous.get("old").is_some());

    let after_swap = dispatcher.dispatch(send(Family::Sms, "US")).await.unwrap();
    assert_eq!(after_swap.provider_id, "new");

    gate.notify_one();
    let finished = in_flight.await.unwrap().unwrap();
    assert_eq!(finished.provider_id, "old");
}
