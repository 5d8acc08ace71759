//! OpenTelemetry dispatch counters.
//!
//! Recorded through the global meter provider; install one in the host
//! application to export them.

use crate::capability::{Family, Operation};
use once_cell::sync::Lazy;
use opentelemetry::metrics::Counter;
use opentelemetry::{KeyValue, global};

const METER_NAME: &str = "missive_dispatch";

static DISPATCH_ATTEMPTS: Lazy<Counter<u64>> = Lazy::new(|| {
    global::meter(METER_NAME)
        .u64_counter("missive.dispatch.attempts")
        .with_description("Dispatch calls, by family, operation, and outcome")
        .build()
});

static DISPATCH_FAILURES: Lazy<Counter<u64>> = Lazy::new(|| {
    global::meter(METER_NAME)
        .u64_counter("missive.dispatch.failures")
        .with_description("Failed dispatch calls, by family, operation, and outcome")
        .build()
});

pub(crate) fn record_dispatch(family: Family, operation: Operation, outcome: &'static str) {
    let labels = [
        KeyValue::new("family", family.as_str()),
        KeyValue::new("operation", operation.as_str()),
        KeyValue::new("outcome", outcome),
    ];
    DISPATCH_ATTEMPTS.add(1, &labels);
    if outcome != "ok" {
        DISPATCH_FAILURES.add(1, &labels);
    }
}
