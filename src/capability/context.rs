//! Per-call context handed to provider implementations.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Deadline and cancellation signal for one provider call.
///
/// The dispatch core forwards this untouched; honoring it is the provider
/// implementation's job.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self {
            deadline: None,
            cancellation: CancellationToken::new(),
        }
    }
}

impl InvocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline relative to now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
