//! Candidate selection policies.

use super::request::DispatchRequest;
use crate::registry::ProviderDescriptor;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Picks one provider among the candidates that survived the geo filter.
///
/// `candidates` is never empty and keeps registry configuration order.
/// Returning `None` makes the dispatch fail with `NoProviderSelected`.
pub trait Selector: Send + Sync + Debug {
    fn select<'a>(
        &self,
        request: &DispatchRequest,
        candidates: &[&'a ProviderDescriptor],
    ) -> Option<&'a ProviderDescriptor>;
}

/// First candidate in configuration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl Selector for FirstMatch {
    fn select<'a>(
        &self,
        _request: &DispatchRequest,
        candidates: &[&'a ProviderDescriptor],
    ) -> Option<&'a ProviderDescriptor> {
        candidates.first().copied()
    }
}

/// Highest `priority`; ties go to the earliest configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestPriority;

impl Selector for HighestPriority {
    fn select<'a>(
        &self,
        _request: &DispatchRequest,
        candidates: &[&'a ProviderDescriptor],
    ) -> Option<&'a ProviderDescriptor> {
        candidates
            .iter()
            .copied()
            .min_by_key(|p| Reverse(p.priority()))
    }
}

/// Rotates through the candidates, one step per call.
#[derive(Debug, Default)]
pub struct RoundRobin {
    next: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Selector for RoundRobin {
    fn select<'a>(
        &self,
        _request: &DispatchRequest,
        candidates: &[&'a ProviderDescriptor],
    ) -> Option<&'a ProviderDescriptor> {
        if candidates.is_empty() {
            return None;
        }
        let turn = self.next.fetch_add(1, Ordering::Relaxed);
        candidates.get(turn % candidates.len()).copied()
    }
}

/// Uniformly random candidate.
#[cfg(feature = "random")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomChoice;

#[cfg(feature = "random")]
impl Selector for RandomChoice {
    fn select<'a>(
        &self,
        _request: &DispatchRequest,
        candidates: &[&'a ProviderDescriptor],
    ) -> Option<&'a ProviderDescriptor> {
        use rand::Rng;

        if candidates.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..candidates.len());
        candidates.get(index).copied()
    }
}

/// Built-in policies, nameable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    #[default]
    FirstMatch,
    HighestPriority,
    RoundRobin,
    #[cfg(feature = "random")]
    Random,
}

impl SelectionPolicy {
    pub fn into_selector(self) -> Arc<dyn Selector> {
        match self {
            SelectionPolicy::FirstMatch => Arc::new(FirstMatch),
            SelectionPolicy::HighestPriority => Arc::new(HighestPriority),
            SelectionPolicy::RoundRobin => Arc::new(RoundRobin::new()),
            #[cfg(feature = "random")]
            SelectionPolicy::Random => Arc::new(RandomChoice),
        }
    }
}
