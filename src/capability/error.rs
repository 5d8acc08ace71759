//! Capability contract error types.

use super::family::Family;
use super::operation::Operation;
use crate::errors::ProviderError;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// One `(family, operation)` pair a provider failed to implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapabilityGap {
    pub family: Family,
    pub operation: Operation,
}

impl CapabilityGap {
    pub fn new(family: Family, operation: Operation) -> Self {
        Self { family, operation }
    }

    /// Conventional method name of the missing callable.
    pub fn method_name(&self) -> String {
        self.operation.method_name(self.family)
    }
}

impl Display for CapabilityGap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.method_name())
    }
}

/// Every gap found for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Provider '{provider_id}' is missing {} operation(s): {}", gaps.len(), join(gaps))]
pub struct MissingCapability {
    pub provider_id: String,
    /// Ordered by family, then by operation.
    pub gaps: Vec<CapabilityGap>,
}

impl MissingCapability {
    /// Whether a specific pair is among the gaps.
    pub fn contains(&self, family: Family, operation: Operation) -> bool {
        self.gaps.contains(&CapabilityGap::new(family, operation))
    }
}

fn join(gaps: &[CapabilityGap]) -> String {
    gaps.iter()
        .map(CapabilityGap::method_name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure of one probed operation.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// No callable bound for the pair.
    #[error("No callable bound for {gap}")]
    Missing { gap: CapabilityGap },

    /// The callable ran and returned an error.
    #[error("{gap} failed: {source}")]
    Provider {
        gap: CapabilityGap,
        #[source]
        source: ProviderError,
    },
}

impl CapabilityError {
    pub fn gap(&self) -> CapabilityGap {
        match self {
            CapabilityError::Missing { gap } | CapabilityError::Provider { gap, .. } => *gap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_capability_lists_every_gap() {
        let err = MissingCapability {
            provider_id: "acme".into(),
            gaps: vec![
                CapabilityGap::new(Family::Sms, Operation::Cancel),
                CapabilityGap::new(Family::Email, Operation::HandleWebhook),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Provider 'acme' is missing 2 operation(s): cancel_sms, handle_email_webhook"
        );
        assert!(err.contains(Family::Sms, Operation::Cancel));
        assert!(!err.contains(Family::Sms, Operation::Send));
    }
}
