//! Capability contract verification.

use super::bindings::ProviderBindings;
use super::error::{CapabilityGap, MissingCapability};
use super::family::Family;
use crate::registry::ProviderDescriptor;

/// Check that a descriptor's implementation covers every operation of every
/// declared family.
///
/// All gaps are collected before returning, so one call yields the complete
/// deficiency list.
pub fn verify(descriptor: &ProviderDescriptor) -> Result<(), MissingCapability> {
    verify_bindings(
        descriptor.id(),
        descriptor.supported_types().iter().copied(),
        descriptor.implementation(),
    )
}

/// Same check as [`verify`], before a descriptor exists.
pub fn verify_bindings(
    provider_id: &str,
    supported: impl IntoIterator<Item = Family>,
    bindings: &ProviderBindings,
) -> Result<(), MissingCapability> {
    let mut families: Vec<Family> = supported.into_iter().collect();
    families.sort();
    families.dedup();

    let gaps: Vec<CapabilityGap> = families
        .into_iter()
        .flat_map(|family| {
            let capability = family.capability();
            let channel = bindings.channel(family);
            capability
                .operations
                .iter()
                .filter(move |op| !channel.is_some_and(|c| c.supports(**op)))
                .map(move |op| CapabilityGap::new(family, *op))
        })
        .collect();

    if gaps.is_empty() {
        Ok(())
    } else {
        Err(MissingCapability {
            provider_id: provider_id.to_string(),
            gaps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{ChannelBindings, Operation};
    use crate::types::{CancelOutcome, SendReceipt};

    fn send_and_cancel() -> ChannelBindings {
        ChannelBindings::new()
            .on_send(|p, _| async move { Ok(SendReceipt::new(p.recipient)) })
            .on_cancel(|_, _| async { Ok(CancelOutcome::cancelled()) })
    }

    #[test]
    fn test_no_families_no_gaps() {
        assert!(verify_bindings("idle", [], &ProviderBindings::new()).is_ok());
    }

    #[test]
    fn test_undeclared_family_bindings_are_ignored() {
        let bindings = ProviderBindings::new().with_channel(Family::Push, ChannelBindings::new());
        assert!(verify_bindings("p", [], &bindings).is_ok());
    }

    #[test]
    fn test_missing_family_table_reports_all_seven() {
        let err = verify_bindings("p", [Family::Voice], &ProviderBindings::new()).unwrap_err();
        assert_eq!(err.gaps.len(), 7);
        assert!(err.gaps.iter().all(|g| g.family == Family::Voice));
    }

    #[test]
    fn test_gaps_across_families_are_exhaustive_and_ordered() {
        let bindings = ProviderBindings::new()
            .with_channel(Family::Sms, send_and_cancel())
            .with_channel(Family::Email, send_and_cancel());

        let err = verify_bindings("multi", [Family::Sms, Family::Email], &bindings).unwrap_err();
        assert_eq!(err.provider_id, "multi");
        assert_eq!(err.gaps.len(), 10);
        assert_eq!(err.gaps[0], CapabilityGap::new(Family::Email, Operation::CheckDeliveryStatus));
        assert_eq!(
            err.gaps.last().copied(),
            Some(CapabilityGap::new(Family::Sms, Operation::ValidateWebhookSignature))
        );
        assert!(!err.contains(Family::Sms, Operation::Send));
    }
}
