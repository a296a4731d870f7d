//! Application service: device cleanup use-case.
//!
//! Reverses what just-in-time provisioning created: for every certificate
//! attached to the thing, detach its policies, detach it from the thing,
//! deactivate it, delete it; then delete the thing. The first failure aborts
//! so no certificate is left inactive-but-undeleted behind a later error.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{ControlPlane, ProgressReporter};
use crate::domain::certificate_id;

/// What `delete_device` removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupSummary {
    pub device_id: String,
    /// Deleted certificate ids, in processing order.
    pub certificates: Vec<String>,
    /// Number of policy attachments removed across all certificates.
    pub policies_detached: usize,
}

/// Delete a device and every certificate attached to it.
///
/// # Errors
///
/// Returns the first failing control-plane call, or an error if a principal
/// is not a certificate ARN (checked before anything is modified).
pub async fn delete_device(
    control: &impl ControlPlane,
    reporter: &impl ProgressReporter,
    device_id: &str,
) -> Result<CleanupSummary> {
    let principals = control
        .list_thing_principals(device_id)
        .await
        .with_context(|| format!("listing principals of {device_id}"))?;

    let targets = principals
        .iter()
        .map(|arn| certificate_id(arn).map(|id| (arn.as_str(), id)))
        .collect::<Result<Vec<_>>>()?;

    let mut summary = CleanupSummary {
        device_id: device_id.to_string(),
        ..CleanupSummary::default()
    };

    for (principal, cert_id) in targets {
        reporter.step(&format!("removing certificate {cert_id}"));

        let policies = control
            .list_attached_policies(principal)
            .await
            .with_context(|| format!("listing policies of certificate {cert_id}"))?;
        for policy in &policies {
            control
                .detach_policy(policy, principal)
                .await
                .with_context(|| format!("detaching policy {policy} from {cert_id}"))?;
            tracing::debug!(policy, cert_id, "policy detached");
        }
        summary.policies_detached += policies.len();

        control
            .detach_thing_principal(device_id, principal)
            .await
            .with_context(|| format!("detaching certificate {cert_id} from {device_id}"))?;
        control
            .deactivate_certificate(cert_id)
            .await
            .with_context(|| format!("deactivating certificate {cert_id}"))?;
        control
            .delete_certificate(cert_id)
            .await
            .with_context(|| format!("deleting certificate {cert_id}"))?;

        tracing::info!(cert_id, device_id, "certificate deleted");
        summary.certificates.push(cert_id.to_string());
    }

    reporter.step(&format!("deleting device {device_id}"));
    control
        .delete_thing(device_id)
        .await
        .with_context(|| format!("deleting device {device_id}"))?;
    reporter.success(&format!("device {device_id} deleted"));

    Ok(summary)
}
