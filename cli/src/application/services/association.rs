//! Application service: device-to-tenant association use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! Unassociated → associated, gated on the thing's `tenantId` attribute:
//!
//! 1. describe the thing; a present tenant tag ends the workflow (no writes)
//! 2. merge-write the tenant tag
//! 3. seed the shadow's `reported` branch
//! 4. grant access: thing-group escalation, or a per-device policy attached
//!    to the thing's first certificate
//!
//! Any failing step aborts. Re-running from step 1 is always safe.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use jitp_common::ShadowDocument;

use crate::application::ports::{ControlPlane, ProgressReporter, ShadowStore};
use crate::domain::policy::{device_policy, device_policy_name};
use crate::domain::{AccessGrant, AssociationError, DeviceSettings, TENANT_ATTRIBUTE};

/// Outcome of the `associate_device` use-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationOutcome {
    /// The device already carried a tenant tag; nothing was written.
    AlreadyAssociated { tenant_id: String },
    /// The device was tagged, seeded and granted access.
    Associated { grant: GrantApplied },
}

/// Which access grant was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantApplied {
    ThingGroup(String),
    DevicePolicy { policy_name: String, principal: String },
}

/// Associate the configured device with the configured tenant.
///
/// # Errors
///
/// Returns the first failing control-plane or shadow call, or
/// [`AssociationError::NoPrincipal`] when a per-device policy has no
/// certificate to attach to.
pub async fn associate_device(
    control: &impl ControlPlane,
    shadows: &impl ShadowStore,
    reporter: &impl ProgressReporter,
    settings: &DeviceSettings,
) -> Result<AssociationOutcome> {
    let device_id = settings.device_id.as_str();

    // 1. Idempotency check
    let thing = control
        .describe_thing(device_id)
        .await
        .with_context(|| format!("describing device {device_id}"))?;
    if let Some(tenant_id) = thing.tenant_id() {
        tracing::debug!(device_id, tenant_id, "device already associated");
        return Ok(AssociationOutcome::AlreadyAssociated {
            tenant_id: tenant_id.to_string(),
        });
    }

    // 2. Tag (merge)
    reporter.step(&format!(
        "setting device's tenantId attribute to {}",
        settings.tenant_id
    ));
    let tag = BTreeMap::from([(TENANT_ATTRIBUTE.to_string(), settings.tenant_id.clone())]);
    control
        .merge_thing_attributes(device_id, &tag)
        .await
        .context("tagging device with tenant")?;

    // 3. Seed shadow
    reporter.step("creating the device's shadow with its initial state");
    let seed = ShadowDocument::reported(
        settings
            .shadow_seed
            .reported_state(&settings.stage, &settings.tenant_id),
    );
    shadows
        .update_shadow(device_id, &seed)
        .await
        .context("seeding device shadow")?;

    // 4. Grant access
    let grant = match settings.access_grant() {
        AccessGrant::ThingGroup(group) => {
            reporter.step(&format!("adding device to thing group {group}"));
            control
                .add_thing_to_group(device_id, &group)
                .await
                .with_context(|| format!("adding device to thing group {group}"))?;
            GrantApplied::ThingGroup(group)
        }
        AccessGrant::DevicePolicy => grant_device_policy(control, reporter, settings).await?,
    };

    tracing::info!(device_id, tenant_id = %settings.tenant_id, ?grant, "device associated");
    reporter.success("device associated with tenant");
    Ok(AssociationOutcome::Associated { grant })
}

async fn grant_device_policy(
    control: &impl ControlPlane,
    reporter: &impl ProgressReporter,
    settings: &DeviceSettings,
) -> Result<GrantApplied> {
    let device_id = settings.device_id.as_str();
    let policy_name = device_policy_name(&uuid::Uuid::new_v4().to_string());
    let document = device_policy(device_id, &settings.stage, &settings.tenant_id)
        .to_json()
        .context("encoding device policy")?;

    // No policy is created for a device without a certificate.
    let principals = control
        .list_thing_principals(device_id)
        .await
        .context("listing device certificates")?;
    let principal = principals
        .into_iter()
        .next()
        .ok_or_else(|| AssociationError::NoPrincipal(device_id.to_string()))?;

    reporter.step(&format!("creating device policy {policy_name}"));
    control
        .create_policy(&policy_name, &document)
        .await
        .with_context(|| format!("creating policy {policy_name}"))?;

    reporter.step("attaching new policy to device certificate");
    control
        .attach_policy(&policy_name, &principal)
        .await
        .with_context(|| format!("attaching policy {policy_name}"))?;

    Ok(GrantApplied::DevicePolicy {
        policy_name,
        principal,
    })
}
