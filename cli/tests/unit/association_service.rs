//! Tests for the `associate_device` application service.

#![allow(clippy::expect_used)]

use jitp_cli::application::services::association::{
    AssociationOutcome, GrantApplied, associate_device,
};
use jitp_cli::domain::{AssociationError, ControlPlaneError, ControlPlaneErrorKind};

use crate::mocks::{
    CallLog, MemoryShadowStore, NoopReporter, RecordingControlPlane, cert_arn, device_settings,
};

#[tokio::test]
async fn tagged_device_is_described_once_and_never_written() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log).with_attribute("tenantId", "acme");
    let shadows = MemoryShadowStore::new(&log);

    let outcome = associate_device(&control, &shadows, &NoopReporter, &device_settings(&[]))
        .await
        .expect("association succeeds");

    assert_eq!(
        outcome,
        AssociationOutcome::AlreadyAssociated {
            tenant_id: "acme".to_string()
        }
    );
    assert_eq!(log.calls(), vec!["describe_thing sensor-1"]);
}

#[tokio::test]
async fn tag_write_preserves_unrelated_attributes() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log)
        .with_attribute("stage", "dev")
        .with_attribute("blocked", "0")
        .with_certificate("c0ffee", &[]);
    let shadows = MemoryShadowStore::new(&log);

    associate_device(&control, &shadows, &NoopReporter, &device_settings(&[]))
        .await
        .expect("association succeeds");

    let attributes = control.attributes();
    assert_eq!(attributes.get("tenantId").map(String::as_str), Some("acme"));
    assert_eq!(attributes.get("stage").map(String::as_str), Some("dev"));
    assert_eq!(attributes.get("blocked").map(String::as_str), Some("0"));
    assert_eq!(
        log.of("merge_thing_attributes"),
        vec!["merge_thing_attributes sensor-1 tenantId=acme"]
    );
}

#[tokio::test]
async fn empty_tenant_attribute_counts_as_unassociated() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log)
        .with_attribute("tenantId", "")
        .with_certificate("c0ffee", &[]);
    let shadows = MemoryShadowStore::new(&log);

    let outcome = associate_device(&control, &shadows, &NoopReporter, &device_settings(&[]))
        .await
        .expect("association succeeds");

    assert!(matches!(outcome, AssociationOutcome::Associated { .. }));
}

#[tokio::test]
async fn per_device_policy_is_attached_to_first_certificate() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log)
        .with_certificate("first", &[])
        .with_certificate("second", &[]);
    let shadows = MemoryShadowStore::new(&log);

    let outcome = associate_device(&control, &shadows, &NoopReporter, &device_settings(&[]))
        .await
        .expect("association succeeds");

    let AssociationOutcome::Associated {
        grant: GrantApplied::DevicePolicy {
            policy_name,
            principal,
        },
    } = outcome
    else {
        panic!("expected a device policy grant, got {outcome:?}");
    };
    assert!(policy_name.starts_with("dta-"));
    assert_eq!(principal, cert_arn("first"));
    assert_eq!(
        log.of("attach_policy"),
        vec![format!("attach_policy {policy_name} {}", cert_arn("first"))]
    );
    assert!(log.of("add_thing_to_group").is_empty());
}

#[tokio::test]
async fn workflow_steps_run_in_order() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log).with_certificate("c0ffee", &[]);
    let shadows = MemoryShadowStore::new(&log);

    associate_device(&control, &shadows, &NoopReporter, &device_settings(&[]))
        .await
        .expect("association succeeds");

    let order: Vec<usize> = [
        "describe_thing",
        "merge_thing_attributes",
        "update_shadow",
        "list_thing_principals",
        "create_policy",
        "attach_policy",
    ]
    .iter()
    .map(|op| log.position(op).expect("call recorded"))
    .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]), "{:?}", log.calls());
}

#[tokio::test]
async fn thing_group_escalation_skips_policy_creation() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log);
    let shadows = MemoryShadowStore::new(&log);
    let settings = device_settings(&[("THING_GROUP", "fleet-A")]);

    let outcome = associate_device(&control, &shadows, &NoopReporter, &settings)
        .await
        .expect("association succeeds");

    assert_eq!(
        outcome,
        AssociationOutcome::Associated {
            grant: GrantApplied::ThingGroup("fleet-A".to_string())
        }
    );
    assert_eq!(
        log.of("add_thing_to_group"),
        vec!["add_thing_to_group sensor-1 fleet-A"]
    );
    assert!(log.of("create_policy").is_empty());
    assert!(log.of("list_thing_principals").is_empty());
}

#[tokio::test]
async fn shadow_is_seeded_with_pairing_state_by_default() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log).with_certificate("c0ffee", &[]);
    let shadows = MemoryShadowStore::new(&log);

    associate_device(&control, &shadows, &NoopReporter, &device_settings(&[]))
        .await
        .expect("association succeeds");

    assert_eq!(
        shadows.documents(),
        vec![serde_json::json!({"state": {"reported": {"pairing": {"state": "paired"}}}})]
    );
}

#[tokio::test]
async fn topic_prefix_seed_uses_stage_and_tenant() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log).with_certificate("c0ffee", &[]);
    let shadows = MemoryShadowStore::new(&log);
    let settings = device_settings(&[("SHADOW_SEED", "topic-prefix"), ("STAGE", "prod")]);

    associate_device(&control, &shadows, &NoopReporter, &settings)
        .await
        .expect("association succeeds");

    assert_eq!(
        shadows.documents(),
        vec![serde_json::json!({"state": {"reported": {"mqttTopicPrefix": "prod/acme/"}}})]
    );
}

#[tokio::test]
async fn missing_certificate_fails_with_no_principal() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log);
    let shadows = MemoryShadowStore::new(&log);

    let err = associate_device(&control, &shadows, &NoopReporter, &device_settings(&[]))
        .await
        .expect_err("no certificate to attach to");

    assert!(matches!(
        err.downcast_ref::<AssociationError>(),
        Some(AssociationError::NoPrincipal(id)) if id == "sensor-1"
    ));
    assert!(log.of("create_policy").is_empty(), "no orphaned device policy");
    assert!(log.of("attach_policy").is_empty());
}

#[tokio::test]
async fn failed_tag_write_aborts_before_shadow_and_grant() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log)
        .with_certificate("c0ffee", &[])
        .failing("merge_thing_attributes");
    let shadows = MemoryShadowStore::new(&log);

    let err = associate_device(&control, &shadows, &NoopReporter, &device_settings(&[]))
        .await
        .expect_err("tag write rejected");

    let cause = err
        .downcast_ref::<ControlPlaneError>()
        .expect("typed control-plane error in chain");
    assert_eq!(cause.kind, ControlPlaneErrorKind::AccessDenied);
    assert_eq!(cause.operation, "merge_thing_attributes");
    assert!(shadows.documents().is_empty());
    assert!(log.of("create_policy").is_empty());
}
