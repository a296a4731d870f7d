//! Tests for the `delete_device` application service.

#![allow(clippy::expect_used)]

use jitp_cli::application::services::cleanup::delete_device;
use jitp_cli::domain::CleanupError;

use crate::mocks::{CallLog, NoopReporter, RecordingControlPlane, cert_arn};

#[tokio::test]
async fn zero_principals_goes_straight_to_thing_deletion() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log);

    let summary = delete_device(&control, &NoopReporter, "sensor-1")
        .await
        .expect("cleanup succeeds");

    assert_eq!(
        log.calls(),
        vec!["list_thing_principals sensor-1", "delete_thing sensor-1"]
    );
    assert!(summary.certificates.is_empty());
    assert_eq!(summary.policies_detached, 0);
}

#[tokio::test]
async fn certificate_is_fully_unwound_in_order() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log).with_certificate("abc", &["jitp-connect", "dta-1"]);
    let arn = cert_arn("abc");

    let summary = delete_device(&control, &NoopReporter, "sensor-1")
        .await
        .expect("cleanup succeeds");

    assert_eq!(
        log.calls(),
        vec![
            "list_thing_principals sensor-1".to_string(),
            format!("list_attached_policies {arn}"),
            format!("detach_policy jitp-connect {arn}"),
            format!("detach_policy dta-1 {arn}"),
            format!("detach_thing_principal sensor-1 {arn}"),
            "deactivate_certificate abc".to_string(),
            "delete_certificate abc".to_string(),
            "delete_thing sensor-1".to_string(),
        ]
    );
    assert_eq!(summary.certificates, vec!["abc"]);
    assert_eq!(summary.policies_detached, 2);
}

#[tokio::test]
async fn every_certificate_is_deactivated_before_deletion() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log)
        .with_certificate("one", &["p"])
        .with_certificate("two", &[]);

    delete_device(&control, &NoopReporter, "sensor-1")
        .await
        .expect("cleanup succeeds");

    for id in ["one", "two"] {
        let deactivate = log
            .position(&format!("deactivate_certificate {id}"))
            .expect("deactivated");
        let delete = log
            .position(&format!("delete_certificate {id}"))
            .expect("deleted");
        assert!(deactivate < delete, "{id}: {:?}", log.calls());
    }
    assert_eq!(log.calls().last().map(String::as_str), Some("delete_thing sensor-1"));
}

#[tokio::test]
async fn detach_failure_aborts_before_certificate_is_touched() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log)
        .with_certificate("abc", &["jitp-connect"])
        .failing("detach_policy");

    delete_device(&control, &NoopReporter, "sensor-1")
        .await
        .expect_err("detach rejected");

    assert!(log.of("detach_thing_principal").is_empty());
    assert!(log.of("deactivate_certificate").is_empty());
    assert!(log.of("delete_certificate").is_empty());
    assert!(log.of("delete_thing").is_empty());
}

#[tokio::test]
async fn delete_failure_keeps_the_thing() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log)
        .with_certificate("abc", &[])
        .failing("delete_certificate");

    delete_device(&control, &NoopReporter, "sensor-1")
        .await
        .expect_err("delete rejected");

    assert_eq!(log.of("deactivate_certificate"), vec!["deactivate_certificate abc"]);
    assert!(log.of("delete_thing").is_empty());
}

#[tokio::test]
async fn non_certificate_principal_aborts_before_any_mutation() {
    let log = CallLog::default();
    let control = RecordingControlPlane::new(&log)
        .with_certificate("abc", &["p"])
        .with_principal("arn:aws:cognito-identity:us-east-1:123456789012:identity/x");

    let err = delete_device(&control, &NoopReporter, "sensor-1")
        .await
        .expect_err("not a certificate");

    assert!(matches!(
        err.downcast_ref::<CleanupError>(),
        Some(CleanupError::NotACertificate(_))
    ));
    assert_eq!(log.calls(), vec!["list_thing_principals sensor-1"]);
}
