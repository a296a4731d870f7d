//! Shared recording mocks for the application-service tests.
//!
//! Every mock appends `"<operation> <args>"` to one shared [`CallLog`] so a
//! test can assert on the relative order of control-plane, shadow and
//! transport calls.

#![allow(clippy::expect_used)]

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use jitp_cli::application::ports::{
    CertificateRegistry, DeviceTransport, MessageSink, PolicyRegistry, ProgressReporter,
    ShadowStore, TemplateWriter, ThingRegistry,
};
use jitp_cli::domain::{ControlPlaneError, ControlPlaneErrorKind, DeviceSettings, ThingDescription};
use jitp_cli::infra::config::from_vars;
use jitp_common::ShadowDocument;

// ── Call log ──────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: String) {
        self.0.lock().expect("lock").push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().expect("lock").clone()
    }

    /// Calls whose operation name is `op`.
    pub fn of(&self, op: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split_whitespace().next() == Some(op))
            .collect()
    }

    /// Index of the first call starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.starts_with(prefix))
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

pub fn device_settings(extra: &[(&str, &str)]) -> DeviceSettings {
    let base = [
        ("DEVICE_ID", "sensor-1"),
        ("MQTT_ENDPOINT", "abc-ats.iot.us-east-1.amazonaws.com"),
        ("TENANT_ID", "acme"),
    ];
    from_vars(
        base.iter()
            .chain(extra)
            .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
    )
    .expect("valid settings")
}

// ── Control plane ─────────────────────────────────────────────────────────────

/// In-memory registry that records every call.
pub struct RecordingControlPlane {
    pub log: CallLog,
    pub attributes: Mutex<BTreeMap<String, String>>,
    pub principals: Vec<String>,
    /// Attached policy names per principal ARN.
    pub policies: BTreeMap<String, Vec<String>>,
    fail_on: HashSet<&'static str>,
}

impl RecordingControlPlane {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            attributes: Mutex::new(BTreeMap::new()),
            principals: Vec::new(),
            policies: BTreeMap::new(),
            fail_on: HashSet::new(),
        }
    }

    pub fn with_attribute(self, key: &str, value: &str) -> Self {
        self.attributes
            .lock()
            .expect("lock")
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_certificate(mut self, id: &str, policies: &[&str]) -> Self {
        let arn = cert_arn(id);
        self.policies
            .insert(arn.clone(), policies.iter().map(|p| (*p).to_string()).collect());
        self.principals.push(arn);
        self
    }

    pub fn with_principal(mut self, arn: &str) -> Self {
        self.principals.push(arn.to_string());
        self
    }

    /// Make every call to `operation` fail with `AccessDenied`.
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.fail_on.insert(operation);
        self
    }

    pub fn attributes(&self) -> BTreeMap<String, String> {
        self.attributes.lock().expect("lock").clone()
    }

    fn call(&self, operation: &'static str, args: &[&str]) -> Result<()> {
        self.log.push(format!("{operation} {}", args.join(" ")).trim_end().to_string());
        if self.fail_on.contains(operation) {
            return Err(ControlPlaneError {
                operation,
                kind: ControlPlaneErrorKind::AccessDenied,
                detail: "not authorized".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

pub fn cert_arn(id: &str) -> String {
    format!("arn:aws:iot:us-east-1:123456789012:cert/{id}")
}

impl ThingRegistry for RecordingControlPlane {
    async fn describe_thing(&self, thing_name: &str) -> Result<ThingDescription> {
        self.call("describe_thing", &[thing_name])?;
        Ok(ThingDescription {
            thing_name: thing_name.to_string(),
            attributes: self.attributes(),
        })
    }

    async fn merge_thing_attributes(
        &self,
        thing_name: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<()> {
        let pairs: Vec<String> = attributes.iter().map(|(k, v)| format!("{k}={v}")).collect();
        self.call("merge_thing_attributes", &[thing_name, &pairs.join(",")])?;
        self.attributes
            .lock()
            .expect("lock")
            .extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    async fn add_thing_to_group(&self, thing_name: &str, group_name: &str) -> Result<()> {
        self.call("add_thing_to_group", &[thing_name, group_name])
    }

    async fn list_thing_principals(&self, thing_name: &str) -> Result<Vec<String>> {
        self.call("list_thing_principals", &[thing_name])?;
        Ok(self.principals.clone())
    }

    async fn detach_thing_principal(&self, thing_name: &str, principal: &str) -> Result<()> {
        self.call("detach_thing_principal", &[thing_name, principal])
    }

    async fn delete_thing(&self, thing_name: &str) -> Result<()> {
        self.call("delete_thing", &[thing_name])
    }
}

impl PolicyRegistry for RecordingControlPlane {
    async fn create_policy(&self, policy_name: &str, _document: &str) -> Result<()> {
        self.call("create_policy", &[policy_name])
    }

    async fn attach_policy(&self, policy_name: &str, target: &str) -> Result<()> {
        self.call("attach_policy", &[policy_name, target])
    }

    async fn list_attached_policies(&self, target: &str) -> Result<Vec<String>> {
        self.call("list_attached_policies", &[target])?;
        Ok(self.policies.get(target).cloned().unwrap_or_default())
    }

    async fn detach_policy(&self, policy_name: &str, target: &str) -> Result<()> {
        self.call("detach_policy", &[policy_name, target])
    }
}

impl CertificateRegistry for RecordingControlPlane {
    async fn deactivate_certificate(&self, certificate_id: &str) -> Result<()> {
        self.call("deactivate_certificate", &[certificate_id])
    }

    async fn delete_certificate(&self, certificate_id: &str) -> Result<()> {
        self.call("delete_certificate", &[certificate_id])
    }
}

// ── Shadow store ──────────────────────────────────────────────────────────────

pub struct MemoryShadowStore {
    log: CallLog,
    pub written: Mutex<Vec<serde_json::Value>>,
}

impl MemoryShadowStore {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn documents(&self) -> Vec<serde_json::Value> {
        self.written.lock().expect("lock").clone()
    }
}

impl ShadowStore for MemoryShadowStore {
    async fn update_shadow(&self, thing_name: &str, document: &ShadowDocument) -> Result<()> {
        self.log.push(format!("update_shadow {thing_name}"));
        let value = serde_json::to_value(document)?;
        self.written.lock().expect("lock").push(value);
        Ok(())
    }
}

// ── Transport ─────────────────────────────────────────────────────────────────

pub struct RecordingTransport {
    log: CallLog,
    pub published: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingTransport {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.published.lock().expect("lock").clone()
    }
}

impl DeviceTransport for RecordingTransport {
    async fn subscribe(&self, topic: &str) -> Result<()> {
        self.log.push(format!("subscribe {topic}"));
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.log.push(format!("publish {topic}"));
        self.published
            .lock()
            .expect("lock")
            .push((topic.to_string(), payload));
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.log.push("disconnect".to_string());
        Ok(())
    }
}

// ── Presentation stand-ins ────────────────────────────────────────────────────

pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

#[derive(Default)]
pub struct RecordingSink {
    pub received: Mutex<Vec<(String, serde_json::Value)>>,
    pub malformed: Mutex<Vec<String>>,
}

impl MessageSink for RecordingSink {
    fn received(&self, topic: &str, body: &serde_json::Value) {
        self.received
            .lock()
            .expect("lock")
            .push((topic.to_string(), body.clone()));
    }

    fn malformed(&self, topic: &str, _error: &str) {
        self.malformed.lock().expect("lock").push(topic.to_string());
    }
}

/// Keeps templates in memory; `None` targets get a fixed fake path.
#[derive(Default)]
pub struct MemoryWriter {
    pub files: Mutex<Vec<(PathBuf, String)>>,
}

impl TemplateWriter for MemoryWriter {
    fn write_template(&self, contents: &str, target: Option<&Path>) -> Result<PathBuf> {
        let path = target.map_or_else(|| PathBuf::from("/tmp/jitp-template-test.json"), Path::to_path_buf);
        self.files
            .lock()
            .expect("lock")
            .push((path.clone(), contents.to_string()));
        Ok(path)
    }
}
