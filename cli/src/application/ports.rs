//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `jitp_common`, never from
//! `crate::infra`, `crate::commands`, or `crate::output`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use jitp_common::ShadowDocument;

use crate::domain::ThingDescription;

// ── Control-plane Port Traits ─────────────────────────────────────────────────

/// Thing registry operations.
#[allow(async_fn_in_trait)]
pub trait ThingRegistry {
    /// Describe a thing (attributes and type).
    async fn describe_thing(&self, thing_name: &str) -> Result<ThingDescription>;
    /// Write attributes with merge semantics: unrelated attributes survive.
    async fn merge_thing_attributes(
        &self,
        thing_name: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<()>;
    /// Add a thing to a static thing group.
    async fn add_thing_to_group(&self, thing_name: &str, group_name: &str) -> Result<()>;
    /// List every principal (certificate ARN) attached to a thing.
    async fn list_thing_principals(&self, thing_name: &str) -> Result<Vec<String>>;
    /// Detach a principal from a thing.
    async fn detach_thing_principal(&self, thing_name: &str, principal: &str) -> Result<()>;
    /// Delete a thing.
    async fn delete_thing(&self, thing_name: &str) -> Result<()>;
}

/// Policy management operations.
#[allow(async_fn_in_trait)]
pub trait PolicyRegistry {
    /// Create a named policy from a JSON document.
    async fn create_policy(&self, policy_name: &str, document: &str) -> Result<()>;
    /// Attach a policy to a principal.
    async fn attach_policy(&self, policy_name: &str, target: &str) -> Result<()>;
    /// List the names of policies attached to a principal.
    async fn list_attached_policies(&self, target: &str) -> Result<Vec<String>>;
    /// Detach a policy from a principal.
    async fn detach_policy(&self, policy_name: &str, target: &str) -> Result<()>;
}

/// Certificate lifecycle operations.
#[allow(async_fn_in_trait)]
pub trait CertificateRegistry {
    /// Set a certificate to `INACTIVE`.
    async fn deactivate_certificate(&self, certificate_id: &str) -> Result<()>;
    /// Delete a certificate. The control plane rejects active certificates.
    async fn delete_certificate(&self, certificate_id: &str) -> Result<()>;
}

/// Composite trait: any type implementing all three registries is a `ControlPlane`.
pub trait ControlPlane: ThingRegistry + PolicyRegistry + CertificateRegistry {}

/// Blanket implementation: any type implementing all three registries is a `ControlPlane`.
impl<T> ControlPlane for T where T: ThingRegistry + PolicyRegistry + CertificateRegistry {}

// ── Data-plane Port ───────────────────────────────────────────────────────────

/// Device shadow writes.
#[allow(async_fn_in_trait)]
pub trait ShadowStore {
    /// Update (merge into) the classic shadow of a thing.
    async fn update_shadow(&self, thing_name: &str, document: &ShadowDocument) -> Result<()>;
}

// ── Transport Port ────────────────────────────────────────────────────────────

/// Outbound half of the device's MQTT connection. Inbound traffic arrives as
/// `DeviceEvent`s on the session queue.
#[allow(async_fn_in_trait)]
pub trait DeviceTransport {
    /// Request a subscription; confirmation arrives as `DeviceEvent::Subscribed`.
    async fn subscribe(&self, topic: &str) -> Result<()>;
    /// Publish a payload.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;
    /// Send DISCONNECT; the transport then emits `DeviceEvent::Closed`.
    async fn disconnect(&self) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

/// Receives application messages surfaced by the device session.
pub trait MessageSink {
    /// A payload that parsed as JSON.
    fn received(&self, topic: &str, body: &serde_json::Value);
    /// A payload that did not.
    fn malformed(&self, topic: &str, error: &str);
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Persists a generated template document.
pub trait TemplateWriter {
    /// Write `contents` to `target`, or to a fresh temporary file when `None`.
    /// Returns the path written.
    fn write_template(&self, contents: &str, target: Option<&Path>) -> Result<PathBuf>;
}
