//! Settings schemas and pure validators.
//!
//! Settings are deserialized from the process environment once, at command
//! start (see `infra::config`), then passed by reference. Field names are the
//! lowercased environment variable names.
//!
//! Pure functions only. No I/O.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_STAGE: &str = "dev";
pub const DEFAULT_TENANT_ID: &str = "jitp-test-tenant";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MQTT_PORT: u16 = 8883;
pub const DEFAULT_CERT_PATH: &str = "deviceCertAndCACert.crt";
pub const DEFAULT_KEY_PATH: &str = "deviceCert.key";
pub const DEFAULT_CA_PATH: &str = "AmazonRootCA1.pem";
pub const DEFAULT_RECONNECT_DELAY_SECS: u64 = 5;

/// Thing names: letters, digits, `:`, `_`, `-`. Excludes `/` and MQTT
/// wildcards so the name can be spliced into topics and policy ARNs.
pub static THING_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern and cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-zA-Z0-9:_-]{1,128}$").expect("valid regex")
});

// ── Template settings ────────────────────────────────────────────────────────

/// Inputs of `jitp template`.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSettings {
    /// Deployment stage recorded on every provisioned thing.
    #[serde(default = "default_stage")]
    pub stage: String,
    /// Role the provisioning service assumes (`JITP_ROLE_ARN`).
    #[serde(rename = "jitp_role_arn")]
    pub role_arn: String,
    /// Existing policy to attach instead of an inline one (`JITP_CONNECT_POLICY`).
    #[serde(rename = "jitp_connect_policy", default)]
    pub policy_name: Option<String>,
    #[serde(rename = "jitp_thing_type", default)]
    pub thing_type: Option<String>,
    /// Static group; when unset the certificate OU is used.
    #[serde(rename = "jitp_thing_group", default)]
    pub thing_group: Option<String>,
}

impl TemplateSettings {
    /// Treat empty optional variables as unset.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.policy_name = non_empty(self.policy_name);
        self.thing_type = non_empty(self.thing_type);
        self.thing_group = non_empty(self.thing_group);
        self
    }

    /// # Errors
    ///
    /// Returns an error if the stage or role ARN is empty.
    pub fn validate(&self) -> Result<()> {
        validate_topic_segment("stage", &self.stage)?;
        if self.role_arn.trim().is_empty() {
            return Err(ConfigError::Environment("JITP_ROLE_ARN is empty".to_string()).into());
        }
        Ok(())
    }
}

// ── Device settings ──────────────────────────────────────────────────────────

/// Initial `reported` state written to a newly associated device's shadow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowSeed {
    /// `{"pairing": {"state": "paired"}}`
    #[default]
    Pairing,
    /// `{"mqttTopicPrefix": "<stage>/<tenant>/"}`
    TopicPrefix,
}

impl ShadowSeed {
    #[must_use]
    pub fn reported_state(self, stage: &str, tenant_id: &str) -> Value {
        match self {
            Self::Pairing => json!({ "pairing": { "state": "paired" } }),
            Self::TopicPrefix => json!({
                "mqttTopicPrefix": jitp_common::topics::tenant_prefix(stage, tenant_id)
            }),
        }
    }
}

/// How an associated device gets access beyond its provisioning policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessGrant {
    /// Add the thing to a group whose policy supersedes the JITP policy.
    ThingGroup(String),
    /// Create and attach a policy scoped to this device and tenant.
    DevicePolicy,
}

/// Inputs of `jitp connect`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSettings {
    #[serde(default = "default_stage")]
    pub stage: String,
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,
    /// Thing name; also the certificate common name.
    pub device_id: String,
    /// Broker / data-plane endpoint (`MQTT_ENDPOINT`).
    #[serde(rename = "mqtt_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_mqtt_port")]
    pub mqtt_port: u16,
    #[serde(default = "default_region")]
    pub region: String,
    /// MQTT client id; defaults to the device id.
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_cert_path")]
    pub device_cert_path: PathBuf,
    #[serde(default = "default_key_path")]
    pub device_key_path: PathBuf,
    #[serde(default = "default_ca_path")]
    pub ca_path: PathBuf,
    /// Escalation group; when unset a per-device policy is created.
    #[serde(default)]
    pub thing_group: Option<String>,
    #[serde(default)]
    pub shadow_seed: ShadowSeed,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

impl DeviceSettings {
    #[must_use]
    pub fn client_id(&self) -> &str {
        self.client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.device_id)
    }

    #[must_use]
    pub fn access_grant(&self) -> AccessGrant {
        match self.thing_group.as_deref() {
            Some(group) if !group.is_empty() => AccessGrant::ThingGroup(group.to_string()),
            _ => AccessGrant::DevicePolicy,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the device id, stage, tenant or endpoint is unusable.
    pub fn validate(&self) -> Result<()> {
        validate_device_id(&self.device_id)?;
        validate_topic_segment("stage", &self.stage)?;
        validate_topic_segment("tenant id", &self.tenant_id)?;
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Environment("MQTT_ENDPOINT is empty".to_string()).into());
        }
        Ok(())
    }
}

// ── Cleanup settings ─────────────────────────────────────────────────────────

/// Inputs of `jitp delete`.
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupSettings {
    pub device_id: String,
    #[serde(default = "default_region")]
    pub region: String,
}

impl CleanupSettings {
    /// # Errors
    ///
    /// Returns an error if the device id is not a valid thing name.
    pub fn validate(&self) -> Result<()> {
        validate_device_id(&self.device_id)
    }
}

fn default_stage() -> String {
    DEFAULT_STAGE.to_string()
}

fn default_tenant_id() -> String {
    DEFAULT_TENANT_ID.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_mqtt_port() -> u16 {
    DEFAULT_MQTT_PORT
}

fn default_cert_path() -> PathBuf {
    PathBuf::from(DEFAULT_CERT_PATH)
}

fn default_key_path() -> PathBuf {
    PathBuf::from(DEFAULT_KEY_PATH)
}

fn default_ca_path() -> PathBuf {
    PathBuf::from(DEFAULT_CA_PATH)
}

fn default_reconnect_delay() -> u64 {
    DEFAULT_RECONNECT_DELAY_SECS
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ── Validators ───────────────────────────────────────────────────────────────

/// # Errors
///
/// Returns an error if `id` is not a valid thing name.
pub fn validate_device_id(id: &str) -> Result<()> {
    if !THING_NAME_RE.is_match(id) {
        return Err(ConfigError::InvalidDeviceId(id.to_string()).into());
    }
    Ok(())
}

/// Stage and tenant ids become topic levels, so they may not contain a level
/// separator or an MQTT wildcard.
///
/// # Errors
///
/// Returns an error if `value` is empty or contains `/`, `+` or `#`.
pub fn validate_topic_segment(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() || value.contains(['/', '+', '#']) {
        return Err(ConfigError::InvalidTopicSegment {
            field,
            value: value.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Parse repeated `KEY=VALUE` flags into a sorted attribute map.
///
/// # Errors
///
/// Returns an error on a pair without `=` or with an empty key.
pub fn parse_attributes(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(ConfigError::InvalidAttribute(pair.clone()).into()),
        })
        .collect()
}

// ── Unit tests ───────────────────────────────────────────────────────────────
