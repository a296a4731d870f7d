//! Domain layer: pure provisioning logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod device;
pub mod error;
pub mod policy;
pub mod session;
pub mod template;

pub use config::{
    AccessGrant, CleanupSettings, DeviceSettings, ShadowSeed, TemplateSettings,
    validate_device_id, validate_topic_segment,
};
pub use device::{TENANT_ATTRIBUTE, ThingDescription, certificate_id};
pub use error::{
    AssociationError, CleanupError, ConfigError, ControlPlaneError, ControlPlaneErrorKind,
};
pub use session::{DeviceEvent, SessionState};
pub use template::{PolicyMode, TemplateInput, build_template};
