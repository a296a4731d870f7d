//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing or invalid environment: {0}")]
    Environment(String),

    #[error("Invalid device id '{0}': must match ^[a-zA-Z0-9:_-]{{1,128}}$")]
    InvalidDeviceId(String),

    #[error("Invalid {field} '{value}': must be non-empty and free of '/', '+', '#'")]
    InvalidTopicSegment { field: &'static str, value: String },

    #[error("Invalid attribute '{0}': expected KEY=VALUE")]
    InvalidAttribute(String),
}

// ── Control-plane errors ──────────────────────────────────────────────────────

/// Coarse classification of an IoT control-plane failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPlaneErrorKind {
    NotFound,
    AlreadyExists,
    AccessDenied,
    Other,
}

impl ControlPlaneErrorKind {
    /// Classify an AWS error code such as `ResourceNotFoundException`.
    #[must_use]
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("ResourceNotFoundException") => Self::NotFound,
            Some("ResourceAlreadyExistsException") => Self::AlreadyExists,
            Some("UnauthorizedException" | "AccessDeniedException" | "ForbiddenException") => {
                Self::AccessDenied
            }
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for ControlPlaneErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NotFound => "resource not found",
            Self::AlreadyExists => "resource already exists",
            Self::AccessDenied => "access denied",
            Self::Other => "request failed",
        })
    }
}

/// A rejected control-plane or data-plane call.
#[derive(Debug, Error)]
#[error("{operation} failed ({kind}): {detail}")]
pub struct ControlPlaneError {
    pub operation: &'static str,
    pub kind: ControlPlaneErrorKind,
    pub detail: String,
}

// ── Workflow errors ───────────────────────────────────────────────────────────

/// Errors raised by the association workflow itself (not by the API).
#[derive(Debug, Error)]
pub enum AssociationError {
    #[error("Device '{0}' has no attached certificate to grant the policy to.")]
    NoPrincipal(String),
}

/// Errors raised by the cleanup workflow itself (not by the API).
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("Principal '{0}' is not a certificate ARN.")]
    NotACertificate(String),
}
