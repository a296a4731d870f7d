//! Thing records as seen by the association and cleanup workflows.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::domain::error::CleanupError;

/// Thing attribute whose presence marks a device as associated.
pub const TENANT_ATTRIBUTE: &str = "tenantId";

/// Subset of `DescribeThing` the workflows care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThingDescription {
    pub thing_name: String,
    pub attributes: BTreeMap<String, String>,
}

impl ThingDescription {
    /// Tenant the device is already associated with, if any.
    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        self.attributes
            .get(TENANT_ATTRIBUTE)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }
}

/// Certificate id of a principal ARN: `arn:aws:iot:<region>:<acct>:cert/<id>`.
///
/// # Errors
///
/// Returns an error if the ARN does not name a certificate.
pub fn certificate_id(principal: &str) -> Result<&str> {
    match principal.split_once(":cert/") {
        Some((_, id)) if !id.is_empty() && !id.contains('/') => Ok(id),
        _ => Err(CleanupError::NotACertificate(principal.to_string()).into()),
    }
}
