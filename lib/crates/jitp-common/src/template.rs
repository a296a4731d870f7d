//! Fleet-provisioning template document.
//!
//! The provisioning service expects the template body as a JSON *string*
//! nested inside an outer object next to the execution role ARN:
//!
//! ```json
//! { "templateBody": "{\"Parameters\":{...},\"Resources\":{...}}", "roleArn": "arn:..." }
//! ```
//!
//! Maps are `BTreeMap`s so serialization order is stable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Certificate fields the provisioning service resolves at first connect.
pub mod params {
    pub const DN_QUALIFIER: &str = "AWS::IoT::Certificate::DistinguishedNameQualifier";
    pub const ORGANIZATIONAL_UNIT: &str = "AWS::IoT::Certificate::OrganizationalUnit";
    pub const COMMON_NAME: &str = "AWS::IoT::Certificate::CommonName";
    pub const CERTIFICATE_ID: &str = "AWS::IoT::Certificate::Id";

    /// Every parameter a JITP template declares.
    pub const ALL: [&str; 4] = [DN_QUALIFIER, ORGANIZATIONAL_UNIT, COMMON_NAME, CERTIFICATE_ID];
}

/// Logical resource names inside `Resources`.
pub mod resource_names {
    pub const THING: &str = "thing";
    pub const CERTIFICATE: &str = "certificate";
    pub const POLICY: &str = "policy";
}

/// Errors raised while encoding or decoding template documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot serialize {what}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot parse {what}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Outer document registered with the provisioning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningTemplate {
    /// Stringified [`TemplateBody`].
    #[serde(rename = "templateBody")]
    pub template_body: String,
    /// Role the provisioning service assumes to create resources.
    #[serde(rename = "roleArn")]
    pub role_arn: String,
}

impl ProvisioningTemplate {
    /// Wrap a body and role ARN into the registered document shape.
    pub fn new(body: &TemplateBody, role_arn: impl Into<String>) -> Result<Self, DocumentError> {
        let template_body =
            serde_json::to_string(body).map_err(|source| DocumentError::Serialize {
                what: "template body",
                source,
            })?;
        Ok(Self {
            template_body,
            role_arn: role_arn.into(),
        })
    }

    /// Decode the nested template body.
    pub fn body(&self) -> Result<TemplateBody, DocumentError> {
        serde_json::from_str(&self.template_body).map_err(|source| DocumentError::Parse {
            what: "template body",
            source,
        })
    }

    /// Compact JSON encoding of the whole document.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string(self).map_err(|source| DocumentError::Serialize {
            what: "provisioning template",
            source,
        })
    }

    /// Decode a document previously produced by [`ProvisioningTemplate::to_json`].
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json).map_err(|source| DocumentError::Parse {
            what: "provisioning template",
            source,
        })
    }
}

/// `Parameters` + `Resources` of a provisioning template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateBody {
    pub parameters: BTreeMap<String, Parameter>,
    pub resources: BTreeMap<String, Resource>,
}

/// A declared template parameter. Only string parameters are used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub kind: String,
}

impl Parameter {
    #[must_use]
    pub fn string() -> Self {
        Self {
            kind: "String".to_string(),
        }
    }
}

/// A property value: either a `{"Ref": "<parameter>"}` or a literal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    Ref {
        #[serde(rename = "Ref")]
        parameter: String,
    },
    Literal(String),
}

impl TemplateValue {
    /// Reference to a declared parameter.
    #[must_use]
    pub fn reference(parameter: &str) -> Self {
        Self::Ref {
            parameter: parameter.to_string(),
        }
    }

    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }
}

/// A declared resource, encoded as `{"Type": ..., "Properties": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type", content = "Properties")]
pub enum Resource {
    #[serde(rename = "AWS::IoT::Thing")]
    Thing(ThingProperties),
    #[serde(rename = "AWS::IoT::Certificate")]
    Certificate(CertificateProperties),
    #[serde(rename = "AWS::IoT::Policy")]
    Policy(PolicyProperties),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ThingProperties {
    pub thing_name: TemplateValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thing_type_name: Option<TemplateValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attribute_payload: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thing_groups: Vec<TemplateValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateProperties {
    pub certificate_id: TemplateValue,
    pub status: CertificateStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Active,
    Inactive,
}

/// Either a reference to an existing policy or an inline, stringified document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_document: Option<String>,
}
