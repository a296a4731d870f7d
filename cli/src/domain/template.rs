//! Provisioning-template builder.
//!
//! Pure transform from a handful of named inputs to the document registered
//! with the fleet-provisioning service. No I/O.

use std::collections::BTreeMap;

use jitp_common::policy::actions;
use jitp_common::template::{params, resource_names};
use jitp_common::{
    CertificateProperties, CertificateStatus, DocumentError, Parameter, PolicyDocument,
    PolicyProperties, ProvisioningTemplate, Resource, Statement, TemplateBody, TemplateValue,
    ThingProperties,
};

use crate::domain::config::TemplateSettings;

/// Attribute key carrying the deployment stage.
pub const STAGE_ATTRIBUTE: &str = "stage";
/// Attribute key carrying the thing type, when one is configured.
pub const THING_TYPE_ATTRIBUTE: &str = "thingType";

/// What the template's `policy` resource looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyMode {
    /// Reference an existing policy by name.
    Named(String),
    /// Inline the default connect policy.
    Inline,
    /// No policy resource.
    Omitted,
}

/// Everything the builder needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInput {
    pub role_arn: String,
    pub stage: String,
    pub thing_type: Option<String>,
    pub thing_group: Option<String>,
    pub policy: PolicyMode,
    /// Extra static attributes; `stage` and `thingType` take precedence.
    pub attributes: BTreeMap<String, String>,
}

impl TemplateInput {
    /// Minimal input: inline policy, OU-derived group, no type.
    #[must_use]
    pub fn new(role_arn: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            role_arn: role_arn.into(),
            stage: stage.into(),
            thing_type: None,
            thing_group: None,
            policy: PolicyMode::Inline,
            attributes: BTreeMap::new(),
        }
    }

    /// Derive the input from environment settings and command flags.
    ///
    /// A configured policy name always wins; otherwise the inline policy is
    /// used unless `include_policy` is false.
    #[must_use]
    pub fn from_settings(
        settings: &TemplateSettings,
        attributes: BTreeMap<String, String>,
        include_policy: bool,
    ) -> Self {
        let policy = match (&settings.policy_name, include_policy) {
            (Some(name), _) => PolicyMode::Named(name.clone()),
            (None, true) => PolicyMode::Inline,
            (None, false) => PolicyMode::Omitted,
        };
        Self {
            role_arn: settings.role_arn.clone(),
            stage: settings.stage.clone(),
            thing_type: settings.thing_type.clone(),
            thing_group: settings.thing_group.clone(),
            policy,
            attributes,
        }
    }
}

/// Policy granted at provisioning time when none is named: connect, publish,
/// subscribe and receive on every resource.
#[must_use]
pub fn connect_policy() -> PolicyDocument {
    PolicyDocument::new(vec![Statement::allow(
        [
            actions::CONNECT,
            actions::PUBLISH,
            actions::SUBSCRIBE,
            actions::RECEIVE,
        ],
        ["*"],
    )])
}

/// Build the template body.
///
/// # Errors
///
/// Returns an error only if the inline policy cannot be serialized.
pub fn build_body(input: &TemplateInput) -> Result<TemplateBody, DocumentError> {
    let parameters = params::ALL
        .iter()
        .map(|name| ((*name).to_string(), Parameter::string()))
        .collect();

    let mut resources = BTreeMap::new();
    resources.insert(resource_names::THING.to_string(), thing_resource(input));
    resources.insert(
        resource_names::CERTIFICATE.to_string(),
        Resource::Certificate(CertificateProperties {
            certificate_id: TemplateValue::reference(params::CERTIFICATE_ID),
            status: CertificateStatus::Active,
        }),
    );
    if let Some(policy) = policy_resource(&input.policy)? {
        resources.insert(resource_names::POLICY.to_string(), policy);
    }

    Ok(TemplateBody {
        parameters,
        resources,
    })
}

/// Build the full registered document.
///
/// # Errors
///
/// Returns an error only if serialization fails.
pub fn build_template(input: &TemplateInput) -> Result<ProvisioningTemplate, DocumentError> {
    ProvisioningTemplate::new(&build_body(input)?, input.role_arn.clone())
}

fn thing_resource(input: &TemplateInput) -> Resource {
    let mut attribute_payload = input.attributes.clone();
    attribute_payload.insert(STAGE_ATTRIBUTE.to_string(), input.stage.clone());
    if let Some(thing_type) = &input.thing_type {
        attribute_payload.insert(THING_TYPE_ATTRIBUTE.to_string(), thing_type.clone());
    }

    let thing_groups = vec![match &input.thing_group {
        Some(group) => TemplateValue::literal(group.clone()),
        None => TemplateValue::reference(params::ORGANIZATIONAL_UNIT),
    }];

    Resource::Thing(ThingProperties {
        thing_name: TemplateValue::reference(params::COMMON_NAME),
        thing_type_name: input.thing_type.clone().map(TemplateValue::literal),
        attribute_payload,
        thing_groups,
    })
}

fn policy_resource(mode: &PolicyMode) -> Result<Option<Resource>, DocumentError> {
    let props = match mode {
        PolicyMode::Omitted => return Ok(None),
        PolicyMode::Named(name) => PolicyProperties {
            policy_name: Some(name.clone()),
            policy_document: None,
        },
        PolicyMode::Inline => PolicyProperties {
            policy_name: None,
            policy_document: Some(connect_policy().to_json()?),
        },
    };
    Ok(Some(Resource::Policy(props)))
}
