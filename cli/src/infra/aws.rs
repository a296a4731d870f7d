//! AWS IoT infrastructure: implements the control-plane and shadow ports
//! with `aws-sdk-iot` and `aws-sdk-iotdataplane`.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use aws_sdk_iot::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_iot::types::{AttributePayload, CertificateStatus};
use aws_sdk_iotdataplane::primitives::Blob;
use jitp_common::ShadowDocument;

use crate::application::ports::{CertificateRegistry, PolicyRegistry, ShadowStore, ThingRegistry};
use crate::domain::{ControlPlaneError, ControlPlaneErrorKind, ThingDescription};

/// IoT control-plane and data-plane clients sharing one SDK config.
#[derive(Debug, Clone)]
pub struct AwsIot {
    iot: aws_sdk_iot::Client,
    data: aws_sdk_iotdataplane::Client,
}

impl AwsIot {
    /// Load credentials from the default provider chain for `region`.
    ///
    /// `data_endpoint` is the account's IoT data endpoint (the MQTT broker
    /// host); without it shadow calls go to the regional default endpoint.
    pub async fn connect(region: &str, data_endpoint: Option<&str>) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        let iot = aws_sdk_iot::Client::new(&sdk_config);
        let data = match data_endpoint {
            Some(endpoint) => {
                let conf = aws_sdk_iotdataplane::config::Builder::from(&sdk_config)
                    .endpoint_url(endpoint_url(endpoint))
                    .build();
                aws_sdk_iotdataplane::Client::from_conf(conf)
            }
            None => aws_sdk_iotdataplane::Client::new(&sdk_config),
        };

        tracing::debug!(region, data_endpoint, "AWS IoT clients initialized");
        Self { iot, data }
    }
}

/// `host` → `https://host`; URLs with a scheme pass through.
fn endpoint_url(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

fn rejected<E>(operation: &'static str, err: &E) -> anyhow::Error
where
    E: ProvideErrorMetadata + std::error::Error,
{
    ControlPlaneError {
        operation,
        kind: ControlPlaneErrorKind::from_code(err.code()),
        detail: DisplayErrorContext(err).to_string(),
    }
    .into()
}

impl ThingRegistry for AwsIot {
    async fn describe_thing(&self, thing_name: &str) -> Result<ThingDescription> {
        let out = self
            .iot
            .describe_thing()
            .thing_name(thing_name)
            .send()
            .await
            .map_err(|e| rejected("DescribeThing", &e))?;

        Ok(ThingDescription {
            thing_name: out.thing_name().unwrap_or(thing_name).to_string(),
            attributes: out
                .attributes()
                .map(|attrs| {
                    attrs
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    async fn merge_thing_attributes(
        &self,
        thing_name: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<()> {
        let payload = AttributePayload::builder()
            .set_attributes(Some(
                attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<HashMap<_, _>>(),
            ))
            .merge(true)
            .build();
        self.iot
            .update_thing()
            .thing_name(thing_name)
            .attribute_payload(payload)
            .send()
            .await
            .map_err(|e| rejected("UpdateThing", &e))?;
        Ok(())
    }

    async fn add_thing_to_group(&self, thing_name: &str, group_name: &str) -> Result<()> {
        self.iot
            .add_thing_to_thing_group()
            .thing_name(thing_name)
            .thing_group_name(group_name)
            .send()
            .await
            .map_err(|e| rejected("AddThingToThingGroup", &e))?;
        Ok(())
    }

    async fn list_thing_principals(&self, thing_name: &str) -> Result<Vec<String>> {
        let mut principals = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let out = self
                .iot
                .list_thing_principals()
                .thing_name(thing_name)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| rejected("ListThingPrincipals", &e))?;
            principals.extend(out.principals().iter().cloned());
            match out.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(principals)
    }

    async fn detach_thing_principal(&self, thing_name: &str, principal: &str) -> Result<()> {
        self.iot
            .detach_thing_principal()
            .thing_name(thing_name)
            .principal(principal)
            .send()
            .await
            .map_err(|e| rejected("DetachThingPrincipal", &e))?;
        Ok(())
    }

    async fn delete_thing(&self, thing_name: &str) -> Result<()> {
        self.iot
            .delete_thing()
            .thing_name(thing_name)
            .send()
            .await
            .map_err(|e| rejected("DeleteThing", &e))?;
        Ok(())
    }
}

impl PolicyRegistry for AwsIot {
    async fn create_policy(&self, policy_name: &str, document: &str) -> Result<()> {
        self.iot
            .create_policy()
            .policy_name(policy_name)
            .policy_document(document)
            .send()
            .await
            .map_err(|e| rejected("CreatePolicy", &e))?;
        Ok(())
    }

    async fn attach_policy(&self, policy_name: &str, target: &str) -> Result<()> {
        self.iot
            .attach_policy()
            .policy_name(policy_name)
            .target(target)
            .send()
            .await
            .map_err(|e| rejected("AttachPolicy", &e))?;
        Ok(())
    }

    async fn list_attached_policies(&self, target: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let out = self
                .iot
                .list_attached_policies()
                .target(target)
                .recursive(false)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| rejected("ListAttachedPolicies", &e))?;
            names.extend(
                out.policies()
                    .iter()
                    .filter_map(|p| p.policy_name())
                    .map(str::to_string),
            );
            match out.next_marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(names)
    }

    async fn detach_policy(&self, policy_name: &str, target: &str) -> Result<()> {
        self.iot
            .detach_policy()
            .policy_name(policy_name)
            .target(target)
            .send()
            .await
            .map_err(|e| rejected("DetachPolicy", &e))?;
        Ok(())
    }
}

impl CertificateRegistry for AwsIot {
    async fn deactivate_certificate(&self, certificate_id: &str) -> Result<()> {
        self.iot
            .update_certificate()
            .certificate_id(certificate_id)
            .new_status(CertificateStatus::Inactive)
            .send()
            .await
            .map_err(|e| rejected("UpdateCertificate", &e))?;
        Ok(())
    }

    async fn delete_certificate(&self, certificate_id: &str) -> Result<()> {
        self.iot
            .delete_certificate()
            .certificate_id(certificate_id)
            .send()
            .await
            .map_err(|e| rejected("DeleteCertificate", &e))?;
        Ok(())
    }
}

impl ShadowStore for AwsIot {
    async fn update_shadow(&self, thing_name: &str, document: &ShadowDocument) -> Result<()> {
        let payload = document.to_vec().context("encoding shadow document")?;
        self.data
            .update_thing_shadow()
            .thing_name(thing_name)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| rejected("UpdateThingShadow", &e))?;
        Ok(())
    }
}
