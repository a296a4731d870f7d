//! IoT access-policy documents and resource ARN helpers.

use serde::{Deserialize, Serialize};

use crate::template::DocumentError;

/// Policy language version accepted by AWS IoT.
pub const POLICY_VERSION: &str = "2012-10-17";

/// IoT policy actions used by the JITP tooling.
pub mod actions {
    pub const CONNECT: &str = "iot:Connect";
    pub const PUBLISH: &str = "iot:Publish";
    pub const SUBSCRIBE: &str = "iot:Subscribe";
    pub const RECEIVE: &str = "iot:Receive";
    pub const UPDATE_THING_SHADOW: &str = "iot:UpdateThingShadow";
}

/// `arn:aws:iot:*:*:topic/<topic>`: target of publish/receive/shadow actions.
#[must_use]
pub fn topic_arn(topic: &str) -> String {
    format!("arn:aws:iot:*:*:topic/{topic}")
}

/// `arn:aws:iot:*:*:topicfilter/<filter>`: target of subscribe actions.
#[must_use]
pub fn topic_filter_arn(filter: &str) -> String {
    format!("arn:aws:iot:*:*:topicfilter/{filter}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,
    pub action: Vec<String>,
    pub resource: Vec<String>,
}

impl Statement {
    /// An `Allow` statement over the given actions and resources.
    pub fn allow<A, R>(actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            effect: Effect::Allow,
            action: actions.into_iter().map(Into::into).collect(),
            resource: resources.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    #[must_use]
    pub fn new(statement: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }

    /// Compact JSON, as `CreatePolicy` and inline template policies expect.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string(self).map_err(|source| DocumentError::Serialize {
            what: "policy document",
            source,
        })
    }

    /// Whether an `Allow` statement names exactly this action and resource
    /// (or the `*` resource). Patterns other than a bare `*` are compared
    /// literally.
    #[must_use]
    pub fn allows(&self, action: &str, resource: &str) -> bool {
        self.statement.iter().any(|s| {
            s.effect == Effect::Allow
                && s.action.iter().any(|a| a == action)
                && s.resource.iter().any(|r| r == "*" || r == resource)
        })
    }

    /// Every resource named by any statement.
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.statement
            .iter()
            .flat_map(|s| s.resource.iter().map(String::as_str))
    }
}
