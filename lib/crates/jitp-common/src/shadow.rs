//! Device shadow documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::template::DocumentError;

/// `{"state": {"reported": ..., "desired": ...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowDocument {
    pub state: ShadowState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired: Option<Value>,
}

impl ShadowDocument {
    /// A document that only touches the `reported` branch.
    #[must_use]
    pub fn reported(value: Value) -> Self {
        Self {
            state: ShadowState {
                reported: Some(value),
                desired: None,
            },
        }
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, DocumentError> {
        serde_json::to_vec(self).map_err(|source| DocumentError::Serialize {
            what: "shadow document",
            source,
        })
    }
}
