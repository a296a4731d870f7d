//! MQTT topic layout for shadows and the tenant message namespace.
//!
//! Shadow topics: `$aws/things/{thing}/shadow/{get,update}[/accepted|/delta]`
//! Tenant topics: `{stage}/{tenant}/m/...`

/// Shadow topic set for one thing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowTopics {
    root: String,
}

impl ShadowTopics {
    #[must_use]
    pub fn for_thing(thing_name: &str) -> Self {
        Self {
            root: format!("$aws/things/{thing_name}/shadow"),
        }
    }

    #[must_use]
    pub fn get(&self) -> String {
        format!("{}/get", self.root)
    }

    #[must_use]
    pub fn get_accepted(&self) -> String {
        format!("{}/get/accepted", self.root)
    }

    #[must_use]
    pub fn update(&self) -> String {
        format!("{}/update", self.root)
    }

    #[must_use]
    pub fn update_accepted(&self) -> String {
        format!("{}/update/accepted", self.root)
    }

    #[must_use]
    pub fn update_delta(&self) -> String {
        format!("{}/update/delta", self.root)
    }
}

/// `{stage}/{tenant}/`: prefix of everything a tenant's devices may use.
#[must_use]
pub fn tenant_prefix(stage: &str, tenant_id: &str) -> String {
    format!("{stage}/{tenant_id}/")
}

/// `{stage}/{tenant}/m`: tenant message namespace.
#[must_use]
pub fn tenant_messages(stage: &str, tenant_id: &str) -> String {
    format!("{stage}/{tenant_id}/m")
}

/// Policy resource pattern covering the tenant message namespace.
#[must_use]
pub fn tenant_messages_pattern(stage: &str, tenant_id: &str) -> String {
    format!("{}/*", tenant_messages(stage, tenant_id))
}

/// Fixed topic the device session greets on.
#[must_use]
pub fn test_topic(stage: &str, tenant_id: &str) -> String {
    format!("{}/test/topic", tenant_messages(stage, tenant_id))
}
