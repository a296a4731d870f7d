//! Per-device access policy granted on association.
//!
//! Every resource is scoped to the device's own shadow topics and its
//! tenant's message namespace; nothing is wildcarded beyond `<stage>/<tenant>/m/*`.

use jitp_common::policy::{actions, topic_arn, topic_filter_arn};
use jitp_common::topics::tenant_messages_pattern;
use jitp_common::{PolicyDocument, ShadowTopics, Statement};

/// Prefix of generated per-device policy names.
pub const DEVICE_POLICY_PREFIX: &str = "dta-";

#[must_use]
pub fn device_policy_name(unique: &str) -> String {
    format!("{DEVICE_POLICY_PREFIX}{unique}")
}

/// Shadow update, subscribe/receive on own shadow responses and tenant
/// messages, publish on own shadow requests and tenant messages.
#[must_use]
pub fn device_policy(device_id: &str, stage: &str, tenant_id: &str) -> PolicyDocument {
    let shadow = ShadowTopics::for_thing(device_id);
    let tenant = tenant_messages_pattern(stage, tenant_id);

    let inbound = [
        shadow.get_accepted(),
        shadow.update_accepted(),
        shadow.update_delta(),
        tenant.clone(),
    ];
    let outbound = [shadow.get(), shadow.update(), tenant];

    PolicyDocument::new(vec![
        Statement::allow([actions::UPDATE_THING_SHADOW], [topic_arn(&shadow.update())]),
        Statement::allow(
            [actions::SUBSCRIBE],
            inbound.iter().map(|t| topic_filter_arn(t)),
        ),
        Statement::allow([actions::PUBLISH], outbound.iter().map(|t| topic_arn(t))),
        Statement::allow([actions::RECEIVE], inbound.iter().map(|t| topic_arn(t))),
    ])
}
