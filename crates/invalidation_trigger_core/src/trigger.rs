use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::InvalidationTarget;

pub const SUCCEEDED_KEY: &str = "SUCCEEDED";
pub const INVALIDATE_ALL_PATHS: &str = "/*";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvalidationRequest {
    pub distribution_id: String,
    pub caller_reference: String,
    pub paths: Vec<String>,
}

/// Upper-cases `status` and strips underscores, so `succeed_ed` and
/// `SUCCEEDED` compare equal.
pub fn status_comparison_key(status: &str) -> String {
    status.to_uppercase().replace('_', "")
}

pub fn is_deployment_succeeded(status: &str) -> bool {
    status_comparison_key(status) == SUCCEEDED_KEY
}

/// Uniqueness token for one invalidation request.
pub fn caller_reference(issued_at: DateTime<Utc>) -> String {
    issued_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Returns the request to issue for a record, or `None` when the target is
/// disabled or the deployment did not succeed.
pub fn plan_invalidation(
    status: &str,
    target: &InvalidationTarget,
    issued_at: DateTime<Utc>,
) -> Option<InvalidationRequest> {
    let distribution_id = target.distribution_id()?;
    if !is_deployment_succeeded(status) {
        return None;
    }

    Some(InvalidationRequest {
        distribution_id: distribution_id.to_string(),
        caller_reference: caller_reference(issued_at),
        paths: vec![INVALIDATE_ALL_PATHS.to_string()],
    })
}
