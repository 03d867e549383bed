use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Status fields of a deployment notification.
///
/// Producers disagree on the key holding the status: some send `status`,
/// others `instanceStatus`, and older ones capitalise both.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        default,
        rename = "instanceStatus",
        skip_serializing_if = "Option::is_none"
    )]
    pub instance_status: Option<String>,
}

impl StatusEvent {
    pub fn new(status: Option<&str>, instance_status: Option<&str>) -> Self {
        Self {
            status: status.map(str::to_string),
            instance_status: instance_status.map(str::to_string),
        }
    }

    /// `status` when non-empty, else `instanceStatus`, else empty.
    pub fn canonical_status(&self) -> &str {
        non_empty(self.status.as_deref())
            .or_else(|| non_empty(self.instance_status.as_deref()))
            .unwrap_or("")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

const STATUS_KEY: &str = "status";
const INSTANCE_STATUS_KEY: &str = "instanceStatus";

/// Decodes a record payload.
///
/// Keys match ASCII case-insensitively and the last non-null occurrence wins.
/// `null` decodes to an empty event; any other non-object payload, or a
/// status value that is neither a string nor `null`, is rejected.
pub fn decode_status_event(payload: &str) -> Result<StatusEvent, DecodeError> {
    let object: Map<String, Value> = match serde_json::from_str(payload)? {
        Value::Null => return Ok(StatusEvent::default()),
        other => serde_json::from_value(other)?,
    };

    let mut event = StatusEvent::default();
    for (key, value) in object {
        let slot = if key.eq_ignore_ascii_case(STATUS_KEY) {
            &mut event.status
        } else if key.eq_ignore_ascii_case(INSTANCE_STATUS_KEY) {
            &mut event.instance_status
        } else {
            continue;
        };

        if let Some(text) = serde_json::from_value::<Option<String>>(value)? {
            *slot = Some(text);
        }
    }

    Ok(event)
}
