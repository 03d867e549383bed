use chrono::{DateTime, Utc};
use invalidation_trigger_core::config::InvalidationTarget;
use invalidation_trigger_core::error::{InvalidationError, TriggerError};
use invalidation_trigger_core::event::decode_status_event;
use invalidation_trigger_core::trigger::{plan_invalidation, status_comparison_key};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::invalidator::CacheInvalidator;

const COMPONENT: &str = "notification_handler";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationRecord {
    pub event_source: String,
    pub timestamp: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchSummary {
    pub records_processed: usize,
    pub invalidations_requested: usize,
}

/// Extracts the message text of every record in an SNS event. A missing or
/// `null` `Records` field is an empty batch.
pub fn decode_sns_records(event: &Value) -> Result<Vec<NotificationRecord>, String> {
    let records = match event.get("Records") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(value) => value
            .as_array()
            .ok_or_else(|| "SNS event Records must be an array".to_string())?,
    };

    let mut decoded = Vec::with_capacity(records.len());
    for record in records {
        let sns = record
            .get("Sns")
            .ok_or_else(|| "SNS record must include Sns object".to_string())?;
        let message = sns
            .get("Message")
            .and_then(Value::as_str)
            .ok_or_else(|| "SNS record Message must be a string".to_string())?;

        decoded.push(NotificationRecord {
            event_source: string_field(record, "EventSource"),
            timestamp: string_field(sns, "Timestamp"),
            message: message.to_string(),
        });
    }

    Ok(decoded)
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Processes records in delivery order. The first decode or invalidation
/// failure stops the batch; later records are not examined.
pub fn handle_notification_records(
    records: &[NotificationRecord],
    target: &InvalidationTarget,
    invalidator: &dyn CacheInvalidator,
    clock: &dyn Fn() -> DateTime<Utc>,
) -> Result<BatchSummary, TriggerError> {
    if !target.is_enabled() {
        tracing::info!(
            component = COMPONENT,
            event = "invalidation_disabled",
            records = records.len(),
        );
    }

    let mut summary = BatchSummary::default();
    for (record_index, record) in records.iter().enumerate() {
        tracing::info!(
            component = COMPONENT,
            event = "record_received",
            record_index,
            event_source = %record.event_source,
            timestamp = %record.timestamp,
            message = %record.message,
        );

        let status_event = decode_status_event(&record.message).map_err(|source| {
            tracing::error!(
                component = COMPONENT,
                event = "record_decode_failed",
                record_index,
                error = %source,
            );
            TriggerError::Decode {
                record_index,
                source,
            }
        })?;
        summary.records_processed += 1;

        let status = status_event.canonical_status();
        let Some(request) = plan_invalidation(status, target, clock()) else {
            tracing::debug!(
                component = COMPONENT,
                event = "invalidation_skipped",
                record_index,
                status,
                comparison_key = %status_comparison_key(status),
            );
            continue;
        };

        invalidator.create_invalidation(&request).map_err(|message| {
            tracing::error!(
                component = COMPONENT,
                event = "invalidation_failed",
                record_index,
                distribution_id = %request.distribution_id,
                error = %message,
            );
            TriggerError::Invalidation {
                record_index,
                source: InvalidationError {
                    distribution_id: request.distribution_id.clone(),
                    message,
                },
            }
        })?;
        summary.invalidations_requested += 1;

        tracing::info!(
            component = COMPONENT,
            event = "invalidation_requested",
            record_index,
            status,
            distribution_id = %request.distribution_id,
            caller_reference = %request.caller_reference,
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;
    use invalidation_trigger_core::trigger::InvalidationRequest;
    use serde_json::json;

    use super::*;

    struct CapturingInvalidator {
        requests: Mutex<Vec<InvalidationRequest>>,
    }

    impl CapturingInvalidator {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<InvalidationRequest> {
            self.requests.lock().expect("poisoned mutex").clone()
        }
    }

    impl CacheInvalidator for CapturingInvalidator {
        fn create_invalidation(&self, request: &InvalidationRequest) -> Result<(), String> {
            self.requests
                .lock()
                .expect("poisoned mutex")
                .push(request.clone());
            Ok(())
        }
    }

    struct FailingInvalidator {
        attempts: Mutex<usize>,
    }

    impl CacheInvalidator for FailingInvalidator {
        fn create_invalidation(&self, _request: &InvalidationRequest) -> Result<(), String> {
            *self.attempts.lock().expect("poisoned mutex") += 1;
            Err("AccessDenied".to_string())
        }
    }

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
            .single()
            .expect("valid timestamp")
    }

    fn record(message: &str) -> NotificationRecord {
        NotificationRecord {
            event_source: "aws:sns".to_string(),
            timestamp: "2026-03-14T09:26:53.000Z".to_string(),
            message: message.to_string(),
        }
    }

    fn configured() -> InvalidationTarget {
        InvalidationTarget::Distribution("E123".to_string())
    }

    #[test]
    fn succeeded_status_issues_one_full_invalidation() {
        let invalidator = CapturingInvalidator::new();
        let summary = handle_notification_records(
            &[record(r#"{"status":"SUCCEEDED"}"#)],
            &configured(),
            &invalidator,
            &fixed_clock,
        )
        .expect("batch should succeed");

        let requests = invalidator.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].distribution_id, "E123");
        assert_eq!(requests[0].paths, vec!["/*".to_string()]);
        assert_eq!(
            summary,
            BatchSummary {
                records_processed: 1,
                invalidations_requested: 1,
            }
        );
    }

    #[test]
    fn steady_state_instance_status_does_not_invalidate() {
        let invalidator = CapturingInvalidator::new();
        let summary = handle_notification_records(
            &[record(r#"{"instanceStatus":"STEADY_STATE"}"#)],
            &configured(),
            &invalidator,
            &fixed_clock,
        )
        .expect("batch should succeed");

        assert!(invalidator.requests().is_empty());
        assert_eq!(summary.records_processed, 1);
        assert_eq!(summary.invalidations_requested, 0);
    }

    #[test]
    fn disabled_target_never_invalidates() {
        let invalidator = CapturingInvalidator::new();
        handle_notification_records(
            &[
                record(r#"{"status":"SUCCEEDED"}"#),
                record(r#"{"instanceStatus":"succeed_ed"}"#),
            ],
            &InvalidationTarget::Disabled,
            &invalidator,
            &fixed_clock,
        )
        .expect("batch should succeed");

        assert!(invalidator.requests().is_empty());
    }

    #[test]
    fn each_succeeded_record_invalidates_in_order() {
        let invalidator = CapturingInvalidator::new();
        let summary = handle_notification_records(
            &[
                record(r#"{"status":"succeeded"}"#),
                record(r#"{"status":"FAILED"}"#),
                record(r#"{"status":"","instanceStatus":"SUCCEED_ED"}"#),
            ],
            &configured(),
            &invalidator,
            &fixed_clock,
        )
        .expect("batch should succeed");

        assert_eq!(invalidator.requests().len(), 2);
        assert_eq!(summary.records_processed, 3);
        assert_eq!(summary.invalidations_requested, 2);
    }

    #[test]
    fn malformed_record_aborts_remaining_batch() {
        let invalidator = CapturingInvalidator::new();
        let error = handle_notification_records(
            &[
                record(r#"{"status":"SUCCEEDED"}"#),
                record("not json"),
                record(r#"{"status":"SUCCEEDED"}"#),
            ],
            &configured(),
            &invalidator,
            &fixed_clock,
        )
        .expect_err("malformed record should fail the batch");

        assert!(matches!(error, TriggerError::Decode { record_index: 1, .. }));
        assert_eq!(invalidator.requests().len(), 1);
    }

    #[test]
    fn malformed_record_fails_even_when_disabled() {
        let invalidator = CapturingInvalidator::new();
        let error = handle_notification_records(
            &[record("[]")],
            &InvalidationTarget::Disabled,
            &invalidator,
            &fixed_clock,
        )
        .expect_err("malformed record should fail the batch");

        assert_eq!(error.record_index(), 0);
        assert!(invalidator.requests().is_empty());
    }

    #[test]
    fn invalidation_failure_aborts_remaining_batch() {
        let invalidator = FailingInvalidator {
            attempts: Mutex::new(0),
        };
        let error = handle_notification_records(
            &[
                record(r#"{"status":"SUCCEEDED"}"#),
                record(r#"{"status":"SUCCEEDED"}"#),
            ],
            &configured(),
            &invalidator,
            &fixed_clock,
        )
        .expect_err("invalidation failure should fail the batch");

        match error {
            TriggerError::Invalidation {
                record_index,
                source,
            } => {
                assert_eq!(record_index, 0);
                assert_eq!(source.distribution_id, "E123");
                assert_eq!(source.message, "AccessDenied");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*invalidator.attempts.lock().expect("poisoned mutex"), 1);
    }

    #[test]
    fn decodes_sns_envelope() {
        let event = json!({
            "Records": [
                {
                    "EventSource": "aws:sns",
                    "EventVersion": "1.0",
                    "Sns": {
                        "Type": "Notification",
                        "Timestamp": "2026-03-14T09:26:53.000Z",
                        "Message": "{\"status\":\"SUCCEEDED\"}"
                    }
                }
            ]
        });

        let records = decode_sns_records(&event).expect("event should decode");
        assert_eq!(records, vec![record(r#"{"status":"SUCCEEDED"}"#)]);
    }

    #[test]
    fn empty_records_array_is_an_empty_batch() {
        let records = decode_sns_records(&json!({"Records": []})).expect("event should decode");
        assert!(records.is_empty());
    }

    #[test]
    fn missing_or_null_records_is_an_empty_batch() {
        let records = decode_sns_records(&json!({"detail": {}})).expect("event should decode");
        assert!(records.is_empty());

        let records = decode_sns_records(&json!({"Records": null})).expect("event should decode");
        assert!(records.is_empty());
    }

    #[test]
    fn rejects_non_array_records() {
        let error = decode_sns_records(&json!({"Records": {"Sns": {}}})).expect_err("should fail");
        assert!(error.contains("Records must be an array"));
    }

    #[test]
    fn null_message_does_not_abort_batch() {
        let invalidator = CapturingInvalidator::new();
        let summary = handle_notification_records(
            &[
                record("null"),
                record(r#"{"status":"FAILED","Status":"SUCCEEDED"}"#),
                record(r#"{"STATUS":"SUCCEEDED"}"#),
            ],
            &configured(),
            &invalidator,
            &fixed_clock,
        )
        .expect("batch should succeed");

        assert_eq!(summary.records_processed, 3);
        assert_eq!(invalidator.requests().len(), 2);
    }

    #[test]
    fn rejects_non_string_message() {
        let event = json!({
            "Records": [
                {"EventSource": "aws:sns", "Sns": {"Message": {"status": "SUCCEEDED"}}}
            ]
        });

        let error = decode_sns_records(&event).expect_err("should fail");
        assert!(error.contains("Message must be a string"));
    }
}
