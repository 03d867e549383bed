use chrono::Utc;
use invalidation_trigger_core::config::InvalidationTarget;
use invalidation_trigger_core::trigger::InvalidationRequest;
use invalidation_trigger_lambda::adapters::invalidator::{CacheInvalidator, CloudFrontInvalidator};
use invalidation_trigger_lambda::handlers::notification::{
    decode_sns_records, handle_notification_records,
};
use invalidation_trigger_lambda::logging::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct NoopInvalidator;

impl CacheInvalidator for NoopInvalidator {
    fn create_invalidation(&self, _request: &InvalidationRequest) -> Result<(), String> {
        Ok(())
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let target = InvalidationTarget::from_env();
    let records = decode_sns_records(&event.payload).map_err(Error::from)?;

    let cloudfront = match target.distribution_id() {
        Some(_) => {
            let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            Some(CloudFrontInvalidator::from_sdk_config(&aws_config))
        }
        None => None,
    };
    let noop_invalidator = NoopInvalidator;
    let invalidator = cloudfront
        .as_ref()
        .map(|value| value as &dyn CacheInvalidator)
        .unwrap_or(&noop_invalidator);

    let span = tracing::info_span!("invocation", request_id = %event.context.request_id);
    let summary = span
        .in_scope(|| handle_notification_records(&records, &target, invalidator, &Utc::now))
        .map_err(Error::from)?;

    serde_json::to_value(summary)
        .map_err(|error| Error::from(format!("failed to serialize batch summary: {error}")))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();
    lambda_runtime::run(service_fn(handle_request)).await
}
