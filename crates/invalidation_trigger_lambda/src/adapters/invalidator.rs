use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use invalidation_trigger_core::trigger::InvalidationRequest;

pub trait CacheInvalidator {
    fn create_invalidation(&self, request: &InvalidationRequest) -> Result<(), String>;
}

pub struct CloudFrontInvalidator {
    client: aws_sdk_cloudfront::Client,
}

impl CloudFrontInvalidator {
    pub fn new(client: aws_sdk_cloudfront::Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_cloudfront::Client::new(config))
    }
}

impl CacheInvalidator for CloudFrontInvalidator {
    fn create_invalidation(&self, request: &InvalidationRequest) -> Result<(), String> {
        let batch = build_invalidation_batch(request)?;
        let distribution_id = request.distribution_id.clone();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .create_invalidation()
                    .distribution_id(distribution_id)
                    .invalidation_batch(batch)
                    .send()
                    .await
                    .map(|output| {
                        tracing::debug!(
                            component = "cloudfront_invalidator",
                            event = "invalidation_created",
                            location = output.location().unwrap_or_default(),
                        );
                    })
                    .map_err(|error| format!("failed to create cloudfront invalidation: {error}"))
            })
        })
    }
}

pub fn build_invalidation_batch(
    request: &InvalidationRequest,
) -> Result<InvalidationBatch, String> {
    let quantity = i32::try_from(request.paths.len())
        .map_err(|_| format!("too many invalidation paths: {}", request.paths.len()))?;
    let paths = Paths::builder()
        .quantity(quantity)
        .set_items(Some(request.paths.clone()))
        .build()
        .map_err(|error| format!("invalid invalidation paths: {error}"))?;

    InvalidationBatch::builder()
        .paths(paths)
        .caller_reference(request.caller_reference.clone())
        .build()
        .map_err(|error| format!("invalid invalidation batch: {error}"))
}
