//! Deployment-status trigger primitives.
//!
//! This crate owns status decoding, the success condition and invalidation
//! planning. It intentionally excludes AWS SDK and Lambda runtime concerns.
//! Adapters and the Lambda entrypoint live in `invalidation_trigger_lambda`.

pub mod config;
pub mod error;
pub mod event;
pub mod trigger;
