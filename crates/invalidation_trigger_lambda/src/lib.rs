//! AWS-oriented adapters and handlers for deployment-triggered cache invalidation.
//!
//! This crate owns runtime integration details (SNS envelope decoding, the
//! CloudFront adapter and logging bootstrap). Status decoding and the trigger
//! condition come from `invalidation_trigger_core`.

pub mod adapters;
pub mod handlers;
pub mod logging;
