use thiserror::Error;

/// The record payload is not a well-formed status object.
#[derive(Debug, Error)]
#[error("malformed status payload: {source}")]
pub struct DecodeError {
    #[from]
    source: serde_json::Error,
}

/// The cache provider rejected or failed an invalidation request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cache invalidation for distribution {distribution_id} failed: {message}")]
pub struct InvalidationError {
    pub distribution_id: String,
    pub message: String,
}

/// Fatal failure of a notification batch. Processing stops at `record_index`.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("record {record_index}: {source}")]
    Decode {
        record_index: usize,
        #[source]
        source: DecodeError,
    },
    #[error("record {record_index}: {source}")]
    Invalidation {
        record_index: usize,
        #[source]
        source: InvalidationError,
    },
}

impl TriggerError {
    pub fn record_index(&self) -> usize {
        match self {
            Self::Decode { record_index, .. } | Self::Invalidation { record_index, .. } => {
                *record_index
            }
        }
    }
}
