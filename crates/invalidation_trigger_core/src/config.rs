//! Invalidation target resolution.
//!
//! The target is read once per invocation and handed to the handler as a
//! value, so nothing downstream touches the process environment.

pub const DISTRIBUTION_ID_ENV_VAR: &str = "CLOUDFRONT_DIST_ID";
pub const UNSET_SENTINEL: &str = "unset";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationTarget {
    Disabled,
    Distribution(String),
}

impl InvalidationTarget {
    /// Only a missing value or the literal `unset` disables invalidation.
    /// Anything else is passed through untouched so a bad id fails at the
    /// provider instead of silently skipping.
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(id) if id != UNSET_SENTINEL => Self::Distribution(id.to_string()),
            _ => Self::Disabled,
        }
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::from_value(lookup(DISTRIBUTION_ID_ENV_VAR).as_deref())
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn distribution_id(&self) -> Option<&str> {
        match self {
            Self::Disabled => None,
            Self::Distribution(id) => Some(id),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.distribution_id().is_some()
    }
}
