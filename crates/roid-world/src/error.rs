//! World configuration errors.

use thiserror::Error;

/// A configuration that cannot describe any world.
///
/// Everything else the generator meets at runtime degrades instead of failing;
/// this is raised only for structurally broken input.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed world configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("world configuration must be a JSON object")]
    NotAnObject,

    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field, when the error is about one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field } | Self::InvalidField { field, .. } => Some(field),
            Self::Json(_) | Self::NotAnObject => None,
        }
    }
}
