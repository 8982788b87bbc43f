//! Engine error types.
//!
//! Two failure modes only: bad caller input, and a defective scenario table.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VvaError {
    /// A required input is missing, non-finite, or fails its positivity precondition.
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The scenario catalog (or other engine configuration) is incomplete or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl VvaError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        VvaError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        VvaError::Configuration(reason.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, VvaError::InvalidInput { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, VvaError::Configuration(_))
    }
}

/// Result alias for engine operations.
pub type VvaResult<T> = Result<T, VvaError>;
