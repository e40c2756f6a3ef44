//! Error types for chain construction.

use thiserror::Error;

/// Result type for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors raised synchronously while selecting targets or calling setters.
///
/// Execution never fails: anomalies at run time are logged and the affected
/// target's completion is resolved.
#[derive(Error, Debug)]
pub enum ChainError {
    /// The selector matched no target.
    #[error("'{selector}' selector is not valid or the element does not exist")]
    Selector { selector: String },

    /// The target specification has no usable shape.
    #[error("{0}")]
    TypeMismatch(String),

    /// A setter was called with arguments that do not fit its signature.
    #[error("{setter}(): {reason}")]
    TypeValidation { setter: String, reason: String },

    /// No action, option or plugin has this name.
    #[error("unknown setter '{0}'")]
    UnknownSetter(String),

    /// Error returned by a plugin, passed through unchanged.
    #[error(transparent)]
    Plugin(anyhow::Error),
}

impl ChainError {
    pub(crate) fn validation(setter: &str, reason: impl std::fmt::Display) -> Self {
        Self::TypeValidation {
            setter: setter.to_string(),
            reason: reason.to_string(),
        }
    }
}
