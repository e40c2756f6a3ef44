//! Error types for value parsing.

use thiserror::Error;

/// Result type for parsing animatable values.
pub type Result<T> = std::result::Result<T, ValueError>;

/// Errors raised while turning CSS-like text into animatable values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    /// The property name is not animatable.
    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    /// The text does not parse as the expected kind of value.
    #[error("'{value}' is not a valid {expected}")]
    Invalid {
        value: String,
        expected: &'static str,
    },

    /// The transform function name is not supported.
    #[error("unknown transform function '{0}'")]
    UnknownTransform(String),

    /// A transform function got the wrong number of arguments.
    #[error("{function}() takes {expected} argument(s), got {found}")]
    TransformArity {
        function: &'static str,
        expected: &'static str,
        found: usize,
    },

    /// The timing function is not recognized.
    #[error("'{0}' is not a valid easing function")]
    Easing(String),
}

impl ValueError {
    pub(crate) fn invalid(value: impl Into<String>, expected: &'static str) -> Self {
        Self::Invalid {
            value: value.into(),
            expected,
        }
    }
}
