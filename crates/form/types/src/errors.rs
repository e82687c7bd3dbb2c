//! Error types for the form layer

use crate::ControlId;

/// Errors raised while building or mutating a control tree.
///
/// Validation failures are never reported through this type: they are data
/// published on a control's error stream.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Group config has no fields: {0}")]
    MissingFields(ControlId),

    #[error("Array item template does not resolve to a group: {0}")]
    InvalidArrayTemplate(ControlId),

    #[error("Control inside a group requires a name: {0}")]
    UnnamedControl(ControlId),

    #[error("Duplicate control key '{key}' in {id}")]
    DuplicateKey { id: ControlId, key: String },

    #[error("Unexpected value shape at {id}: expected {expected}")]
    ValueShape { id: ControlId, expected: &'static str },

    #[error("Control holds no value: {0}")]
    NoValue(ControlId),

    #[error("Index {index} out of bounds for {id} (len {len})")]
    IndexOutOfBounds {
        id: ControlId,
        index: usize,
        len: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for form operations
pub type FormResult<T> = Result<T, FormError>;
