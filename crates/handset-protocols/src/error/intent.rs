//! Intent and component-name errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntentError {
    #[error("Intent has no explicit component target")]
    MissingComponent,

    #[error("Invalid component name: {0}")]
    InvalidComponentName(String),

    #[error("Extra {key} has type {actual}, expected {expected}")]
    ExtraTypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },
}
