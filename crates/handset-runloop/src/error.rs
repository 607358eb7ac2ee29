//! Error types for the RunLoop module.

use thiserror::Error;

/// Errors that can occur when preparing or driving a looper.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LooperError {
    /// The calling thread already has a looper.
    #[error("Looper already prepared on thread {0}")]
    AlreadyPrepared(String),

    /// No looper has been prepared.
    #[error("Looper not prepared")]
    NotPrepared,

    /// A run step was attempted off the looper's bound thread.
    #[error("Looper {looper} can only be driven from its own thread")]
    WrongThread { looper: String },

    /// The looper has quit and no longer accepts tasks.
    #[error("Looper {0} is quitting")]
    Quitting(String),
}

/// Result type for RunLoop operations.
pub type LooperResult<T> = Result<T, LooperError>;
