//! Error types for system services.

use handset_protocols::{ComponentName, IntentError};
use handset_runloop::LooperError;
use thiserror::Error;

use crate::system::BootPhase;

/// Activity manager errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActivityError {
    #[error("No home activity is registered")]
    NoHomeActivity,

    #[error("Failed to launch {0}")]
    LaunchFailed(ComponentName),
}

/// Service construction errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Service {name} failed to start: {reason}")]
    StartFailed { name: String, reason: String },
}

impl ServiceError {
    pub fn start_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ServiceError::StartFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced through a [`Context`](crate::Context).
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Invalid component: {0}")]
    InvalidComponent(#[from] IntentError),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(ComponentName),

    #[error("Main looper error: {0}")]
    Looper(#[from] LooperError),
}

/// Failure inside one boot phase.
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error(transparent)]
    Activity(#[from] ActivityError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Looper(#[from] LooperError),

    #[error("Phase panicked: {0}")]
    Panicked(String),
}

/// Supervisor errors.
#[derive(Debug, Error)]
pub enum SystemServerError {
    #[error("System server already started")]
    AlreadyStarted,

    #[error("Startup failed in {phase} phase: {source}")]
    StartupFailed {
        phase: BootPhase,
        #[source]
        source: PhaseError,
    },

    #[error("Main looper unavailable: {0}")]
    MainLooper(#[from] LooperError),

    #[error("Failed to spawn system server thread: {0}")]
    Spawn(String),

    #[error("System server thread terminated abnormally")]
    WorkerLost,
}
