//! Lifecycle state machine errors.

use thiserror::Error;

use crate::lifecycle::{LifecycleEvent, LifecycleState};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Invalid lifecycle transition: {event:?} from {from:?}")]
    InvalidTransition {
        from: LifecycleState,
        event: LifecycleEvent,
    },

    #[error("Activity is destroyed")]
    Destroyed,
}
