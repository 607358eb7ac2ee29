//! Activity lifecycle state machine.
//!
//! ```text
//!  Initializing ─Create─▶ Created ─Start─▶ Started ─Resume─▶ Resumed
//!                            │               │  ▲               │
//!                            │             Stop │ Resume        Pause
//!                            │               ▼  │               ▼
//!                         Destroy         Stopped ◀──Stop──── Paused
//!                            │               │
//!                            ▼            Destroy
//!                        Destroyed ◀─────────┘
//! ```
//!
//! `Started -> Paused` and `Stopped -> Started` (restart) are also accepted.
//! `NewIntent` leaves the state unchanged and is valid in any state except
//! `Initializing` and `Destroyed`.

use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;

/// Opaque, process-unique activity identity. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityToken(u64);

impl ActivityToken {
    /// Wrap a raw token value.
    pub const fn from_raw(raw: u64) -> Self {
        ActivityToken(raw)
    }

    /// Raw token value.
    pub const fn as_raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ActivityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "token#{}", self.0)
    }
}

/// Lifecycle state of one activity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LifecycleState {
    /// Record allocated; create not yet delivered.
    Initializing = 0,
    Created = 1,
    Started = 2,
    Resumed = 3,
    Paused = 4,
    Stopped = 5,
    /// Terminal.
    Destroyed = 6,
}

/// Lifecycle callback delivered to an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Create,
    Start,
    Resume,
    NewIntent,
    Pause,
    Stop,
    Destroy,
}

impl LifecycleEvent {
    /// All events, in declaration order.
    pub const ALL: [LifecycleEvent; 7] = [
        LifecycleEvent::Create,
        LifecycleEvent::Start,
        LifecycleEvent::Resume,
        LifecycleEvent::NewIntent,
        LifecycleEvent::Pause,
        LifecycleEvent::Stop,
        LifecycleEvent::Destroy,
    ];
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LifecycleEvent::Create => "onCreate",
            LifecycleEvent::Start => "onStart",
            LifecycleEvent::Resume => "onResume",
            LifecycleEvent::NewIntent => "onNewIntent",
            LifecycleEvent::Pause => "onPause",
            LifecycleEvent::Stop => "onStop",
            LifecycleEvent::Destroy => "onDestroy",
        };
        write!(f, "{}", name)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LifecycleState::Initializing => "initializing",
            LifecycleState::Created => "created",
            LifecycleState::Started => "started",
            LifecycleState::Resumed => "resumed",
            LifecycleState::Paused => "paused",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Destroyed => "destroyed",
        };
        write!(f, "{}", name)
    }
}

impl LifecycleState {
    /// Apply an event, returning the resulting state.
    pub fn apply(self, event: LifecycleEvent) -> Result<LifecycleState, LifecycleError> {
        use LifecycleEvent as E;
        use LifecycleState as S;

        let next = match (self, event) {
            (S::Destroyed, _) => return Err(LifecycleError::Destroyed),
            (S::Initializing, E::Create) => S::Created,
            (S::Created, E::Start) | (S::Stopped, E::Start) => S::Started,
            (S::Started, E::Resume) | (S::Paused, E::Resume) => S::Resumed,
            (S::Resumed, E::Pause) | (S::Started, E::Pause) => S::Paused,
            (S::Paused, E::Stop) | (S::Started, E::Stop) => S::Stopped,
            (S::Created, E::Destroy) | (S::Stopped, E::Destroy) => S::Destroyed,
            (state, E::NewIntent) if state != S::Initializing => state,
            (from, event) => return Err(LifecycleError::InvalidTransition { from, event }),
        };
        Ok(next)
    }

    /// Whether `event` is accepted in this state.
    pub fn accepts(self, event: LifecycleEvent) -> bool {
        self.apply(event).is_ok()
    }

    /// Events that move this state to `target`.
    ///
    /// Only `Resumed`, `Stopped` and `Destroyed` are meaningful targets;
    /// anything unreachable yields an empty path.
    pub fn path_to(self, target: LifecycleState) -> Vec<LifecycleEvent> {
        use LifecycleEvent as E;
        use LifecycleState as S;

        match (self, target) {
            (from, to) if from == to => vec![],
            (S::Created, S::Resumed) | (S::Stopped, S::Resumed) => vec![E::Start, E::Resume],
            (S::Started, S::Resumed) | (S::Paused, S::Resumed) => vec![E::Resume],

            (S::Created, S::Stopped) => vec![E::Start, E::Stop],
            (S::Started, S::Stopped) | (S::Resumed, S::Stopped) => vec![E::Pause, E::Stop],
            (S::Paused, S::Stopped) => vec![E::Stop],

            (S::Created, S::Destroyed) | (S::Stopped, S::Destroyed) => vec![E::Destroy],
            (S::Started, S::Destroyed) | (S::Resumed, S::Destroyed) => {
                vec![E::Pause, E::Stop, E::Destroy]
            }
            (S::Paused, S::Destroyed) => vec![E::Stop, E::Destroy],

            _ => vec![],
        }
    }

    /// Whether the activity is visible (started, resumed or paused).
    pub fn is_visible(self) -> bool {
        matches!(
            self,
            LifecycleState::Started | LifecycleState::Resumed | LifecycleState::Paused
        )
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
