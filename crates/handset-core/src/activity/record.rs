//! Activity records and their pending lifecycle steps.

use std::collections::VecDeque;
use std::time::Instant;

use handset_protocols::{
    ActivityInfo, ActivityToken, ComponentName, Intent, LaunchMode, LifecycleEvent,
    LifecycleState,
};
use serde::Serialize;

/// One queued unit of lifecycle work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Deliver exactly this event.
    Deliver(LifecycleEvent),
    /// Deliver whatever path leads from the state at execution time to this one.
    DriveTo(LifecycleState),
}

/// Manager-owned state of one activity instance.
pub(crate) struct ActivityRecord {
    pub token: ActivityToken,
    pub component: ComponentName,
    pub launch_mode: LaunchMode,
    pub state: LifecycleState,
    pub intent: Intent,
    pub finishing: bool,
    pub launched_at: Instant,
    pub pending: VecDeque<Step>,
    /// A drive task for this record is queued on the main looper.
    pub scheduled: bool,
}

impl ActivityRecord {
    pub fn new(token: ActivityToken, info: &ActivityInfo, intent: Intent) -> Self {
        let mut pending = VecDeque::new();
        pending.push_back(Step::Deliver(LifecycleEvent::Create));
        pending.push_back(Step::DriveTo(LifecycleState::Resumed));
        Self {
            token,
            component: info.component(),
            launch_mode: info.launch_mode,
            state: LifecycleState::Initializing,
            intent,
            finishing: false,
            launched_at: Instant::now(),
            pending,
            scheduled: false,
        }
    }

    /// Replace any pending target with `target`.
    ///
    /// Create and NewIntent deliveries stay queued; transition events are
    /// recomputed from the state at execution time. Finishing records only
    /// accept `Destroyed`.
    pub fn retarget(&mut self, target: LifecycleState) {
        if self.finishing && target != LifecycleState::Destroyed {
            return;
        }
        self.pending.retain(|step| {
            matches!(
                step,
                Step::Deliver(LifecycleEvent::Create) | Step::Deliver(LifecycleEvent::NewIntent)
            )
        });
        self.pending.push_back(Step::DriveTo(target));
    }

    /// Reuse this instance for `intent`: NewIntent, then back to resumed.
    pub fn deliver_new_intent(&mut self, intent: Intent) {
        self.intent = intent;
        self.pending.push_back(Step::Deliver(LifecycleEvent::NewIntent));
        self.retarget(LifecycleState::Resumed);
    }

    /// Mark finishing and drive to destroyed. Returns false if already finishing.
    pub fn finish(&mut self) -> bool {
        if self.finishing {
            return false;
        }
        self.finishing = true;
        self.pending
            .retain(|step| matches!(step, Step::Deliver(LifecycleEvent::Create)));
        self.pending
            .push_back(Step::DriveTo(LifecycleState::Destroyed));
        true
    }

    /// Pop the next concrete event to deliver, expanding targets lazily and
    /// skipping events the current state no longer accepts.
    pub fn next_event(&mut self) -> Option<LifecycleEvent> {
        while let Some(step) = self.pending.pop_front() {
            match step {
                Step::DriveTo(target) => {
                    for event in self.state.path_to(target).into_iter().rev() {
                        self.pending.push_front(Step::Deliver(event));
                    }
                }
                Step::Deliver(event) if self.state.accepts(event) => return Some(event),
                Step::Deliver(event) => {
                    tracing::debug!(
                        "Skipping {} for {} in state {}",
                        event,
                        self.token,
                        self.state
                    );
                }
            }
        }
        None
    }

    pub fn snapshot(&self) -> ActivitySnapshot {
        ActivitySnapshot {
            token: self.token,
            component: self.component.clone(),
            launch_mode: self.launch_mode,
            state: self.state,
            finishing: self.finishing,
            uptime_ms: self.launched_at.elapsed().as_millis() as u64,
        }
    }
}

/// Read-only view of an activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivitySnapshot {
    pub token: ActivityToken,
    pub component: ComponentName,
    pub launch_mode: LaunchMode,
    pub state: LifecycleState,
    pub finishing: bool,
    pub uptime_ms: u64,
}
