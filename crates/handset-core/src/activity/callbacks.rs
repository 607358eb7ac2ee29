//! Lifecycle observer table.

use std::collections::HashMap;
use std::sync::Arc;

use handset_protocols::{ActivityToken, ComponentName, Intent, LifecycleEvent, LifecycleState};

/// One lifecycle delivery, as seen by observers.
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub token: ActivityToken,
    pub component: ComponentName,
    pub event: LifecycleEvent,
    /// State after the event was applied.
    pub state: LifecycleState,
    /// Intent the record currently holds.
    pub intent: Intent,
}

/// Observer invoked on the main looper.
pub type LifecycleCallback = Arc<dyn Fn(&ActivityEvent) + Send + Sync>;

#[derive(Default)]
pub(crate) struct CallbackTable {
    by_event: HashMap<LifecycleEvent, Vec<LifecycleCallback>>,
    any: Vec<LifecycleCallback>,
}

impl CallbackTable {
    pub fn add(&mut self, event: LifecycleEvent, callback: LifecycleCallback) {
        self.by_event.entry(event).or_default().push(callback);
    }

    pub fn add_any(&mut self, callback: LifecycleCallback) {
        self.any.push(callback);
    }

    /// Callbacks for `event`: per-event observers first, then catch-all ones.
    pub fn matching(&self, event: LifecycleEvent) -> Vec<LifecycleCallback> {
        self.by_event
            .get(&event)
            .into_iter()
            .flatten()
            .chain(self.any.iter())
            .cloned()
            .collect()
    }
}
