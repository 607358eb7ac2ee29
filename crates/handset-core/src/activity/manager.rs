//! Activity manager service.
//!
//! Launch resolution (target lookup, launch-mode policy, stack edits) runs
//! synchronously on the caller's thread under the stack lock. Lifecycle
//! events are then delivered on the main looper, one task per event. A
//! record has at most one drive task queued at a time and each task queues
//! the next, so events for one token never overlap or reorder.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use handset_protocols::{
    actions, ActivityToken, ComponentName, Intent, IntentFlags, LaunchMode, LifecycleEvent,
    LifecycleState,
};
use handset_runloop::{panic_message, Handler};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, trace, warn};

use super::callbacks::{ActivityEvent, CallbackTable, LifecycleCallback};
use super::record::{ActivityRecord, ActivitySnapshot};
use crate::error::ActivityError;
use crate::package::PackageRegistry;
use crate::service::SystemService;

/// How a launch treats existing instances of its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LaunchPolicy {
    /// Always create a new record.
    New,
    /// Reuse the top record when it is the same component.
    ReuseTop,
    /// Reuse the topmost instance anywhere, finishing everything above it.
    ClearToExisting,
}

impl LaunchPolicy {
    fn resolve(mode: LaunchMode, flags: IntentFlags) -> Self {
        match mode {
            LaunchMode::SingleTask => LaunchPolicy::ClearToExisting,
            LaunchMode::SingleTop => LaunchPolicy::ReuseTop,
            LaunchMode::Standard if flags.contains(IntentFlags::CLEAR_TOP) => {
                LaunchPolicy::ClearToExisting
            }
            LaunchMode::Standard if flags.contains(IntentFlags::SINGLE_TOP) => {
                LaunchPolicy::ReuseTop
            }
            LaunchMode::Standard => LaunchPolicy::New,
        }
    }
}

#[derive(Default)]
struct TaskState {
    /// Bottom to top. Finishing records are removed immediately.
    stack: Vec<ActivityToken>,
    records: HashMap<ActivityToken, ActivityRecord>,
    /// Records touched since the last claim, in touch order.
    dirty: Vec<ActivityToken>,
}

impl TaskState {
    fn top(&self) -> Option<ActivityToken> {
        self.stack.last().copied()
    }

    fn top_matching(&self, component: &ComponentName) -> Option<ActivityToken> {
        let top = self.top()?;
        self.records
            .get(&top)
            .filter(|r| r.component == *component)
            .map(|_| top)
    }

    fn topmost_instance(&self, component: &ComponentName) -> Option<ActivityToken> {
        self.stack
            .iter()
            .rev()
            .find(|t| self.records.get(*t).is_some_and(|r| r.component == *component))
            .copied()
    }

    fn mark_dirty(&mut self, token: ActivityToken) {
        if !self.dirty.contains(&token) {
            self.dirty.push(token);
        }
    }

    fn retarget(&mut self, token: ActivityToken, target: LifecycleState) {
        if let Some(record) = self.records.get_mut(&token) {
            record.retarget(target);
            self.mark_dirty(token);
        }
    }

    /// Finish every record above `token`, top down.
    fn clear_above(&mut self, token: ActivityToken) -> usize {
        let Some(pos) = self.stack.iter().position(|t| *t == token) else {
            return 0;
        };
        let above: Vec<_> = self.stack.drain(pos + 1..).rev().collect();
        for t in &above {
            if let Some(record) = self.records.get_mut(t) {
                record.finish();
            }
            self.mark_dirty(*t);
        }
        above.len()
    }

    /// Tokens that have pending work but no queued drive task. Marks them
    /// scheduled.
    fn claim_runnable(&mut self) -> Vec<ActivityToken> {
        let dirty = std::mem::take(&mut self.dirty);
        dirty
            .into_iter()
            .filter(|t| match self.records.get_mut(t) {
                Some(r) if !r.scheduled && !r.pending.is_empty() => {
                    r.scheduled = true;
                    true
                }
                _ => false,
            })
            .collect()
    }

    fn forget(&mut self, token: ActivityToken) {
        self.records.remove(&token);
        self.stack.retain(|t| *t != token);
        self.dirty.retain(|t| *t != token);
    }
}

/// Owns every activity record and the single task stack.
///
/// Other components refer to activities only by [`ActivityToken`].
pub struct ActivityManager {
    me: Weak<ActivityManager>,
    packages: Arc<PackageRegistry>,
    main: Handler,
    next_token: AtomicU64,
    tasks: Mutex<TaskState>,
    callbacks: RwLock<CallbackTable>,
    ready: AtomicBool,
}

impl ActivityManager {
    /// Create a manager that resolves against `packages` and delivers
    /// lifecycle events on `main`.
    pub fn new(packages: Arc<PackageRegistry>, main: Handler) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            packages,
            main,
            next_token: AtomicU64::new(1),
            tasks: Mutex::new(TaskState::default()),
            callbacks: RwLock::new(CallbackTable::default()),
            ready: AtomicBool::new(false),
        })
    }

    pub fn packages(&self) -> &Arc<PackageRegistry> {
        &self.packages
    }

    /// Handler lifecycle events are delivered through.
    pub fn main_handler(&self) -> &Handler {
        &self.main
    }

    // ========================================================================
    // Launching
    // ========================================================================

    /// Launch `package_name/activity` with `flags`.
    pub fn start_activity(
        &self,
        package_name: &str,
        activity: &str,
        flags: IntentFlags,
    ) -> Option<ActivityToken> {
        self.start_activity_with_intent(Intent::explicit(package_name, activity).add_flags(flags))
    }

    /// Launch the explicit target of `intent`.
    ///
    /// Returns `None` without creating a record when the intent has no
    /// explicit target or the target is not registered.
    pub fn start_activity_with_intent(&self, intent: Intent) -> Option<ActivityToken> {
        let component = match intent.require_component() {
            Ok(component) => component.clone(),
            Err(e) => {
                warn!("Rejecting launch: {}", e);
                return None;
            }
        };
        let Some(info) = self
            .packages
            .get_activity_info(&component.package_name, &component.class_name)
        else {
            warn!("Unable to resolve activity {}", component);
            return None;
        };
        let policy = LaunchPolicy::resolve(info.launch_mode, intent.flags);

        let (token, runnable) = {
            let mut tasks = self.tasks.lock();
            let existing = match policy {
                LaunchPolicy::New => None,
                LaunchPolicy::ReuseTop => tasks.top_matching(&component),
                LaunchPolicy::ClearToExisting => tasks.topmost_instance(&component),
            };

            let token = match existing {
                Some(token) => {
                    let cleared = tasks.clear_above(token);
                    if let Some(record) = tasks.records.get_mut(&token) {
                        record.deliver_new_intent(intent);
                    }
                    tasks.mark_dirty(token);
                    info!(
                        "Reusing {} for {} ({:?}, cleared {})",
                        token, component, policy, cleared
                    );
                    token
                }
                None => {
                    let token = ActivityToken::from_raw(self.next_token.fetch_add(1, Ordering::Relaxed));
                    if let Some(previous) = tasks.top() {
                        tasks.retarget(previous, LifecycleState::Stopped);
                    }
                    tasks
                        .records
                        .insert(token, ActivityRecord::new(token, &info, intent));
                    tasks.stack.push(token);
                    tasks.mark_dirty(token);
                    info!("Starting {} as {} ({})", component, token, info.launch_mode);
                    token
                }
            };
            (token, tasks.claim_runnable())
        };

        for t in runnable {
            self.schedule(t);
        }
        Some(token)
    }

    /// Launch the registry's home activity.
    pub fn start_home_activity(&self) -> Result<ActivityToken, ActivityError> {
        let Some(home) = self.packages.home_activity() else {
            error!("No home activity registered");
            return Err(ActivityError::NoHomeActivity);
        };
        let intent = Intent::explicit(&home.package_name, &home.name).set_action(actions::MAIN);
        self.start_activity_with_intent(intent)
            .ok_or_else(|| ActivityError::LaunchFailed(home.component()))
    }

    /// Begin finishing `token`.
    ///
    /// Returns `false` (and does nothing) when the token is unknown, already
    /// finishing or destroyed. Otherwise the record leaves the task stack now
    /// and is destroyed asynchronously; the record it uncovers is resumed.
    pub fn finish_activity(&self, token: ActivityToken) -> bool {
        let runnable = {
            let mut tasks = self.tasks.lock();
            let Some(record) = tasks.records.get_mut(&token) else {
                debug!("finish_activity: unknown {}", token);
                return false;
            };
            if !record.finish() {
                debug!("finish_activity: {} already finishing", token);
                return false;
            }

            let was_top = tasks.top() == Some(token);
            tasks.stack.retain(|t| *t != token);
            tasks.mark_dirty(token);
            if was_top {
                if let Some(next) = tasks.top() {
                    tasks.retarget(next, LifecycleState::Resumed);
                }
            }
            tasks.claim_runnable()
        };

        info!("Finishing {}", token);
        for t in runnable {
            self.schedule(t);
        }
        true
    }

    // ========================================================================
    // Lifecycle delivery
    // ========================================================================

    fn schedule(&self, token: ActivityToken) {
        let Some(me) = self.me.upgrade() else {
            return;
        };
        if let Err(e) = self.main.post(move || me.drive(token)) {
            warn!("Dropping lifecycle work for {}: {}", token, e);
            if let Some(record) = self.tasks.lock().records.get_mut(&token) {
                record.scheduled = false;
            }
        }
    }

    /// Deliver one event for `token`. Runs on the main looper.
    fn drive(&self, token: ActivityToken) {
        let delivered = {
            let mut tasks = self.tasks.lock();
            let Some(record) = tasks.records.get_mut(&token) else {
                return;
            };
            let Some(event) = record.next_event() else {
                record.scheduled = false;
                return;
            };
            let state = match record.state.apply(event) {
                Ok(state) => state,
                Err(e) => {
                    warn!("Lifecycle error for {}: {}", token, e);
                    record.scheduled = false;
                    return;
                }
            };
            record.state = state;
            let delivered = ActivityEvent {
                token,
                component: record.component.clone(),
                event,
                state,
                intent: record.intent.clone(),
            };

            let more = if state == LifecycleState::Destroyed {
                false
            } else if record.pending.is_empty() {
                record.scheduled = false;
                false
            } else {
                true
            };
            if state == LifecycleState::Destroyed {
                tasks.forget(token);
                info!("Activity {} destroyed ({})", token, delivered.component);
            }
            (delivered, more)
        };

        let (event, more) = delivered;
        if more {
            self.schedule(token);
        }
        trace!("{} {} -> {}", event.token, event.event, event.state);
        self.dispatch(&event);
    }

    fn dispatch(&self, event: &ActivityEvent) {
        let callbacks = self.callbacks.read().matching(event.event);
        for callback in callbacks {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(event))) {
                error!(
                    "Lifecycle callback panicked on {} for {}: {}",
                    event.event,
                    event.token,
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Observe one lifecycle event for every activity.
    pub fn on_lifecycle<F>(&self, event: LifecycleEvent, callback: F)
    where
        F: Fn(&ActivityEvent) + Send + Sync + 'static,
    {
        self.callbacks.write().add(event, Arc::new(callback) as LifecycleCallback);
    }

    /// Observe every lifecycle event for every activity.
    pub fn on_any_lifecycle<F>(&self, callback: F)
    where
        F: Fn(&ActivityEvent) + Send + Sync + 'static,
    {
        self.callbacks.write().add_any(Arc::new(callback));
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Live records on the task stack, bottom to top.
    pub fn task_stack(&self) -> Vec<ActivitySnapshot> {
        let tasks = self.tasks.lock();
        tasks
            .stack
            .iter()
            .filter_map(|t| tasks.records.get(t).map(ActivityRecord::snapshot))
            .collect()
    }

    pub fn top_activity(&self) -> Option<ActivitySnapshot> {
        let tasks = self.tasks.lock();
        tasks
            .top()
            .and_then(|t| tasks.records.get(&t).map(ActivityRecord::snapshot))
    }

    /// Snapshot of any known record, including finishing ones.
    pub fn activity(&self, token: ActivityToken) -> Option<ActivitySnapshot> {
        self.tasks.lock().records.get(&token).map(ActivityRecord::snapshot)
    }

    /// Current state, `None` once the record is forgotten.
    pub fn activity_state(&self, token: ActivityToken) -> Option<LifecycleState> {
        self.tasks.lock().records.get(&token).map(|r| r.state)
    }

    /// Records not yet destroyed, including finishing ones.
    pub fn record_count(&self) -> usize {
        self.tasks.lock().records.len()
    }

    /// Topmost resumed record on the stack.
    pub fn resumed_activity(&self) -> Option<ActivityToken> {
        let tasks = self.tasks.lock();
        tasks
            .stack
            .iter()
            .rev()
            .find(|t| {
                tasks
                    .records
                    .get(*t)
                    .is_some_and(|r| r.state == LifecycleState::Resumed)
            })
            .copied()
    }

    pub fn is_system_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl SystemService for ActivityManager {
    fn system_ready(&self) {
        self.ready.store(true, Ordering::Release);
        info!("Activity manager ready ({} records)", self.record_count());
    }
}

impl std::fmt::Debug for ActivityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityManager")
            .field("main", &self.main)
            .field("records", &self.record_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
