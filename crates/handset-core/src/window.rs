//! Window manager: one window per live activity, focus follows resume.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use handset_protocols::{ActivityToken, ComponentName, LifecycleEvent};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info};

use crate::activity::{ActivityEvent, ActivityManager};
use crate::service::SystemService;

/// Read-only view of one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowInfo {
    pub token: ActivityToken,
    pub component: ComponentName,
    pub visible: bool,
    pub focused: bool,
}

#[derive(Default)]
struct WindowTable {
    /// Creation order.
    windows: Vec<(ActivityToken, ComponentName, bool)>,
    focused: Option<ActivityToken>,
}

impl WindowTable {
    fn set_visible(&mut self, token: ActivityToken, visible: bool) {
        if let Some(entry) = self.windows.iter_mut().find(|(t, _, _)| *t == token) {
            entry.2 = visible;
        }
    }

    fn apply(&mut self, event: &ActivityEvent) {
        let token = event.token;
        match event.event {
            LifecycleEvent::Create => {
                if !self.windows.iter().any(|(t, _, _)| *t == token) {
                    self.windows.push((token, event.component.clone(), false));
                    debug!("Window added for {}", token);
                }
            }
            LifecycleEvent::Start => self.set_visible(token, true),
            LifecycleEvent::Resume => {
                self.set_visible(token, true);
                self.focused = Some(token);
                debug!("Focus -> {}", token);
            }
            LifecycleEvent::Pause => {
                if self.focused == Some(token) {
                    self.focused = None;
                }
            }
            LifecycleEvent::Stop => self.set_visible(token, false),
            LifecycleEvent::Destroy => {
                self.windows.retain(|(t, _, _)| *t != token);
                if self.focused == Some(token) {
                    self.focused = None;
                }
                debug!("Window removed for {}", token);
            }
            LifecycleEvent::NewIntent => {}
        }
    }
}

/// Tracks windows by observing the activity manager.
pub struct WindowManager {
    activity: Arc<ActivityManager>,
    table: Arc<RwLock<WindowTable>>,
    ready: AtomicBool,
}

impl WindowManager {
    /// Create and subscribe to `activity` lifecycle events.
    pub fn new(activity: Arc<ActivityManager>) -> Arc<Self> {
        let table = Arc::new(RwLock::new(WindowTable::default()));
        let sink = table.clone();
        activity.on_any_lifecycle(move |event| sink.write().apply(event));

        Arc::new(Self {
            activity,
            table,
            ready: AtomicBool::new(false),
        })
    }

    pub fn activity_manager(&self) -> &Arc<ActivityManager> {
        &self.activity
    }

    /// Windows in creation order.
    pub fn windows(&self) -> Vec<WindowInfo> {
        let table = self.table.read();
        table
            .windows
            .iter()
            .map(|(token, component, visible)| WindowInfo {
                token: *token,
                component: component.clone(),
                visible: *visible,
                focused: table.focused == Some(*token),
            })
            .collect()
    }

    /// Token of the resumed activity's window.
    pub fn focused_window(&self) -> Option<ActivityToken> {
        self.table.read().focused
    }

    pub fn window_count(&self) -> usize {
        self.table.read().windows.len()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl SystemService for WindowManager {
    fn system_ready(&self) {
        self.ready.store(true, Ordering::Release);
        info!("Window manager ready ({} windows)", self.window_count());
    }
}
