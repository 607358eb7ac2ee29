//! Process-scoped state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::service::ServiceRegistry;

static GLOBAL: RwLock<Option<Arc<ProcessState>>> = parking_lot::const_rwlock(None);

/// Service registry plus the system-ready flag for one process.
pub struct ProcessState {
    services: ServiceRegistry,
    ready: AtomicBool,
}

impl ProcessState {
    /// An isolated instance, not reachable through [`global`](Self::global).
    pub fn new() -> Self {
        Self {
            services: ServiceRegistry::new(),
            ready: AtomicBool::new(false),
        }
    }

    /// The process-wide instance, created on first use.
    pub fn global() -> Arc<ProcessState> {
        if let Some(state) = GLOBAL.read().as_ref() {
            return state.clone();
        }
        GLOBAL
            .write()
            .get_or_insert_with(|| Arc::new(ProcessState::new()))
            .clone()
    }

    /// Forget the process-wide instance. Test-isolation hook.
    pub fn reset_global() {
        if GLOBAL.write().take().is_some() {
            debug!("Process state reset");
        }
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// Whether bootstrap reached the ready phase.
    pub fn is_system_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub(crate) fn mark_system_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }
}

impl Default for ProcessState {
    fn default() -> Self {
        Self::new()
    }
}
