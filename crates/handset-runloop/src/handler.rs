//! Task handles bound to a looper.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{LooperError, LooperResult};
use crate::looper::Looper;

/// Enqueues work onto one looper. Usable from any thread.
///
/// Posting is fire-and-forget: the handler keeps no reference to a task
/// once it is queued.
#[derive(Clone)]
pub struct Handler {
    looper: Arc<Looper>,
}

impl Handler {
    /// Create a handler for `looper`.
    pub fn new(looper: Arc<Looper>) -> Self {
        Self { looper }
    }

    /// Handler for the calling thread's looper.
    pub fn for_current_thread() -> LooperResult<Self> {
        Looper::my_looper()
            .map(Self::new)
            .ok_or(LooperError::NotPrepared)
    }

    /// Handler for the main looper.
    pub fn main() -> LooperResult<Self> {
        Looper::main().map(Self::new)
    }

    /// The target looper.
    pub fn looper(&self) -> &Arc<Looper> {
        &self.looper
    }

    /// Whether the calling thread is the target looper's thread.
    pub fn is_on_looper_thread(&self) -> bool {
        self.looper.is_current_thread()
    }

    /// Run `task` as soon as possible, after every task already due.
    pub fn post<F>(&self, task: F) -> LooperResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.looper.enqueue(Box::new(task), Instant::now())
    }

    /// Run `task` no earlier than `delay` from now.
    pub fn post_delayed<F>(&self, task: F, delay: Duration) -> LooperResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.looper.enqueue(Box::new(task), Instant::now() + delay)
    }

    /// Run `task` no earlier than `when`.
    pub fn post_at<F>(&self, task: F, when: Instant) -> LooperResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.looper.enqueue(Box::new(task), when)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("looper", &self.looper.name())
            .finish()
    }
}
