//! Looper core implementation.
//!
//! A looper is bound to the thread that prepared it. Any thread may post
//! through a [`Handler`]; only the bound thread runs tasks.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, error, info, trace};

use crate::error::{LooperError, LooperResult};
use crate::handler::Handler;
use crate::message::{Message, Task};
use crate::message_queue::{MessageQueue, Poll};
use crate::stats::{LooperStats, LooperStatsSnapshot};

thread_local! {
    static CURRENT: RefCell<Option<Arc<Looper>>> = const { RefCell::new(None) };
}

static MAIN: Mutex<Option<Arc<Looper>>> = parking_lot::const_mutex(None);

static NEXT_LOOPER_ID: AtomicU64 = AtomicU64::new(1);

/// A run loop bound to a single thread.
pub struct Looper {
    id: u64,
    name: String,
    thread: ThreadId,
    main: bool,
    queue: MessageQueue,
    stats: LooperStats,
}

impl Looper {
    fn new(main: bool) -> Self {
        let current = thread::current();
        let id = NEXT_LOOPER_ID.fetch_add(1, Ordering::Relaxed);
        let name = match current.name() {
            Some(n) => format!("{}#{}", n, id),
            None => format!("looper#{}", id),
        };
        Self {
            id,
            name,
            thread: current.id(),
            main,
            queue: MessageQueue::new(),
            stats: LooperStats::new(),
        }
    }

    /// Bind a new looper to the calling thread.
    ///
    /// Fails with [`LooperError::AlreadyPrepared`] if the thread already has one.
    pub fn prepare() -> LooperResult<Arc<Looper>> {
        Self::bind(false)
    }

    fn bind(main: bool) -> LooperResult<Arc<Looper>> {
        CURRENT.with(|cell| {
            let mut slot = cell.borrow_mut();
            if let Some(existing) = slot.as_ref() {
                return Err(LooperError::AlreadyPrepared(existing.name.clone()));
            }
            let looper = Arc::new(Looper::new(main));
            debug!("Looper {} prepared", looper.name);
            *slot = Some(looper.clone());
            Ok(looper)
        })
    }

    /// Prepare the process-wide main looper on the calling thread.
    ///
    /// Idempotent: once a main looper exists, later calls (from any thread)
    /// return it unchanged.
    pub fn prepare_main() -> LooperResult<Arc<Looper>> {
        let mut main = MAIN.lock();
        if let Some(existing) = main.as_ref() {
            debug!("Main looper already prepared ({}), reusing", existing.name);
            return Ok(existing.clone());
        }

        let looper = Self::bind(true)?;
        info!("Main looper prepared: {}", looper.name);
        *main = Some(looper.clone());
        Ok(looper)
    }

    /// The main looper, or [`LooperError::NotPrepared`].
    pub fn main() -> LooperResult<Arc<Looper>> {
        MAIN.lock().clone().ok_or(LooperError::NotPrepared)
    }

    /// The calling thread's looper, if any.
    pub fn my_looper() -> Option<Arc<Looper>> {
        CURRENT.with(|cell| cell.borrow().clone())
    }

    /// Unbind the calling thread's looper so the thread may prepare again.
    ///
    /// The main looper stays registered; use [`reset_main`](Self::reset_main)
    /// to forget it.
    pub fn release() -> Option<Arc<Looper>> {
        CURRENT.with(|cell| cell.borrow_mut().take())
    }

    /// Quit and forget the main looper. Test-isolation hook.
    pub fn reset_main() {
        let previous = MAIN.lock().take();
        if let Some(looper) = previous {
            looper.quit();
            CURRENT.with(|cell| {
                let mut slot = cell.borrow_mut();
                if slot.as_ref().is_some_and(|l| l.id == looper.id) {
                    slot.take();
                }
            });
            info!("Main looper {} reset", looper.name);
        }
    }

    /// Handler posting onto this looper.
    pub fn handler(self: &Arc<Self>) -> Handler {
        Handler::new(self.clone())
    }

    /// Looper name (`<thread>#<id>`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the main looper.
    pub fn is_main(&self) -> bool {
        self.main
    }

    /// Whether the calling thread is this looper's bound thread.
    pub fn is_current_thread(&self) -> bool {
        thread::current().id() == self.thread
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether [`quit`](Self::quit) has been called.
    pub fn is_quitting(&self) -> bool {
        self.queue.is_quitting()
    }

    /// Dispatch counters.
    pub fn stats(&self) -> LooperStatsSnapshot {
        self.stats.snapshot()
    }

    /// Stop the looper. Queued tasks are dropped and later posts are rejected.
    pub fn quit(&self) {
        let dropped = self.queue.quit();
        info!("Looper {} quitting, dropped {} pending tasks", self.name, dropped);
    }

    pub(crate) fn enqueue(&self, task: Task, when: Instant) -> LooperResult<()> {
        match self.queue.enqueue(task, when) {
            Some(_) => {
                self.stats.record_posted();
                Ok(())
            }
            None => {
                self.stats.record_rejected();
                debug!("Looper {} rejected a task while quitting", self.name);
                Err(LooperError::Quitting(self.name.clone()))
            }
        }
    }

    fn check_thread(&self) -> LooperResult<()> {
        if self.is_current_thread() {
            Ok(())
        } else {
            Err(LooperError::WrongThread {
                looper: self.name.clone(),
            })
        }
    }

    // ========================================================================
    // Run Methods
    // ========================================================================

    /// Run at most one due task without blocking.
    ///
    /// Returns whether a task ran.
    pub fn loop_once(&self) -> LooperResult<bool> {
        self.check_thread()?;
        match self.queue.poll_due(Instant::now()) {
            Some(message) => {
                self.dispatch(message);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run every task that is due, including tasks those tasks post for
    /// immediate execution. Never blocks on future tasks.
    ///
    /// Returns the number of tasks run.
    pub fn run_until_idle(&self) -> LooperResult<usize> {
        self.check_thread()?;
        let mut count = 0;
        while let Some(message) = self.queue.poll_due(Instant::now()) {
            self.dispatch(message);
            count += 1;
        }
        Ok(count)
    }

    /// Dispatch tasks as they come due for `duration`, sleeping in between.
    ///
    /// Returns early if the looper quits. Returns the number of tasks run.
    pub fn run_for(&self, duration: Duration) -> LooperResult<usize> {
        self.check_thread()?;
        let deadline = Instant::now() + duration;
        let mut count = 0;
        loop {
            match self.queue.next(Some(deadline)) {
                Poll::Ready(message) => {
                    self.dispatch(message);
                    count += 1;
                }
                Poll::TimedOut | Poll::Quit => break,
            }
        }
        Ok(count)
    }

    /// Dispatch tasks until [`quit`](Self::quit) is called.
    pub fn run(&self) -> LooperResult<()> {
        self.check_thread()?;
        info!("Looper {} running", self.name);
        loop {
            match self.queue.next(None) {
                Poll::Ready(message) => self.dispatch(message),
                Poll::Quit => break,
                Poll::TimedOut => continue,
            }
        }
        info!("Looper {} exited", self.name);
        Ok(())
    }

    /// Run one task, containing panics at the loop boundary.
    fn dispatch(&self, message: Message) {
        let seq = message.seq;
        let started = Instant::now();

        match panic::catch_unwind(AssertUnwindSafe(|| message.run())) {
            Ok(()) => {
                self.stats.record_dispatched();
                trace!(
                    "Looper {} ran task {} in {:?}",
                    self.name,
                    seq,
                    started.elapsed()
                );
            }
            Err(payload) => {
                self.stats.record_failed();
                error!(
                    "Looper {}: task {} panicked: {}",
                    self.name,
                    seq,
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

impl std::fmt::Debug for Looper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Looper")
            .field("name", &self.name)
            .field("main", &self.main)
            .field("pending", &self.queue.len())
            .finish()
    }
}

/// Text of a `catch_unwind` payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "looper_tests.rs"]
mod tests;
