//! Message queue ordered by scheduled time, then enqueue sequence.
//!
//! Producers on any thread call [`MessageQueue::enqueue`]; only the owning
//! looper thread dequeues. Waiting uses a condition variable so a sleeping
//! looper wakes as soon as an earlier task arrives.

use std::collections::BinaryHeap;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use tracing::trace;

use crate::message::{Message, Task};

/// Outcome of a blocking dequeue.
#[derive(Debug)]
pub enum Poll {
    /// A message is due.
    Ready(Message),
    /// The deadline passed with nothing due.
    TimedOut,
    /// The queue is quitting.
    Quit,
}

struct QueueState {
    heap: BinaryHeap<Message>,
    next_seq: u64,
    quitting: bool,
}

/// Time-ordered task queue.
pub struct MessageQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl MessageQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                next_seq: 0,
                quitting: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Enqueue a task due at `when`.
    ///
    /// Returns the sequence number, or `None` when the queue is quitting
    /// (the task is dropped).
    pub fn enqueue(&self, task: Task, when: Instant) -> Option<u64> {
        let mut state = self.state.lock();
        if state.quitting {
            return None;
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(Message::new(when, seq, task));
        drop(state);

        trace!("Message {} enqueued", seq);
        self.available.notify_one();
        Some(seq)
    }

    /// Pop the earliest message if it is due at `now`. Never blocks.
    pub fn poll_due(&self, now: Instant) -> Option<Message> {
        let mut state = self.state.lock();
        if state.quitting {
            return None;
        }
        if state.heap.peek().is_some_and(|m| m.when <= now) {
            return state.heap.pop();
        }
        None
    }

    /// Block until a message is due, `deadline` passes, or the queue quits.
    ///
    /// With no deadline, waits indefinitely.
    pub fn next(&self, deadline: Option<Instant>) -> Poll {
        let mut state = self.state.lock();
        loop {
            if state.quitting {
                return Poll::Quit;
            }

            let now = Instant::now();
            let next_when = state.heap.peek().map(|m| m.when);

            if next_when.is_some_and(|when| when <= now) {
                if let Some(message) = state.heap.pop() {
                    return Poll::Ready(message);
                }
            }

            if deadline.is_some_and(|d| d <= now) {
                return Poll::TimedOut;
            }

            let wake_at = match (next_when, deadline) {
                (Some(when), Some(d)) => Some(when.min(d)),
                (Some(when), None) => Some(when),
                (None, d) => d,
            };

            match wake_at {
                Some(at) => {
                    self.available.wait_until(&mut state, at);
                }
                None => self.available.wait(&mut state),
            }
        }
    }

    /// Scheduled time of the earliest queued message.
    pub fn next_due(&self) -> Option<Instant> {
        self.state.lock().heap.peek().map(|m| m.when)
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.state.lock().heap.len()
    }

    /// Whether no messages are queued.
    pub fn is_empty(&self) -> bool {
        self.state.lock().heap.is_empty()
    }

    /// Whether [`quit`](Self::quit) has been called.
    pub fn is_quitting(&self) -> bool {
        self.state.lock().quitting
    }

    /// Stop accepting messages, drop everything queued and wake waiters.
    ///
    /// Returns the number of dropped messages.
    pub fn quit(&self) -> usize {
        let mut state = self.state.lock();
        state.quitting = true;
        let dropped = std::mem::take(&mut state.heap);
        drop(state);

        self.available.notify_all();
        // Dropped outside the lock: task captures may post on drop.
        dropped.len()
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "message_queue_tests.rs"]
mod tests;
