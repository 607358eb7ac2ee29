//! Queued messages.

use std::cmp::Ordering;
use std::time::Instant;

/// A unit of work run on a looper thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A task together with its scheduling key.
pub struct Message {
    /// Earliest time the task may run.
    pub when: Instant,

    /// Enqueue sequence number, unique per queue. Breaks ties on `when`.
    pub seq: u64,

    pub(crate) task: Task,
}

impl Message {
    pub(crate) fn new(when: Instant, seq: u64, task: Task) -> Self {
        Self { when, seq, task }
    }

    /// Run the task, consuming the message.
    pub fn run(self) {
        (self.task)()
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("when", &self.when)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq && self.when == other.when
    }
}

impl Eq for Message {}

impl PartialOrd for Message {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Message {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earlier time, then earlier sequence, has higher priority (reverse for min-heap)
        other
            .when
            .cmp(&self.when)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;
    use std::time::Duration;

    fn noop(when: Instant, seq: u64) -> Message {
        Message::new(when, seq, Box::new(|| {}))
    }

    #[test]
    fn test_heap_pops_earliest_first() {
        let base = Instant::now();
        let mut heap = BinaryHeap::new();
        heap.push(noop(base + Duration::from_millis(10), 0));
        heap.push(noop(base, 1));
        heap.push(noop(base + Duration::from_millis(5), 2));

        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|m| m.seq)).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_heap_breaks_ties_by_sequence() {
        let when = Instant::now();
        let mut heap = BinaryHeap::new();
        for seq in [3, 1, 4, 0, 2] {
            heap.push(noop(when, seq));
        }

        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|m| m.seq)).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_run_consumes_task() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let message = Message::new(
            Instant::now(),
            0,
            Box::new(move || flag.store(true, Ordering::SeqCst)),
        );
        message.run();
        assert!(ran.load(Ordering::SeqCst));
    }
}
