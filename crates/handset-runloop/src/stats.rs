//! Looper dispatch counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-looper counters.
#[derive(Debug, Default)]
pub struct LooperStats {
    /// Tasks accepted by the queue.
    pub posted: AtomicU64,

    /// Tasks that ran to completion.
    pub dispatched: AtomicU64,

    /// Tasks that panicked.
    pub failed: AtomicU64,

    /// Posts rejected because the looper was quitting.
    pub rejected: AtomicU64,
}

impl LooperStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_posted(&self) {
        self.posted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of the counters.
    pub fn snapshot(&self) -> LooperStatsSnapshot {
        LooperStatsSnapshot {
            posted: self.posted.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`LooperStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LooperStatsSnapshot {
    pub posted: u64,
    pub dispatched: u64,
    pub failed: u64,
    pub rejected: u64,
}

impl LooperStatsSnapshot {
    /// Tasks that ran, successfully or not.
    pub fn executed(&self) -> u64 {
        self.dispatched + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_snapshot() {
        let stats = LooperStats::new();
        stats.record_posted();
        stats.record_posted();
        stats.record_dispatched();
        stats.record_failed();
        stats.record_rejected();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.posted, 2);
        assert_eq!(snapshot.dispatched, 1);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.executed(), 2);
    }
}
