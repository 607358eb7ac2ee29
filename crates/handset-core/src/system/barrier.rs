//! Countdown latch for service readiness.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Releases waiters once counted down to zero.
pub struct ReadinessBarrier {
    remaining: Mutex<usize>,
    released: Condvar,
}

impl ReadinessBarrier {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            released: Condvar::new(),
        }
    }

    /// Decrement, saturating at zero.
    pub fn count_down(&self) {
        let mut remaining = self.remaining.lock();
        if *remaining > 0 {
            *remaining -= 1;
            if *remaining == 0 {
                self.released.notify_all();
            }
        }
    }

    pub fn remaining(&self) -> usize {
        *self.remaining.lock()
    }

    pub fn is_released(&self) -> bool {
        self.remaining() == 0
    }

    /// Block until released or `timeout` elapses. Returns whether released.
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            if self.released.wait_until(&mut remaining, deadline).timed_out() {
                return *remaining == 0;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_zero_count_is_released() {
        let barrier = ReadinessBarrier::new(0);
        assert!(barrier.is_released());
        assert!(barrier.wait(Duration::ZERO));
    }

    #[test]
    fn test_wait_times_out() {
        let barrier = ReadinessBarrier::new(1);
        let started = Instant::now();
        assert!(!barrier.wait(Duration::from_millis(30)));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_count_down_saturates() {
        let barrier = ReadinessBarrier::new(2);
        barrier.count_down();
        barrier.count_down();
        barrier.count_down();
        assert_eq!(barrier.remaining(), 0);
    }

    #[test]
    fn test_release_wakes_waiter() {
        let barrier = Arc::new(ReadinessBarrier::new(3));
        let waiter = {
            let barrier = barrier.clone();
            std::thread::spawn(move || barrier.wait(Duration::from_secs(5)))
        };
        for _ in 0..3 {
            std::thread::sleep(Duration::from_millis(5));
            barrier.count_down();
        }
        assert!(waiter.join().unwrap());
    }
}
