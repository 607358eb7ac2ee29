//! Integration tests for looper ordering and cross-thread posting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use handset_runloop::{Handler, Looper};
use parking_lot::Mutex;

/// Small deterministic generator so sequences are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn test_drain_order_is_time_then_enqueue_order() {
    let looper = Looper::prepare().unwrap();
    let handler = looper.handler();
    let base = Instant::now();
    let log: Arc<Mutex<Vec<(Instant, usize)>>> = Arc::new(Mutex::new(Vec::new()));

    let mut rng = Lcg(0x5eed);
    let mut expected = Vec::new();
    for i in 0..200 {
        // A handful of distinct slots so ties are common.
        let when = base + Duration::from_millis(rng.next() % 8 * 5);
        expected.push((when, i));
        let sink = log.clone();
        handler
            .post_at(move || sink.lock().push((when, i)), when)
            .unwrap();
    }

    looper.run_for(Duration::from_millis(150)).unwrap();

    // Stable sort by time keeps enqueue order within equal times.
    expected.sort_by_key(|(when, _)| *when);
    let actual = log.lock().clone();
    assert_eq!(actual.len(), 200);
    assert_eq!(actual, expected);
}

#[test]
fn test_immediate_posts_from_many_threads_all_run_on_looper_thread() {
    let looper = Looper::prepare().unwrap();
    let handler = looper.handler();
    let loop_thread = std::thread::current().id();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let handler: Handler = handler.clone();
            let seen = seen.clone();
            std::thread::spawn(move || {
                for i in 0..25 {
                    let seen = seen.clone();
                    handler
                        .post(move || seen.lock().push((p, i, std::thread::current().id())))
                        .unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    assert_eq!(looper.run_until_idle().unwrap(), 100);
    let seen = seen.lock();
    assert_eq!(seen.len(), 100);
    assert!(seen.iter().all(|(_, _, thread)| *thread == loop_thread));

    // Per-producer FIFO is preserved.
    for p in 0..4 {
        let order: Vec<_> = seen.iter().filter(|(q, _, _)| *q == p).map(|(_, i, _)| *i).collect();
        assert_eq!(order, (0..25).collect::<Vec<_>>());
    }
}

#[test]
fn test_looper_on_worker_thread() {
    let (tx, rx) = std::sync::mpsc::channel();

    let worker = std::thread::Builder::new()
        .name("worker".to_string())
        .spawn(move || {
            let looper = Looper::prepare().unwrap();
            tx.send(looper.handler()).unwrap();
            looper.run().unwrap();
        })
        .unwrap();

    let handler = rx.recv().unwrap();
    assert!(!handler.is_on_looper_thread());
    assert!(handler.looper().name().starts_with("worker#"));

    let (done_tx, done_rx) = std::sync::mpsc::channel();
    handler
        .post_delayed(
            move || done_tx.send(std::thread::current().name().map(String::from)).unwrap(),
            Duration::from_millis(10),
        )
        .unwrap();

    let ran_on = done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(ran_on.as_deref(), Some("worker"));

    let looper = handler.looper().clone();
    handler.post(move || looper.quit()).unwrap();
    worker.join().unwrap();
}
