use super::*;
use std::sync::atomic::AtomicU32;

use parking_lot::Mutex as TestMutex;

/// Serializes tests that touch the process-wide main looper.
static MAIN_GUARD: TestMutex<()> = parking_lot::const_mutex(());

fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Box<dyn FnOnce() + Send>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let make = move |n: u32| {
        let sink = sink.clone();
        Box::new(move || sink.lock().push(n)) as Box<dyn FnOnce() + Send>
    };
    (log, make)
}

#[test]
fn test_prepare_binds_current_thread() {
    let looper = Looper::prepare().unwrap();
    assert!(looper.is_current_thread());
    assert!(!looper.is_main());
    assert!(Arc::ptr_eq(&Looper::my_looper().unwrap(), &looper));
}

#[test]
fn test_prepare_twice_fails() {
    let _looper = Looper::prepare().unwrap();
    let second = Looper::prepare();
    assert!(matches!(second, Err(LooperError::AlreadyPrepared(_))));
}

#[test]
fn test_release_allows_prepare_again() {
    let first = Looper::prepare().unwrap();
    let released = Looper::release().unwrap();
    assert!(Arc::ptr_eq(&first, &released));
    assert!(Looper::my_looper().is_none());
    assert!(Looper::prepare().is_ok());
}

#[test]
fn test_prepare_main_is_idempotent() {
    let _guard = MAIN_GUARD.lock();
    Looper::reset_main();

    let first = Looper::prepare_main().unwrap();
    let second = Looper::prepare_main().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.is_main());
    assert!(Arc::ptr_eq(&Looper::main().unwrap(), &first));

    Looper::reset_main();
}

#[test]
fn test_prepare_main_from_other_thread_returns_existing() {
    let _guard = MAIN_GUARD.lock();
    Looper::reset_main();

    let main = Looper::prepare_main().unwrap();
    let other = std::thread::spawn(|| Looper::prepare_main().unwrap())
        .join()
        .unwrap();
    assert!(Arc::ptr_eq(&main, &other));

    Looper::reset_main();
}

#[test]
fn test_main_not_prepared() {
    let _guard = MAIN_GUARD.lock();
    Looper::reset_main();
    assert_eq!(Looper::main().unwrap_err(), LooperError::NotPrepared);
}

#[test]
fn test_reset_main_releases_thread_binding() {
    let _guard = MAIN_GUARD.lock();
    Looper::reset_main();

    let main = Looper::prepare_main().unwrap();
    Looper::reset_main();
    assert!(main.is_quitting());
    assert!(Looper::my_looper().is_none());
    assert!(Looper::main().is_err());
}

#[test]
fn test_post_runs_fifo() {
    let looper = Looper::prepare().unwrap();
    let handler = looper.handler();
    let (log, make) = recorder();

    for n in 0..5 {
        handler.post(make(n)).unwrap();
    }
    assert_eq!(looper.run_until_idle().unwrap(), 5);
    assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_delayed_tasks_run_after_due() {
    let looper = Looper::prepare().unwrap();
    let handler = looper.handler();
    let (log, make) = recorder();

    handler.post_delayed(make(2), Duration::from_millis(150)).unwrap();
    handler.post_delayed(make(1), Duration::from_millis(75)).unwrap();
    handler.post(make(0)).unwrap();

    assert_eq!(looper.run_until_idle().unwrap(), 1);
    assert_eq!(*log.lock(), vec![0]);

    looper.run_for(Duration::from_millis(400)).unwrap();
    assert_eq!(*log.lock(), vec![0, 1, 2]);
}

#[test]
fn test_tasks_posted_by_tasks_run_in_same_drain() {
    let looper = Looper::prepare().unwrap();
    let handler = looper.handler();
    let (log, make) = recorder();

    let inner = handler.clone();
    let second = make(1);
    let first = make(0);
    handler
        .post(move || {
            first();
            inner.post(second).unwrap();
        })
        .unwrap();

    assert_eq!(looper.run_until_idle().unwrap(), 2);
    assert_eq!(*log.lock(), vec![0, 1]);
}

#[test]
fn test_panicking_task_does_not_stop_loop() {
    let looper = Looper::prepare().unwrap();
    let handler = looper.handler();
    let (log, make) = recorder();

    handler.post(make(0)).unwrap();
    handler.post(|| panic!("task failure")).unwrap();
    handler.post(make(1)).unwrap();

    assert_eq!(looper.run_until_idle().unwrap(), 3);
    assert_eq!(*log.lock(), vec![0, 1]);

    let stats = looper.stats();
    assert_eq!(stats.dispatched, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.posted, 3);
}

#[test]
fn test_run_step_on_wrong_thread_fails() {
    let looper = Looper::prepare().unwrap();
    let remote = looper.clone();
    let result = std::thread::spawn(move || remote.run_until_idle())
        .join()
        .unwrap();
    assert!(matches!(result, Err(LooperError::WrongThread { .. })));
}

#[test]
fn test_loop_once_runs_single_task() {
    let looper = Looper::prepare().unwrap();
    let handler = looper.handler();
    let counter = Arc::new(AtomicU32::new(0));

    for _ in 0..2 {
        let c = counter.clone();
        handler
            .post(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
    }

    assert!(looper.loop_once().unwrap());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(looper.pending(), 1);
    assert!(looper.loop_once().unwrap());
    assert!(!looper.loop_once().unwrap());
}

#[test]
fn test_quit_rejects_posts_and_ends_run() {
    let looper = Looper::prepare().unwrap();
    let handler = looper.handler();
    handler.post(|| {}).unwrap();

    let quitter = looper.clone();
    handler.post(move || quitter.quit()).unwrap();
    looper.run().unwrap();

    assert!(looper.is_quitting());
    assert!(matches!(handler.post(|| {}), Err(LooperError::Quitting(_))));
    assert_eq!(looper.stats().rejected, 1);
}

#[test]
fn test_cross_thread_post_wakes_run() {
    let looper = Looper::prepare().unwrap();
    let handler = looper.handler();
    let (log, make) = recorder();

    let remote = handler.clone();
    let quit = looper.clone();
    let task = make(7);
    let producer = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        remote.post(task).unwrap();
        remote.post(move || quit.quit()).unwrap();
    });

    looper.run().unwrap();
    producer.join().unwrap();
    assert_eq!(*log.lock(), vec![7]);
}

#[test]
fn test_handler_for_current_thread() {
    assert!(matches!(
        Handler::for_current_thread(),
        Err(LooperError::NotPrepared)
    ));
    let looper = Looper::prepare().unwrap();
    let handler = Handler::for_current_thread().unwrap();
    assert!(Arc::ptr_eq(handler.looper(), &looper));
    assert!(handler.is_on_looper_thread());
}

#[test]
fn test_panic_message_payloads() {
    let text = panic::catch_unwind::<_, ()>(|| panic!("static text")).unwrap_err();
    assert_eq!(panic_message(text.as_ref()), "static text");

    let formatted = panic::catch_unwind::<_, ()>(|| panic!("code {}", 7)).unwrap_err();
    assert_eq!(panic_message(formatted.as_ref()), "code 7");

    let other = panic::catch_unwind::<_, ()>(|| std::panic::panic_any(42u8)).unwrap_err();
    assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
}
