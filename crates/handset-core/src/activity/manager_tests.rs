use super::*;
use std::sync::atomic::AtomicUsize;

use handset_protocols::{ActivityInfo, ApplicationInfo, PackageManifest};
use handset_runloop::Looper;

use crate::package::{DEFAULT_HOME_ACTIVITY, DEFAULT_HOME_PACKAGE};

const APP: &str = "com.test.app";

type EventLog = Arc<Mutex<Vec<(ActivityToken, LifecycleEvent)>>>;

struct Harness {
    looper: Arc<Looper>,
    am: Arc<ActivityManager>,
    events: EventLog,
}

impl Harness {
    fn new() -> Self {
        Self::with_packages(Arc::new(PackageRegistry::new()))
    }

    fn with_packages(packages: Arc<PackageRegistry>) -> Self {
        let looper = Looper::prepare().unwrap();
        packages.install(
            PackageManifest::new(ApplicationInfo::new(APP, "Test"))
                .with_activity(ActivityInfo::new("", "Main", "Main").launcher())
                .with_activity(
                    ActivityInfo::new("", "Detail", "Detail").with_launch_mode(LaunchMode::SingleTop),
                )
                .with_activity(
                    ActivityInfo::new("", "Hub", "Hub").with_launch_mode(LaunchMode::SingleTask),
                )
                .with_activity(ActivityInfo::new("", "Other", "Other")),
        );
        let am = ActivityManager::new(packages, looper.handler());
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        am.on_any_lifecycle(move |e| sink.lock().push((e.token, e.event)));
        Self { looper, am, events }
    }

    fn start(&self, activity: &str) -> ActivityToken {
        self.am
            .start_activity(APP, activity, IntentFlags::NONE)
            .unwrap()
    }

    fn settle(&self) {
        self.looper.run_until_idle().unwrap();
    }

    fn events_for(&self, token: ActivityToken) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .iter()
            .filter(|(t, _)| *t == token)
            .map(|(_, e)| *e)
            .collect()
    }

    fn stack(&self) -> Vec<ActivityToken> {
        self.am.task_stack().into_iter().map(|s| s.token).collect()
    }
}

use LifecycleEvent::{Create, Destroy, NewIntent, Pause, Resume, Start, Stop};

#[test]
fn test_unresolvable_launch_creates_nothing() {
    let h = Harness::new();
    assert!(h.am.start_activity(APP, "Missing", IntentFlags::NONE).is_none());
    assert!(h.am.start_activity("com.nope", "Main", IntentFlags::NONE).is_none());
    assert!(h.am.start_activity_with_intent(Intent::with_action(actions::MAIN)).is_none());
    assert_eq!(h.am.record_count(), 0);
    h.settle();
    assert!(h.events.lock().is_empty());
}

#[test]
fn test_standard_launch_reaches_resumed() {
    let h = Harness::new();
    let token = h.start("Main");

    // Resolution is synchronous, delivery is not.
    assert_eq!(h.am.activity_state(token), Some(LifecycleState::Initializing));
    assert_eq!(h.stack(), vec![token]);

    h.settle();
    assert_eq!(h.events_for(token), vec![Create, Start, Resume]);
    assert_eq!(h.am.activity_state(token), Some(LifecycleState::Resumed));
    assert_eq!(h.am.resumed_activity(), Some(token));
}

#[test]
fn test_standard_launch_twice_creates_two_records() {
    let h = Harness::new();
    let first = h.start("Main");
    h.settle();
    let second = h.start("Main");
    h.settle();

    assert_ne!(first, second);
    assert_eq!(h.stack(), vec![first, second]);
    assert_eq!(h.events_for(first), vec![Create, Start, Resume, Pause, Stop]);
    assert_eq!(h.events_for(second), vec![Create, Start, Resume]);
    assert_eq!(h.am.resumed_activity(), Some(second));
}

#[test]
fn test_single_top_reuses_top_and_delivers_new_intent() {
    let h = Harness::new();
    let seen_extra = Arc::new(AtomicUsize::new(0));
    let seen = seen_extra.clone();
    h.am.on_lifecycle(NewIntent, move |e| {
        seen.store(e.intent.get_int_extra("page", 0) as usize, Ordering::SeqCst);
    });

    let first = h.start("Detail");
    h.settle();
    let again = h
        .am
        .start_activity_with_intent(Intent::explicit(APP, "Detail").put_int_extra("page", 3))
        .unwrap();
    h.settle();

    assert_eq!(first, again);
    assert_eq!(h.am.record_count(), 1);
    assert_eq!(h.events_for(first), vec![Create, Start, Resume, NewIntent]);
    assert_eq!(seen_extra.load(Ordering::SeqCst), 3);
}

#[test]
fn test_single_top_not_on_top_creates_new_record() {
    let h = Harness::new();
    let detail = h.start("Detail");
    let other = h.start("Other");
    let detail2 = h.start("Detail");
    h.settle();

    assert_ne!(detail, detail2);
    assert_eq!(h.stack(), vec![detail, other, detail2]);
}

#[test]
fn test_single_top_flag_on_standard_activity() {
    let h = Harness::new();
    let first = h.start("Main");
    let again = h
        .am
        .start_activity(APP, "Main", IntentFlags::SINGLE_TOP)
        .unwrap();
    h.settle();

    assert_eq!(first, again);
    assert_eq!(h.am.record_count(), 1);
    assert!(h.events_for(first).contains(&NewIntent));
}

#[test]
fn test_single_task_collapses_stack() {
    let h = Harness::new();
    let a = h.start("Hub");
    h.settle();
    let b = h.start("Main");
    h.settle();
    let c = h.start("Other");
    h.settle();
    assert_eq!(h.stack(), vec![a, b, c]);

    let again = h.start("Hub");
    assert_eq!(again, a);
    // Stack edits are visible before any delivery.
    assert_eq!(h.stack(), vec![a]);

    h.settle();
    assert_eq!(h.am.record_count(), 1);
    assert_eq!(h.events_for(b).iter().filter(|e| **e == Destroy).count(), 1);
    assert_eq!(h.events_for(c).iter().filter(|e| **e == Destroy).count(), 1);
    assert_eq!(
        h.events_for(a),
        vec![Create, Start, Resume, Pause, Stop, NewIntent, Start, Resume]
    );
    assert_eq!(h.am.activity_state(a), Some(LifecycleState::Resumed));
}

#[test]
fn test_clear_top_flag_on_standard_activity() {
    let h = Harness::new();
    let a = h.start("Main");
    let _b = h.start("Other");
    let again = h
        .am
        .start_activity(APP, "Main", IntentFlags::CLEAR_TOP)
        .unwrap();
    h.settle();

    assert_eq!(again, a);
    assert_eq!(h.stack(), vec![a]);
    assert_eq!(h.am.record_count(), 1);
}

#[test]
fn test_finish_is_idempotent() {
    let h = Harness::new();
    let token = h.start("Main");
    h.settle();

    assert!(h.am.finish_activity(token));
    assert!(!h.am.finish_activity(token));
    assert!(h.stack().is_empty());
    h.settle();
    assert!(!h.am.finish_activity(token));

    assert_eq!(
        h.events_for(token),
        vec![Create, Start, Resume, Pause, Stop, Destroy]
    );
    assert_eq!(h.am.record_count(), 0);
    assert_eq!(h.am.activity_state(token), None);
}

#[test]
fn test_finish_unknown_token() {
    let h = Harness::new();
    assert!(!h.am.finish_activity(ActivityToken::from_raw(999)));
}

#[test]
fn test_finish_before_delivery_creates_then_destroys() {
    let h = Harness::new();
    let token = h.start("Main");
    assert!(h.am.finish_activity(token));
    h.settle();
    assert_eq!(h.events_for(token), vec![Create, Destroy]);
}

#[test]
fn test_finishing_top_resumes_next() {
    let h = Harness::new();
    let a = h.start("Main");
    let b = h.start("Other");
    h.settle();
    assert_eq!(h.am.activity_state(a), Some(LifecycleState::Stopped));

    h.am.finish_activity(b);
    h.settle();
    assert_eq!(h.am.activity_state(a), Some(LifecycleState::Resumed));
    assert_eq!(h.am.resumed_activity(), Some(a));
    assert_eq!(h.am.top_activity().unwrap().token, a);
}

#[test]
fn test_finishing_below_top_leaves_top_alone() {
    let h = Harness::new();
    let a = h.start("Main");
    let b = h.start("Other");
    h.settle();
    let before = h.events_for(b).len();

    h.am.finish_activity(a);
    h.settle();
    assert_eq!(h.events_for(b).len(), before);
    assert_eq!(h.stack(), vec![b]);
}

#[test]
fn test_start_home_activity() {
    let h = Harness::new();
    let token = h.am.start_home_activity().unwrap();
    h.settle();

    let top = h.am.top_activity().unwrap();
    assert_eq!(top.token, token);
    assert!(top.component.matches(DEFAULT_HOME_PACKAGE, DEFAULT_HOME_ACTIVITY));
    assert_eq!(top.state, LifecycleState::Resumed);
}

#[test]
fn test_start_home_without_home_activity() {
    let packages = Arc::new(PackageRegistry::with_home(PackageManifest::new(
        ApplicationInfo::new("com.bare", "Bare"),
    )));
    let h = Harness::with_packages(packages);
    assert_eq!(
        h.am.start_home_activity().unwrap_err(),
        ActivityError::NoHomeActivity
    );
    assert_eq!(h.am.record_count(), 0);
}

#[test]
fn test_on_lifecycle_filters_by_event() {
    let h = Harness::new();
    let resumed = Arc::new(Mutex::new(Vec::new()));
    let sink = resumed.clone();
    h.am.on_lifecycle(Resume, move |e| sink.lock().push(e.token));

    let main = h.start("Main");
    h.settle();
    let other = h.start("Other");
    h.settle();
    assert_eq!(*resumed.lock(), vec![main, other]);
}

#[test]
fn test_covered_before_delivery_never_resumes() {
    let h = Harness::new();
    let resumed = Arc::new(Mutex::new(Vec::new()));
    let sink = resumed.clone();
    h.am.on_lifecycle(Resume, move |e| sink.lock().push(e.token));

    let main = h.start("Main");
    let other = h.start("Other");
    h.settle();
    assert_eq!(*resumed.lock(), vec![other]);
    assert_eq!(h.am.activity_state(main), Some(LifecycleState::Stopped));
}

#[test]
fn test_callbacks_may_reenter_manager() {
    let h = Harness::new();
    let am = h.am.clone();
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = observed.clone();
    h.am.on_lifecycle(Create, move |e| {
        sink.lock().push(am.activity_state(e.token));
        // Finish from inside a callback.
        am.finish_activity(e.token);
    });

    let token = h.start("Main");
    h.settle();
    assert_eq!(*observed.lock(), vec![Some(LifecycleState::Created)]);
    assert_eq!(h.events_for(token), vec![Create, Destroy]);
}

#[test]
fn test_panicking_callback_does_not_stall_lifecycle() {
    let h = Harness::new();
    h.am.on_lifecycle(Start, |_| panic!("observer failure"));

    let token = h.start("Main");
    h.settle();
    assert_eq!(h.events_for(token), vec![Create, Start, Resume]);
}

#[test]
fn test_random_operations_keep_sequences_valid() {
    let h = Harness::new();
    let mut seed: u64 = 42;
    let mut next = move || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        (seed >> 33) as usize
    };
    let names = ["Main", "Detail", "Hub", "Other"];
    let mut tokens = Vec::new();

    for _ in 0..120 {
        match next() % 4 {
            0 | 1 => tokens.push(h.start(names[next() % names.len()])),
            2 if !tokens.is_empty() => {
                h.am.finish_activity(tokens[next() % tokens.len()]);
            }
            _ => {
                h.looper.loop_once().unwrap();
            }
        }
    }
    h.settle();

    let events = h.events.lock().clone();
    let mut states: HashMap<ActivityToken, LifecycleState> = HashMap::new();
    for (token, event) in events {
        let state = states.entry(token).or_insert(LifecycleState::Initializing);
        *state = state
            .apply(event)
            .unwrap_or_else(|e| panic!("{} got invalid {}: {}", token, event, e));
    }

    // Everything still on the stack has settled; only the top is resumed.
    let stack = h.am.task_stack();
    if let Some((top, rest)) = stack.split_last() {
        assert_eq!(top.state, LifecycleState::Resumed);
        assert!(rest.iter().all(|s| s.state == LifecycleState::Stopped));
    }
    assert_eq!(h.am.record_count(), stack.len());
}

#[test]
fn test_system_ready_flag() {
    let h = Harness::new();
    assert!(!h.am.is_system_ready());
    h.am.system_ready();
    assert!(h.am.is_system_ready());
}
