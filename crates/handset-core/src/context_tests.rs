use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use handset_protocols::{ActivityInfo, ApplicationInfo, IntentError, PackageManifest};
use handset_runloop::Looper;
use parking_lot::Mutex;

use crate::service::LocalBinder;

struct Fixture {
    looper: Arc<Looper>,
    process: Arc<ProcessState>,
    activity: Arc<ActivityManager>,
}

fn fixture() -> Fixture {
    let looper = Looper::prepare().unwrap();
    let process = Arc::new(ProcessState::new());
    let packages = Arc::new(PackageRegistry::new());
    packages.install(
        PackageManifest::new(ApplicationInfo::new("com.ctx", "Ctx"))
            .with_activity(ActivityInfo::new("", "Main", "Main")),
    );
    let activity = ActivityManager::new(packages.clone(), looper.handler());
    let registry = process.services();
    registry.add_service(
        services::PACKAGE,
        LocalBinder::new(LocalInterface::Package(packages)).into_handle(),
    );
    registry.add_service(
        services::ACTIVITY,
        LocalBinder::new(LocalInterface::Activity(activity.clone())).into_handle(),
    );
    Fixture {
        looper,
        process,
        activity,
    }
}

impl Fixture {
    fn context(&self) -> Context {
        Context::new(self.process.clone(), self.looper.handler(), "com.ctx")
    }
}

#[test]
fn test_get_system_service_by_name() {
    let f = fixture();
    let ctx = f.context();

    assert!(matches!(
        ctx.get_system_service(services::ACTIVITY),
        Some(LocalInterface::Activity(_))
    ));
    assert!(ctx.get_system_service(services::WINDOW).is_none());
    assert!(ctx.get_system_service("clipboard").is_none());
    assert!(Arc::ptr_eq(&ctx.activity_manager().unwrap(), &f.activity));
    assert!(ctx.package_manager().is_some());
    assert!(ctx.language_model().is_none());
}

#[test]
fn test_start_activity_success() {
    let f = fixture();
    let token = f
        .context()
        .start_activity(Intent::explicit("com.ctx", "Main"))
        .unwrap();
    f.looper.run_until_idle().unwrap();
    assert_eq!(
        f.activity.activity_state(token),
        Some(handset_protocols::LifecycleState::Resumed)
    );
}

#[test]
fn test_start_activity_failures_invoke_hook_first() {
    let f = fixture();
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = failures.clone();
    let ctx = f.context().with_start_failure_hook(move |intent, err| {
        sink.lock().push((intent.component.clone(), err.to_string()));
    });

    let err = ctx.start_activity(Intent::new()).unwrap_err();
    assert!(matches!(
        err,
        ContextError::InvalidComponent(IntentError::MissingComponent)
    ));

    let err = ctx
        .start_activity(Intent::explicit("com.ctx", "Missing"))
        .unwrap_err();
    assert!(matches!(err, ContextError::ComponentNotFound(_)));

    let failures = failures.lock();
    assert_eq!(failures.len(), 2);
    assert!(failures[0].0.is_none());
    assert!(failures[1].1.contains("com.ctx/Missing"));
    assert_eq!(f.activity.record_count(), 0);
}

#[test]
fn test_start_activity_without_activity_manager() {
    let looper = Looper::prepare().unwrap();
    let hooks = Arc::new(AtomicUsize::new(0));
    let counter = hooks.clone();
    let ctx = Context::new(Arc::new(ProcessState::new()), looper.handler(), "com.ctx")
        .with_start_failure_hook(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    let err = ctx
        .start_activity(Intent::explicit("com.ctx", "Main"))
        .unwrap_err();
    assert!(matches!(err, ContextError::ServiceUnavailable(_)));
    assert_eq!(hooks.load(Ordering::SeqCst), 1);
}

#[test]
fn test_run_on_main_thread_inline_when_on_main() {
    let f = fixture();
    let ran = Arc::new(AtomicUsize::new(0));
    let counter = ran.clone();
    f.context()
        .run_on_main_thread(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert_eq!(f.looper.pending(), 0);
}

#[test]
fn test_run_on_main_thread_posts_from_other_thread() {
    let f = fixture();
    let ctx = f.context();
    let ran = Arc::new(AtomicUsize::new(0));
    let counter = ran.clone();

    std::thread::spawn(move || {
        ctx.run_on_main_thread(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    })
    .join()
    .unwrap();

    assert_eq!(ran.load(Ordering::SeqCst), 0);
    f.looper.run_until_idle().unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn test_post_delayed_runs_on_main() {
    let f = fixture();
    let ran = Arc::new(AtomicUsize::new(0));
    let counter = ran.clone();
    f.context()
        .post_delayed(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            Duration::from_millis(20),
        )
        .unwrap();

    assert_eq!(f.looper.run_until_idle().unwrap(), 0);
    f.looper.run_for(Duration::from_millis(200)).unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn test_finish_activity_through_context() {
    let f = fixture();
    let ctx = f.context();
    let token = ctx.start_activity(Intent::explicit("com.ctx", "Main")).unwrap();
    assert!(ctx.finish_activity(token).unwrap());
    assert!(!ctx.finish_activity(token).unwrap());
}
