//! Per-component facade over the system services.

use std::sync::Arc;
use std::time::Duration;

use handset_protocols::{services, ActivityToken, Descriptor, Intent};
use handset_runloop::Handler;
use tracing::{debug, warn};

use crate::activity::ActivityManager;
use crate::error::ContextError;
use crate::llm::LanguageModelService;
use crate::package::PackageRegistry;
use crate::process::ProcessState;
use crate::service::{Interface, LocalInterface};
use crate::window::WindowManager;

/// Hook invoked with the failed intent before a launch error is returned.
pub type LaunchFailureHook = Arc<dyn Fn(&Intent, &ContextError) + Send + Sync>;

/// What a component uses to reach system services and the main looper.
#[derive(Clone)]
pub struct Context {
    process: Arc<ProcessState>,
    main: Handler,
    package_name: String,
    on_start_activity_failed: Option<LaunchFailureHook>,
}

impl Context {
    pub fn new(process: Arc<ProcessState>, main: Handler, package_name: impl Into<String>) -> Self {
        Self {
            process,
            main,
            package_name: package_name.into(),
            on_start_activity_failed: None,
        }
    }

    /// Install the launch failure hook.
    pub fn with_start_failure_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Intent, &ContextError) + Send + Sync + 'static,
    {
        self.on_start_activity_failed = Some(Arc::new(hook));
        self
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn main_handler(&self) -> &Handler {
        &self.main
    }

    pub fn process(&self) -> &Arc<ProcessState> {
        &self.process
    }

    // ========================================================================
    // Service lookup
    // ========================================================================

    /// Interface of a well-known service. Unknown names yield `None`.
    pub fn get_system_service(&self, name: &str) -> Option<LocalInterface> {
        let descriptor = Descriptor::for_service(name)?;
        self.process
            .services()
            .get_service(name)?
            .query_local_interface(descriptor)
    }

    /// Look up `name` narrowed to `I`.
    pub fn get_service<I: Interface>(&self, name: &str) -> Option<I> {
        self.process.services().get_interface(name)
    }

    pub fn activity_manager(&self) -> Option<Arc<ActivityManager>> {
        self.get_service(services::ACTIVITY)
    }

    pub fn window_manager(&self) -> Option<Arc<WindowManager>> {
        self.get_service(services::WINDOW)
    }

    pub fn package_manager(&self) -> Option<Arc<PackageRegistry>> {
        self.get_service(services::PACKAGE)
    }

    pub fn language_model(&self) -> Option<Arc<LanguageModelService>> {
        self.get_service(services::LLM)
    }

    // ========================================================================
    // Launching
    // ========================================================================

    /// Launch the explicit target of `intent`.
    pub fn start_activity(&self, intent: Intent) -> Result<ActivityToken, ContextError> {
        self.try_start_activity(&intent).inspect_err(|e| {
            warn!("start_activity from {} failed: {}", self.package_name, e);
            if let Some(hook) = &self.on_start_activity_failed {
                hook(&intent, e);
            }
        })
    }

    fn try_start_activity(&self, intent: &Intent) -> Result<ActivityToken, ContextError> {
        let component = intent.require_component()?.clone();
        let activity = self
            .activity_manager()
            .ok_or_else(|| ContextError::ServiceUnavailable(services::ACTIVITY.to_string()))?;
        activity
            .start_activity_with_intent(intent.clone())
            .ok_or(ContextError::ComponentNotFound(component))
    }

    /// Finish `token`. See [`ActivityManager::finish_activity`].
    pub fn finish_activity(&self, token: ActivityToken) -> Result<bool, ContextError> {
        let activity = self
            .activity_manager()
            .ok_or_else(|| ContextError::ServiceUnavailable(services::ACTIVITY.to_string()))?;
        Ok(activity.finish_activity(token))
    }

    // ========================================================================
    // Main looper
    // ========================================================================

    /// Run `task` on the main looper: inline when already there, posted
    /// otherwise.
    pub fn run_on_main_thread<F>(&self, task: F) -> Result<(), ContextError>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.main.is_on_looper_thread() {
            debug!("run_on_main_thread: running inline");
            task();
            return Ok(());
        }
        self.main.post(task)?;
        Ok(())
    }

    /// Post `task` to the main looper after `delay`.
    pub fn post_delayed<F>(&self, task: F, delay: Duration) -> Result<(), ContextError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.main.post_delayed(task, delay)?;
        Ok(())
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("package_name", &self.package_name)
            .field("main", &self.main)
            .finish()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
