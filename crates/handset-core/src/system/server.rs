//! System server: runs bootstrap phases on a dedicated thread.
//!
//! Phases run in order on the `system-server` thread:
//!
//! 1. **Bootstrap**: package registry (with configured manifests), activity manager
//! 2. **Core**: window manager
//! 3. **Other**: optional services; failures are logged and skipped
//! 4. **Ready**: system-ready flag, `system_ready()` fan-out, home launch
//!
//! Each registration in phases 1-3 counts down the [`ReadinessBarrier`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use handset_protocols::{services, PackageManifest};
use handset_runloop::{panic_message, Handler, Looper};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::barrier::ReadinessBarrier;
use crate::activity::ActivityManager;
use crate::error::{PhaseError, ServiceError, SystemServerError};
use crate::llm::LanguageModelService;
use crate::package::{default_home_manifest, PackageRegistry};
use crate::process::ProcessState;
use crate::service::{LocalBinder, LocalInterface, ServiceHandle};
use crate::window::WindowManager;

/// Services that are always started.
const CORE_SERVICE_COUNT: usize = 3;

/// Bootstrap phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootPhase {
    Bootstrap,
    Core,
    Other,
    Ready,
}

impl std::fmt::Display for BootPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BootPhase::Bootstrap => "bootstrap",
            BootPhase::Core => "core",
            BootPhase::Other => "other",
            BootPhase::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// What to boot.
#[derive(Debug, Clone)]
pub struct SystemServerConfig {
    /// Home package, registered as a system package.
    pub home: PackageManifest,
    /// Manifests installed during bootstrap.
    pub packages: Vec<PackageManifest>,
    /// Model name of the language model service, when enabled.
    pub language_model: Option<String>,
}

impl Default for SystemServerConfig {
    fn default() -> Self {
        Self {
            home: default_home_manifest(),
            packages: Vec::new(),
            language_model: None,
        }
    }
}

/// The always-on services, handed to optional service factories.
#[derive(Clone)]
pub struct SystemServices {
    pub packages: Arc<PackageRegistry>,
    pub activity: Arc<ActivityManager>,
    pub window: Arc<WindowManager>,
}

type ServiceFactory =
    Box<dyn FnOnce(&SystemServices) -> Result<Arc<dyn ServiceHandle>, ServiceError> + Send>;

/// A service started in the "other" phase. Failure does not abort boot.
pub struct OptionalService {
    name: String,
    factory: ServiceFactory,
}

impl OptionalService {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce(&SystemServices) -> Result<Arc<dyn ServiceHandle>, ServiceError> + Send + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(factory),
        }
    }

    /// The `"llm"` service for `model`.
    pub fn language_model(model: impl Into<String>) -> Self {
        let model = model.into();
        Self::new(services::LLM, move |_| {
            let service = LanguageModelService::new(model)?;
            Ok(LocalBinder::new(LocalInterface::LanguageModel(Arc::new(service))).into_handle())
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for [`SystemServer`].
#[derive(Default)]
pub struct SystemServerBuilder {
    process: Option<Arc<ProcessState>>,
    main: Option<Handler>,
    config: SystemServerConfig,
    optional: Vec<OptionalService>,
}

impl SystemServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process state to register into. Default: [`ProcessState::global`].
    pub fn process(mut self, process: Arc<ProcessState>) -> Self {
        self.process = Some(process);
        self
    }

    /// Handler lifecycle events are delivered on. Default: the main looper.
    pub fn main_handler(mut self, handler: Handler) -> Self {
        self.main = Some(handler);
        self
    }

    pub fn config(mut self, config: SystemServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn optional_service(mut self, service: OptionalService) -> Self {
        self.optional.push(service);
        self
    }

    pub fn build(self) -> Result<Arc<SystemServer>, SystemServerError> {
        let main = match self.main {
            Some(handler) => handler,
            None => Handler::main()?,
        };

        let mut optional = Vec::with_capacity(self.optional.len() + 1);
        if let Some(model) = &self.config.language_model {
            optional.push(OptionalService::language_model(model.clone()));
        }
        optional.extend(self.optional);

        let expected = CORE_SERVICE_COUNT + optional.len();
        debug!("System server expects {} services", expected);

        Ok(Arc::new(SystemServer {
            process: self.process.unwrap_or_else(ProcessState::global),
            main,
            config: self.config,
            optional: Mutex::new(optional),
            barrier: ReadinessBarrier::new(expected),
            started: AtomicBool::new(false),
            services: Mutex::new(None),
        }))
    }
}

/// Boots the system services and launches home.
pub struct SystemServer {
    process: Arc<ProcessState>,
    main: Handler,
    config: SystemServerConfig,
    optional: Mutex<Vec<OptionalService>>,
    barrier: ReadinessBarrier,
    started: AtomicBool,
    services: Mutex<Option<SystemServices>>,
}

impl SystemServer {
    pub fn builder() -> SystemServerBuilder {
        SystemServerBuilder::new()
    }

    /// Boot on the `system-server` thread and wait for it to finish.
    pub fn run(self: &Arc<Self>) -> Result<(), SystemServerError> {
        self.start()?
            .join()
            .map_err(|_| SystemServerError::WorkerLost)?
    }

    /// Boot on the `system-server` thread without waiting.
    pub fn start(
        self: &Arc<Self>,
    ) -> Result<JoinHandle<Result<(), SystemServerError>>, SystemServerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SystemServerError::AlreadyStarted);
        }
        let server = self.clone();
        thread::Builder::new()
            .name("system-server".to_string())
            .spawn(move || server.boot())
            .map_err(|e| SystemServerError::Spawn(e.to_string()))
    }

    /// Block until every expected service is registered or `timeout`
    /// elapses. Must not be called from a looper thread.
    pub fn await_ready(&self, timeout: Duration) -> bool {
        if let Some(looper) = Looper::my_looper() {
            warn!("await_ready called on looper thread {}", looper.name());
        }
        self.barrier.wait(timeout)
    }

    pub fn barrier(&self) -> &ReadinessBarrier {
        &self.barrier
    }

    pub fn process(&self) -> &Arc<ProcessState> {
        &self.process
    }

    pub fn main_handler(&self) -> &Handler {
        &self.main
    }

    /// The always-on services, once the core phase has completed.
    pub fn services(&self) -> Option<SystemServices> {
        self.services.lock().clone()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn is_system_ready(&self) -> bool {
        self.process.is_system_ready()
    }

    // ========================================================================
    // Phases
    // ========================================================================

    fn boot(&self) -> Result<(), SystemServerError> {
        let started = Instant::now();
        info!("System server starting");

        let (packages, activity) =
            self.phase(BootPhase::Bootstrap, || self.start_bootstrap_services())?;
        let window = self.phase(BootPhase::Core, || self.start_core_services(&activity))?;

        let services = SystemServices {
            packages,
            activity,
            window,
        };
        *self.services.lock() = Some(services.clone());

        self.phase(BootPhase::Other, || self.start_other_services(&services))?;
        self.phase(BootPhase::Ready, || self.system_ready(&services))?;

        info!(
            "System server ready in {:?}: {:?}",
            started.elapsed(),
            self.process.services().list_services()
        );
        Ok(())
    }

    fn phase<T>(
        &self,
        phase: BootPhase,
        run: impl FnOnce() -> Result<T, PhaseError>,
    ) -> Result<T, SystemServerError> {
        debug!("Entering {} phase", phase);
        let source = match panic::catch_unwind(AssertUnwindSafe(run)) {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(payload) => PhaseError::Panicked(panic_message(payload.as_ref())),
        };
        error!("System server {} phase failed: {}", phase, source);
        Err(SystemServerError::StartupFailed { phase, source })
    }

    fn register(&self, name: &str, interface: LocalInterface) {
        self.process
            .services()
            .add_service(name, LocalBinder::new(interface).into_handle());
        self.barrier.count_down();
    }

    fn start_bootstrap_services(
        &self,
    ) -> Result<(Arc<PackageRegistry>, Arc<ActivityManager>), PhaseError> {
        let packages = Arc::new(PackageRegistry::with_home(self.config.home.clone()));
        for manifest in &self.config.packages {
            packages.install(manifest.clone());
        }
        self.register(services::PACKAGE, LocalInterface::Package(packages.clone()));

        let activity = ActivityManager::new(packages.clone(), self.main.clone());
        self.register(services::ACTIVITY, LocalInterface::Activity(activity.clone()));
        Ok((packages, activity))
    }

    fn start_core_services(
        &self,
        activity: &Arc<ActivityManager>,
    ) -> Result<Arc<WindowManager>, PhaseError> {
        let window = WindowManager::new(activity.clone());
        self.register(services::WINDOW, LocalInterface::Window(window.clone()));
        Ok(window)
    }

    fn start_other_services(&self, system: &SystemServices) -> Result<(), PhaseError> {
        let optional = std::mem::take(&mut *self.optional.lock());
        for OptionalService { name, factory } in optional {
            match panic::catch_unwind(AssertUnwindSafe(move || factory(system))) {
                Ok(Ok(handle)) => self.process.services().add_service(name, handle),
                Ok(Err(e)) => warn!("Optional service {} not started: {}", name, e),
                Err(payload) => warn!(
                    "Optional service {} panicked: {}",
                    name,
                    panic_message(payload.as_ref())
                ),
            }
            self.barrier.count_down();
        }
        Ok(())
    }

    fn system_ready(&self, system: &SystemServices) -> Result<(), PhaseError> {
        self.process.mark_system_ready();
        for (name, handle) in self.process.services().handles() {
            debug!("system_ready -> {}", name);
            handle.system_ready();
        }

        let home = system.activity.start_home_activity()?;
        info!("Home activity launched as {}", home);
        Ok(())
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
