//! # Handset Core
//!
//! System services for the handset architecture.
//!
//! ## Components
//!
//! - [`ServiceRegistry`] - Process-wide name → handle directory with descriptor narrowing
//! - [`PackageRegistry`] - Installed applications, activities, services and action routing
//! - [`ActivityManager`] - Activity tokens, task stack, launch modes, lifecycle delivery
//! - [`WindowManager`] - Peer service tracking one window per live activity
//! - [`SystemServer`] - Phased bootstrap with a readiness barrier
//! - [`Context`] - Per-component facade for service lookup and launches
//! - [`ProcessState`] - Process-scoped registry and system-ready flag
//!
//! ## Threading
//!
//! Lifecycle callbacks are delivered on the main looper. Bootstrap runs on a
//! dedicated `system-server` thread that only reaches the main looper by
//! posting through a [`Handler`](handset_runloop::Handler).

pub mod activity;
pub mod context;
pub mod error;
pub mod llm;
pub mod package;
pub mod process;
pub mod service;
pub mod system;
pub mod window;

pub use activity::{ActivityEvent, ActivityManager, ActivitySnapshot, LifecycleCallback};
pub use context::{Context, LaunchFailureHook};
pub use error::{ActivityError, ContextError, PhaseError, ServiceError, SystemServerError};
pub use llm::LanguageModelService;
pub use package::PackageRegistry;
pub use process::ProcessState;
pub use service::{
    Interface, LocalBinder, LocalInterface, ServiceHandle, ServiceRegistry, SystemService,
};
pub use system::{
    BootPhase, OptionalService, ReadinessBarrier, SystemServer, SystemServerBuilder,
    SystemServerConfig, SystemServices,
};
pub use window::{WindowInfo, WindowManager};
