//! Service handles and typed narrowing.
//!
//! A handle advertises one [`Descriptor`]. Callers ask for a capability and
//! get back a [`LocalInterface`] only when the descriptor matches; the
//! [`Interface`] trait then unwraps that union into a concrete `Arc`.

use std::sync::Arc;

use handset_protocols::Descriptor;

use crate::activity::ActivityManager;
use crate::llm::LanguageModelService;
use crate::package::PackageRegistry;
use crate::window::WindowManager;

/// Hook every system service receives once bootstrap completes.
pub trait SystemService: Send + Sync {
    /// Called on the supervisor thread after every service is registered.
    fn system_ready(&self) {}
}

/// Registered service handle.
pub trait ServiceHandle: Send + Sync {
    /// Capability this handle implements.
    fn descriptor(&self) -> Descriptor;

    /// Typed interface when `descriptor` matches, `None` otherwise.
    fn query_local_interface(&self, descriptor: Descriptor) -> Option<LocalInterface>;

    /// Readiness notification. Default: no-op.
    fn system_ready(&self) {}
}

/// Typed union of every in-process service interface.
#[derive(Clone)]
pub enum LocalInterface {
    Activity(Arc<ActivityManager>),
    Window(Arc<WindowManager>),
    Package(Arc<PackageRegistry>),
    LanguageModel(Arc<LanguageModelService>),
}

impl LocalInterface {
    /// Descriptor of the wrapped service.
    pub fn descriptor(&self) -> Descriptor {
        match self {
            LocalInterface::Activity(_) => Descriptor::ActivityManager,
            LocalInterface::Window(_) => Descriptor::WindowManager,
            LocalInterface::Package(_) => Descriptor::PackageManager,
            LocalInterface::LanguageModel(_) => Descriptor::LanguageModel,
        }
    }

    fn as_system_service(&self) -> &dyn SystemService {
        match self {
            LocalInterface::Activity(s) => s.as_ref(),
            LocalInterface::Window(s) => s.as_ref(),
            LocalInterface::Package(s) => s.as_ref(),
            LocalInterface::LanguageModel(s) => s.as_ref(),
        }
    }

    /// Narrow to a concrete interface.
    pub fn narrow<I: Interface>(self) -> Option<I> {
        I::from_local(self)
    }
}

impl std::fmt::Debug for LocalInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LocalInterface")
            .field(&self.descriptor())
            .finish()
    }
}

/// In-process handle wrapping a [`LocalInterface`].
#[derive(Clone, Debug)]
pub struct LocalBinder {
    interface: LocalInterface,
}

impl LocalBinder {
    pub fn new(interface: LocalInterface) -> Self {
        Self { interface }
    }

    /// Boxed as a registry handle.
    pub fn into_handle(self) -> Arc<dyn ServiceHandle> {
        Arc::new(self)
    }
}

impl ServiceHandle for LocalBinder {
    fn descriptor(&self) -> Descriptor {
        self.interface.descriptor()
    }

    fn query_local_interface(&self, descriptor: Descriptor) -> Option<LocalInterface> {
        (self.interface.descriptor() == descriptor).then(|| self.interface.clone())
    }

    fn system_ready(&self) {
        self.interface.as_system_service().system_ready();
    }
}

/// A concrete interface reachable through a [`LocalInterface`].
pub trait Interface: Sized {
    /// Descriptor requested when narrowing.
    const DESCRIPTOR: Descriptor;

    fn from_local(local: LocalInterface) -> Option<Self>;
}

macro_rules! impl_interface {
    ($ty:ty, $descriptor:expr, $variant:ident) => {
        impl Interface for Arc<$ty> {
            const DESCRIPTOR: Descriptor = $descriptor;

            fn from_local(local: LocalInterface) -> Option<Self> {
                match local {
                    LocalInterface::$variant(service) => Some(service),
                    _ => None,
                }
            }
        }
    };
}

impl_interface!(ActivityManager, Descriptor::ActivityManager, Activity);
impl_interface!(WindowManager, Descriptor::WindowManager, Window);
impl_interface!(PackageRegistry, Descriptor::PackageManager, Package);
impl_interface!(LanguageModelService, Descriptor::LanguageModel, LanguageModel);
