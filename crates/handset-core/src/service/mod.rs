//! Process-wide service directory and capability narrowing.

mod handle;
mod registry;

pub use handle::{Interface, LocalBinder, LocalInterface, ServiceHandle, SystemService};
pub use registry::ServiceRegistry;
