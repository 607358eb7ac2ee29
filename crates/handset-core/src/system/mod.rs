//! Phased bootstrap of the system services.

mod barrier;
mod server;

pub use barrier::ReadinessBarrier;
pub use server::{
    BootPhase, OptionalService, SystemServer, SystemServerBuilder, SystemServerConfig,
    SystemServices,
};
