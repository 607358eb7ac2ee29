//! Activity manager: tokens, task stack, launch modes and lifecycle delivery.

mod callbacks;
mod manager;
mod record;

pub use callbacks::{ActivityEvent, LifecycleCallback};
pub use manager::ActivityManager;
pub use record::ActivitySnapshot;
