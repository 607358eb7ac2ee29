//! Error types for the handset protocol layer.

mod intent;
mod lifecycle;

pub use intent::*;
pub use lifecycle::*;
