//! Package registry: installed applications and their components.

mod registry;

pub use registry::{default_home_manifest, PackageRegistry, DEFAULT_HOME_ACTIVITY, DEFAULT_HOME_PACKAGE};
