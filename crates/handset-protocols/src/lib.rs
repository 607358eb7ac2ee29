//! # Handset Protocols
//!
//! Shared value types for the handset service architecture.
//! Contains only data definitions - no services, no scheduling.
//!
//! ## Core Types
//!
//! - [`ComponentName`] - Explicit `package/class` target of an intent
//! - [`Intent`] - Launch request with action, target, typed extras and flags
//! - [`ApplicationInfo`], [`ActivityInfo`], [`ServiceInfo`] - Package metadata
//! - [`PackageManifest`] - An application together with its components
//! - [`LifecycleState`] / [`LifecycleEvent`] - Activity lifecycle state machine
//! - [`Descriptor`] - Capability descriptors used for service narrowing

pub mod component;
pub mod descriptor;
pub mod error;
pub mod intent;
pub mod lifecycle;
pub mod package;

pub use component::ComponentName;
pub use descriptor::{services, Descriptor};
pub use error::{IntentError, LifecycleError};
pub use intent::{actions, ExtraValue, Intent, IntentFlags};
pub use lifecycle::{ActivityToken, LifecycleEvent, LifecycleState};
pub use package::{ActivityInfo, ApplicationInfo, LaunchMode, PackageManifest, ServiceInfo};
