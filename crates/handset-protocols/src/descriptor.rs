//! Capability descriptors and well-known service names.

use serde::{Deserialize, Serialize};

/// Well-known system service names.
pub mod services {
    pub const ACTIVITY: &str = "activity";
    pub const WINDOW: &str = "window";
    pub const PACKAGE: &str = "package";
    pub const LLM: &str = "llm";
}

/// Capability a service handle can be narrowed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Descriptor {
    ActivityManager,
    WindowManager,
    PackageManager,
    LanguageModel,
}

impl Descriptor {
    /// Interface name string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Descriptor::ActivityManager => "handset.app.IActivityManager",
            Descriptor::WindowManager => "handset.view.IWindowManager",
            Descriptor::PackageManager => "handset.content.pm.IPackageManager",
            Descriptor::LanguageModel => "handset.llm.ILanguageModel",
        }
    }

    /// Descriptor a well-known service name is expected to carry.
    pub fn for_service(name: &str) -> Option<Descriptor> {
        match name {
            services::ACTIVITY => Some(Descriptor::ActivityManager),
            services::WINDOW => Some(Descriptor::WindowManager),
            services::PACKAGE => Some(Descriptor::PackageManager),
            services::LLM => Some(Descriptor::LanguageModel),
            _ => None,
        }
    }
}

impl std::fmt::Display for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
