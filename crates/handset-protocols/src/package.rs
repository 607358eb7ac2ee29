//! Installed package metadata.

use serde::{Deserialize, Serialize};

use crate::component::ComponentName;

/// Launch-mode policy of an activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    /// Every launch creates a new record.
    #[default]
    Standard,
    /// Reuse the record when it is already on top of the stack.
    SingleTop,
    /// At most one record in the stack; relaunching clears everything above it.
    SingleTask,
}

impl std::fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchMode::Standard => write!(f, "standard"),
            LaunchMode::SingleTop => write!(f, "single_top"),
            LaunchMode::SingleTask => write!(f, "single_task"),
        }
    }
}

/// An installed application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub package_name: String,

    #[serde(default)]
    pub label: String,

    #[serde(default = "default_version_code")]
    pub version_code: u32,

    #[serde(default = "default_version_name")]
    pub version_name: String,

    #[serde(default)]
    pub system: bool,
}

fn default_version_code() -> u32 {
    1
}

fn default_version_name() -> String {
    "1.0".to_string()
}

impl ApplicationInfo {
    /// Create a non-system application at version 1 ("1.0").
    pub fn new(package_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            label: label.into(),
            version_code: default_version_code(),
            version_name: default_version_name(),
            system: false,
        }
    }

    /// Set the version.
    pub fn with_version(mut self, code: u32, name: impl Into<String>) -> Self {
        self.version_code = code;
        self.version_name = name.into();
        self
    }

    /// Mark as a system application.
    pub fn system(mut self) -> Self {
        self.system = true;
        self
    }
}

/// A declared activity. Keyed by `(package_name, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub name: String,

    /// Owning package. Filled in from the enclosing manifest when omitted.
    #[serde(default)]
    pub package_name: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub launch_mode: LaunchMode,

    /// Shown by the launcher / eligible as an entry point.
    #[serde(default)]
    pub launcher: bool,

    #[serde(default)]
    pub actions: Vec<String>,
}

impl ActivityInfo {
    /// Create a standard, non-launcher activity.
    pub fn new(
        package_name: impl Into<String>,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            package_name: package_name.into(),
            label: label.into(),
            launch_mode: LaunchMode::Standard,
            launcher: false,
            actions: Vec::new(),
        }
    }

    pub fn with_launch_mode(mut self, mode: LaunchMode) -> Self {
        self.launch_mode = mode;
        self
    }

    /// Mark as a launcher entry point.
    pub fn launcher(mut self) -> Self {
        self.launcher = true;
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Whether the activity declares `action`.
    pub fn handles_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    /// Component name of this activity.
    pub fn component(&self) -> ComponentName {
        ComponentName::new(&self.package_name, &self.name)
    }
}

/// A declared background service. Keyed by `(package_name, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,

    #[serde(default)]
    pub package_name: String,

    #[serde(default)]
    pub exported: bool,
}

impl ServiceInfo {
    pub fn new(package_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package_name: package_name.into(),
            exported: false,
        }
    }

    /// Component name of this service.
    pub fn component(&self) -> ComponentName {
        ComponentName::new(&self.package_name, &self.name)
    }
}

/// An application together with the components it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    #[serde(flatten)]
    pub application: ApplicationInfo,

    #[serde(default)]
    pub activities: Vec<ActivityInfo>,

    #[serde(default)]
    pub services: Vec<ServiceInfo>,
}

impl PackageManifest {
    /// Create a manifest with no components.
    pub fn new(application: ApplicationInfo) -> Self {
        Self {
            application,
            activities: Vec::new(),
            services: Vec::new(),
        }
    }

    /// Add an activity, assigning it to this package.
    pub fn with_activity(mut self, mut activity: ActivityInfo) -> Self {
        activity.package_name = self.application.package_name.clone();
        self.activities.push(activity);
        self
    }

    /// Add a service, assigning it to this package.
    pub fn with_service(mut self, mut service: ServiceInfo) -> Self {
        service.package_name = self.application.package_name.clone();
        self.services.push(service);
        self
    }

    /// Fill in the owning package of components that omit it.
    pub fn normalized(mut self) -> Self {
        let package = self.application.package_name.clone();
        for activity in &mut self.activities {
            if activity.package_name.is_empty() {
                activity.package_name = package.clone();
            }
        }
        for service in &mut self.services {
            if service.package_name.is_empty() {
                service.package_name = package.clone();
            }
        }
        self
    }
}
