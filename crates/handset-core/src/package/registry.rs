//! In-memory package registry.

use std::sync::atomic::{AtomicBool, Ordering};

use handset_protocols::{
    actions, ActivityInfo, ApplicationInfo, LaunchMode, PackageManifest, ServiceInfo,
};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::service::SystemService;

/// Package name of the built-in launcher.
pub const DEFAULT_HOME_PACKAGE: &str = "com.handset.launcher";

/// Launcher activity of the built-in launcher.
pub const DEFAULT_HOME_ACTIVITY: &str = "LauncherActivity";

/// Manifest of the built-in launcher package.
pub fn default_home_manifest() -> PackageManifest {
    PackageManifest::new(ApplicationInfo::new(DEFAULT_HOME_PACKAGE, "Launcher").system())
        .with_activity(
            ActivityInfo::new(DEFAULT_HOME_PACKAGE, DEFAULT_HOME_ACTIVITY, "Home")
                .with_launch_mode(LaunchMode::SingleTask)
                .launcher()
                .with_action(actions::MAIN),
        )
}

#[derive(Default)]
struct PackageTables {
    applications: Vec<ApplicationInfo>,
    activities: Vec<ActivityInfo>,
    services: Vec<ServiceInfo>,
}

/// Upsert `item` into `items`, replacing in place when `same` matches.
/// Returns whether an existing entry was replaced.
fn upsert<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T) -> bool) -> bool {
    match items.iter_mut().find(|existing| same(existing)) {
        Some(slot) => {
            *slot = item;
            true
        }
        None => {
            items.push(item);
            false
        }
    }
}

/// Installed applications, activities and services.
///
/// Entries are kept in registration order. Re-registering a key replaces the
/// entry in place.
pub struct PackageRegistry {
    tables: RwLock<PackageTables>,
    ready: AtomicBool,
}

impl PackageRegistry {
    /// Registry with the built-in launcher pre-installed.
    pub fn new() -> Self {
        Self::with_home(default_home_manifest())
    }

    /// Registry with `home` pre-installed as a system package.
    pub fn with_home(mut home: PackageManifest) -> Self {
        home.application.system = true;
        let registry = Self {
            tables: RwLock::new(PackageTables::default()),
            ready: AtomicBool::new(false),
        };
        registry.install(home);
        registry
    }

    // ========================================================================
    // Registration
    // ========================================================================

    pub fn register_application(&self, info: ApplicationInfo) {
        let package = info.package_name.clone();
        let replaced = upsert(&mut self.tables.write().applications, info, |a| {
            a.package_name == package
        });
        debug!(
            "Application {}: {}",
            if replaced { "updated" } else { "registered" },
            package
        );
    }

    pub fn register_activity(&self, info: ActivityInfo) {
        let (package, name) = (info.package_name.clone(), info.name.clone());
        let replaced = upsert(&mut self.tables.write().activities, info, |a| {
            a.package_name == package && a.name == name
        });
        debug!(
            "Activity {}: {}/{}",
            if replaced { "updated" } else { "registered" },
            package,
            name
        );
    }

    pub fn register_service(&self, info: ServiceInfo) {
        let (package, name) = (info.package_name.clone(), info.name.clone());
        upsert(&mut self.tables.write().services, info, |s| {
            s.package_name == package && s.name == name
        });
        debug!("Service component registered: {}/{}", package, name);
    }

    /// Register an application together with its declared components.
    pub fn install(&self, manifest: PackageManifest) {
        let manifest = manifest.normalized();
        let package = manifest.application.package_name.clone();
        let (activities, services) = (manifest.activities.len(), manifest.services.len());

        self.register_application(manifest.application);
        for activity in manifest.activities {
            self.register_activity(activity);
        }
        for service in manifest.services {
            self.register_service(service);
        }
        info!(
            "Installed package {} ({} activities, {} services)",
            package, activities, services
        );
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get_application_info(&self, package_name: &str) -> Option<ApplicationInfo> {
        self.tables
            .read()
            .applications
            .iter()
            .find(|a| a.package_name == package_name)
            .cloned()
    }

    /// All applications, in registration order.
    pub fn get_installed_applications(&self) -> Vec<ApplicationInfo> {
        self.tables.read().applications.clone()
    }

    pub fn is_package_installed(&self, package_name: &str) -> bool {
        self.tables
            .read()
            .applications
            .iter()
            .any(|a| a.package_name == package_name)
    }

    pub fn get_activity_info(&self, package_name: &str, name: &str) -> Option<ActivityInfo> {
        self.tables
            .read()
            .activities
            .iter()
            .find(|a| a.package_name == package_name && a.name == name)
            .cloned()
    }

    pub fn get_activities_for_package(&self, package_name: &str) -> Vec<ActivityInfo> {
        self.tables
            .read()
            .activities
            .iter()
            .filter(|a| a.package_name == package_name)
            .cloned()
            .collect()
    }

    /// Activities flagged as launcher entry points.
    pub fn get_launcher_activities(&self) -> Vec<ActivityInfo> {
        self.tables
            .read()
            .activities
            .iter()
            .filter(|a| a.launcher)
            .cloned()
            .collect()
    }

    /// Launcher activities that declare `action`.
    pub fn query_activities_for_action(&self, action: &str) -> Vec<ActivityInfo> {
        self.tables
            .read()
            .activities
            .iter()
            .filter(|a| a.launcher && a.handles_action(action))
            .cloned()
            .collect()
    }

    pub fn get_service_info(&self, package_name: &str, name: &str) -> Option<ServiceInfo> {
        self.tables
            .read()
            .services
            .iter()
            .find(|s| s.package_name == package_name && s.name == name)
            .cloned()
    }

    /// First launcher activity belonging to a system application.
    pub fn home_activity(&self) -> Option<ActivityInfo> {
        let tables = self.tables.read();
        tables
            .activities
            .iter()
            .filter(|a| a.launcher)
            .find(|a| {
                tables
                    .applications
                    .iter()
                    .any(|app| app.package_name == a.package_name && app.system)
            })
            .cloned()
    }

    pub fn activity_count(&self) -> usize {
        self.tables.read().activities.len()
    }

    pub fn application_count(&self) -> usize {
        self.tables.read().applications.len()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl Default for PackageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemService for PackageRegistry {
    fn system_ready(&self) {
        self.ready.store(true, Ordering::Release);
        info!(
            "Package registry ready: {} applications, {} activities",
            self.application_count(),
            self.activity_count()
        );
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
