//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use handset_protocols::{actions, ActivityInfo, ApplicationInfo, LaunchMode, PackageManifest};
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system: SystemConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub services: ServicesConfig,

    /// Manifests installed during bootstrap.
    #[serde(default)]
    pub packages: Vec<PackageManifest>,
}

impl Config {
    /// Manifest of the configured home package: one single-task launcher
    /// activity answering the MAIN action.
    pub fn home_manifest(&self) -> PackageManifest {
        let system = &self.system;
        PackageManifest::new(
            ApplicationInfo::new(&system.home_package, &system.home_label).system(),
        )
        .with_activity(
            ActivityInfo::new(&system.home_package, &system.home_activity, &system.home_label)
                .with_launch_mode(LaunchMode::SingleTask)
                .launcher()
                .with_action(actions::MAIN),
        )
    }

    /// Model name of the language model service, when enabled.
    pub fn language_model(&self) -> Option<String> {
        let llm = &self.services.llm;
        llm.enabled.then(|| llm.model.clone())
    }
}

/// System server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_home_package")]
    pub home_package: String,

    #[serde(default = "default_home_activity")]
    pub home_activity: String,

    #[serde(default = "default_home_label")]
    pub home_label: String,

    /// How long callers wait for the readiness barrier.
    #[serde(default = "default_await_ready_timeout_ms")]
    pub await_ready_timeout_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            home_package: default_home_package(),
            home_activity: default_home_activity(),
            home_label: default_home_label(),
            await_ready_timeout_ms: default_await_ready_timeout_ms(),
        }
    }
}

impl SystemConfig {
    pub fn await_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.await_ready_timeout_ms)
    }
}

fn default_home_package() -> String {
    "com.handset.launcher".to_string()
}

fn default_home_activity() -> String {
    "LauncherActivity".to_string()
}

fn default_home_label() -> String {
    "Launcher".to_string()
}

fn default_await_ready_timeout_ms() -> u64 {
    5000
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level. `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,

    /// Directory for daily rolling log files. Stdout only when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Optional services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Language model service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.system.home_package, "com.handset.launcher");
        assert_eq!(config.system.await_ready_timeout(), Duration::from_secs(5));
        assert_eq!(config.logging.level, "info");
        assert!(config.language_model().is_none());
        assert!(config.packages.is_empty());
    }

    #[test]
    fn test_home_manifest() {
        let mut config = Config::default();
        config.system.home_package = "com.acme.home".to_string();
        config.system.home_activity = "Desk".to_string();

        let manifest = config.home_manifest();
        assert!(manifest.application.system);
        assert_eq!(manifest.activities.len(), 1);
        let activity = &manifest.activities[0];
        assert_eq!(activity.package_name, "com.acme.home");
        assert_eq!(activity.name, "Desk");
        assert!(activity.launcher);
        assert!(activity.handles_action(actions::MAIN));
    }

    #[test]
    fn test_language_model_only_when_enabled() {
        let mut config = Config::default();
        config.services.llm.model = "local-7b".to_string();
        assert!(config.language_model().is_none());
        config.services.llm.enabled = true;
        assert_eq!(config.language_model().as_deref(), Some("local-7b"));
    }
}
