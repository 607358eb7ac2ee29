//! Configuration validation.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::schema::Config;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// The warnings when valid, otherwise the first error.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_system(config, &mut result);
        Self::validate_logging(config, &mut result);
        Self::validate_services(config, &mut result);
        Self::validate_packages(config, &mut result);

        Ok(result)
    }

    fn validate_system(config: &Config, result: &mut ValidationResult) {
        let system = &config.system;
        if system.home_package.is_empty() {
            result.add_error(ValidationError::new(
                "system.home_package",
                "Home package cannot be empty",
            ));
        }
        if system.home_activity.is_empty() {
            result.add_error(ValidationError::new(
                "system.home_activity",
                "Home activity cannot be empty",
            ));
        }

        if system.await_ready_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "system.await_ready_timeout_ms",
                "await_ready_timeout_ms must be greater than 0",
            ));
        } else if system.await_ready_timeout_ms > 60_000 {
            result.add_warning(ValidationWarning::new(
                "system.await_ready_timeout_ms",
                "await_ready_timeout_ms is very high (>60s), startup failures will be slow to surface",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            result.add_error(ValidationError::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', valid values: {:?}",
                    config.logging.level, LOG_LEVELS
                ),
            ));
        }
    }

    fn validate_services(config: &Config, result: &mut ValidationResult) {
        let llm = &config.services.llm;
        if llm.enabled && llm.model.trim().is_empty() {
            result.add_warning(ValidationWarning::new(
                "services.llm.model",
                "Language model service is enabled without a model, it will not start",
            ));
        }
    }

    fn validate_packages(config: &Config, result: &mut ValidationResult) {
        let mut seen = HashSet::new();

        for (i, manifest) in config.packages.iter().enumerate() {
            let package = &manifest.application.package_name;
            let path = format!("packages[{}]", i);

            if package.is_empty() {
                result.add_error(ValidationError::new(
                    format!("{}.package_name", path),
                    "Package name cannot be empty",
                ));
                continue;
            }
            if package.contains('/') {
                result.add_error(ValidationError::new(
                    format!("{}.package_name", path),
                    format!("Package name '{}' cannot contain '/'", package),
                ));
            }
            if !seen.insert(package.as_str()) {
                result.add_warning(ValidationWarning::new(
                    &path,
                    format!("Package '{}' is declared more than once, the last one wins", package),
                ));
            }
            if *package == config.system.home_package {
                result.add_warning(ValidationWarning::new(
                    &path,
                    format!("Package '{}' replaces the home package", package),
                ));
            }

            let mut activities = HashSet::new();
            for (j, activity) in manifest.activities.iter().enumerate() {
                let activity_path = format!("{}.activities[{}]", path, j);
                if activity.name.is_empty() || activity.name.contains('/') {
                    result.add_error(ValidationError::new(
                        format!("{}.name", activity_path),
                        "Activity name must be non-empty and cannot contain '/'",
                    ));
                }
                if activity.package_name != *package {
                    result.add_error(ValidationError::new(
                        format!("{}.package_name", activity_path),
                        format!("Activity declared in '{}' names another package", package),
                    ));
                }
                if !activities.insert(activity.name.as_str()) {
                    result.add_warning(ValidationWarning::new(
                        activity_path,
                        format!("Activity '{}' is declared more than once", activity.name),
                    ));
                }
            }

            for (j, service) in manifest.services.iter().enumerate() {
                if service.name.is_empty() {
                    result.add_error(ValidationError::new(
                        format!("{}.services[{}].name", path, j),
                        "Service name cannot be empty",
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
