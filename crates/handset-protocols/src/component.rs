//! Explicit component names.

use serde::{Deserialize, Serialize};

use crate::error::IntentError;

/// Identifies an activity or service by owning package and class name.
///
/// Flattens to `package/class`. When parsing, a class starting with `.`
/// is resolved relative to the package (`pkg/.Main` -> `pkg/pkg.Main`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentName {
    pub package_name: String,
    pub class_name: String,
}

impl ComponentName {
    /// Create a component name.
    pub fn new(package_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            class_name: class_name.into(),
        }
    }

    /// Parse a flattened `package/class` string.
    pub fn unflatten(flat: &str) -> Result<Self, IntentError> {
        let (package, class) = flat
            .split_once('/')
            .ok_or_else(|| IntentError::InvalidComponentName(flat.to_string()))?;

        if package.is_empty() || class.is_empty() || class == "." {
            return Err(IntentError::InvalidComponentName(flat.to_string()));
        }

        let class = match class.strip_prefix('.') {
            Some(rest) => format!("{}.{}", package, rest),
            None => class.to_string(),
        };

        Ok(Self::new(package, class))
    }

    /// Flatten to `package/class`.
    pub fn flatten(&self) -> String {
        format!("{}/{}", self.package_name, self.class_name)
    }

    /// Whether this names the given package and class.
    pub fn matches(&self, package_name: &str, class_name: &str) -> bool {
        self.package_name == package_name && self.class_name == class_name
    }
}

impl std::fmt::Display for ComponentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.package_name, self.class_name)
    }
}

impl std::str::FromStr for ComponentName {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::unflatten(s)
    }
}
