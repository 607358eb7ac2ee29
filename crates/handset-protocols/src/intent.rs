//! Intents: launch requests carrying a target, typed extras and flags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::component::ComponentName;
use crate::error::IntentError;

/// Well-known intent actions.
pub mod actions {
    /// Entry point of an application.
    pub const MAIN: &str = "handset.intent.action.MAIN";
    /// Open content for viewing.
    pub const VIEW: &str = "handset.intent.action.VIEW";
    /// Share content with another component.
    pub const SEND: &str = "handset.intent.action.SEND";
}

/// Typed extra value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ExtraValue {
    Int(i32),
    Long(i64),
    String(String),
    Bool(bool),
}

impl ExtraValue {
    /// Name of the value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            ExtraValue::Int(_) => "int",
            ExtraValue::Long(_) => "long",
            ExtraValue::String(_) => "string",
            ExtraValue::Bool(_) => "bool",
        }
    }

    /// Parse a command-line style `value`, picking the narrowest type.
    ///
    /// `true`/`false` become bools, integers that fit in `i32` become ints,
    /// larger integers become longs, anything else is a string.
    pub fn parse_loose(raw: &str) -> Self {
        if let Ok(b) = raw.parse::<bool>() {
            return ExtraValue::Bool(b);
        }
        if let Ok(i) = raw.parse::<i32>() {
            return ExtraValue::Int(i);
        }
        if let Ok(l) = raw.parse::<i64>() {
            return ExtraValue::Long(l);
        }
        ExtraValue::String(raw.to_string())
    }
}

impl std::fmt::Display for ExtraValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtraValue::Int(v) => write!(f, "{}", v),
            ExtraValue::Long(v) => write!(f, "{}L", v),
            ExtraValue::String(v) => write!(f, "{:?}", v),
            ExtraValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Intent flag bit set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentFlags(u32);

impl IntentFlags {
    /// No flags.
    pub const NONE: IntentFlags = IntentFlags(0);
    /// Start in a new task. Accepted for compatibility; there is a single task stack.
    pub const NEW_TASK: IntentFlags = IntentFlags(1 << 0);
    /// Reuse the top record when it is the same component.
    pub const SINGLE_TOP: IntentFlags = IntentFlags(1 << 1);
    /// Finish everything above an existing instance and reuse it.
    pub const CLEAR_TOP: IntentFlags = IntentFlags(1 << 2);

    /// Build from raw bits. Unknown bits are kept.
    pub const fn from_bits(bits: u32) -> Self {
        IntentFlags(bits)
    }

    /// Raw bits.
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(&self, other: IntentFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`.
    pub fn insert(&mut self, other: IntentFlags) {
        self.0 |= other.0;
    }

    /// Whether no bit is set.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Parse a flag name as used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "new-task" => Some(Self::NEW_TASK),
            "single-top" => Some(Self::SINGLE_TOP),
            "clear-top" => Some(Self::CLEAR_TOP),
            _ => None,
        }
    }
}

impl std::ops::BitOr for IntentFlags {
    type Output = IntentFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        IntentFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for IntentFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A launch request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentName>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, ExtraValue>,

    #[serde(default)]
    pub flags: IntentFlags,
}

impl Intent {
    /// Create an empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an explicit intent targeting `package/class`.
    pub fn explicit(package_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            component: Some(ComponentName::new(package_name, class_name)),
            ..Default::default()
        }
    }

    /// Create an implicit intent for an action.
    pub fn with_action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..Default::default()
        }
    }

    /// Set the action.
    pub fn set_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Add flags.
    pub fn add_flags(mut self, flags: IntentFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// The explicit target, or [`IntentError::MissingComponent`].
    ///
    /// A target with an empty package or class counts as missing.
    pub fn require_component(&self) -> Result<&ComponentName, IntentError> {
        match &self.component {
            Some(c) if !c.package_name.is_empty() && !c.class_name.is_empty() => Ok(c),
            _ => Err(IntentError::MissingComponent),
        }
    }

    /// Whether the intent names an explicit target.
    pub fn is_explicit(&self) -> bool {
        self.require_component().is_ok()
    }

    pub fn put_extra(mut self, key: impl Into<String>, value: ExtraValue) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    pub fn put_int_extra(self, key: impl Into<String>, value: i32) -> Self {
        self.put_extra(key, ExtraValue::Int(value))
    }

    pub fn put_long_extra(self, key: impl Into<String>, value: i64) -> Self {
        self.put_extra(key, ExtraValue::Long(value))
    }

    pub fn put_string_extra(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.put_extra(key, ExtraValue::String(value.into()))
    }

    pub fn put_bool_extra(self, key: impl Into<String>, value: bool) -> Self {
        self.put_extra(key, ExtraValue::Bool(value))
    }

    /// Int extra, or `default` when missing or of another type.
    pub fn get_int_extra(&self, key: &str, default: i32) -> i32 {
        match self.extras.get(key) {
            Some(ExtraValue::Int(v)) => *v,
            _ => default,
        }
    }

    /// Long extra, or `default` when missing or of another type.
    ///
    /// Int extras widen to long.
    pub fn get_long_extra(&self, key: &str, default: i64) -> i64 {
        match self.extras.get(key) {
            Some(ExtraValue::Long(v)) => *v,
            Some(ExtraValue::Int(v)) => i64::from(*v),
            _ => default,
        }
    }

    /// String extra, or `default` when missing or of another type.
    pub fn get_string_extra<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.extras.get(key) {
            Some(ExtraValue::String(v)) => v.as_str(),
            _ => default,
        }
    }

    /// Bool extra, or `default` when missing or of another type.
    pub fn get_bool_extra(&self, key: &str, default: bool) -> bool {
        match self.extras.get(key) {
            Some(ExtraValue::Bool(v)) => *v,
            _ => default,
        }
    }

    /// Strict int lookup: `None` when missing, an error on type mismatch.
    pub fn try_int_extra(&self, key: &str) -> Result<Option<i32>, IntentError> {
        match self.extras.get(key) {
            None => Ok(None),
            Some(ExtraValue::Int(v)) => Ok(Some(*v)),
            Some(other) => Err(IntentError::ExtraTypeMismatch {
                key: key.to_string(),
                expected: "int",
                actual: other.type_name(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "intent_tests.rs"]
mod tests;
