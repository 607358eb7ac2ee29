//! # Handset Config
//!
//! TOML configuration for the handset system server.
//!
//! ```toml
//! [system]
//! home_package = "com.handset.launcher"
//! await_ready_timeout_ms = 5000
//!
//! [services.llm]
//! enabled = true
//! model = "${HANDSET_MODEL}"
//!
//! [[packages]]
//! package_name = "com.example.mail"
//! label = "Mail"
//! activities = [{ name = "Inbox", launcher = true }]
//! ```
//!
//! `${VAR}` placeholders are expanded before parsing; `~` in
//! `logging.directory` is expanded after.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{Config, LlmConfig, LoggingConfig, ServicesConfig, SystemConfig};
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
