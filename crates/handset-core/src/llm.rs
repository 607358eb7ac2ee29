//! Language model peer service.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::error::ServiceError;
use crate::service::SystemService;

/// Registered as `"llm"` when enabled. Exposes its model name and a ready flag.
#[derive(Debug)]
pub struct LanguageModelService {
    model: String,
    ready: AtomicBool,
}

impl LanguageModelService {
    /// Fails when `model` is blank.
    pub fn new(model: impl Into<String>) -> Result<Self, ServiceError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(ServiceError::start_failed(
                handset_protocols::services::LLM,
                "model name is empty",
            ));
        }
        Ok(Self {
            model,
            ready: AtomicBool::new(false),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl SystemService for LanguageModelService {
    fn system_ready(&self) {
        self.ready.store(true, Ordering::Release);
        info!("Language model service ready (model: {})", self.model);
    }
}
