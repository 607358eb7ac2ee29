//! Name → handle service directory.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::handle::{Interface, ServiceHandle};

/// Process-wide service directory.
///
/// Writers are rare (bootstrap) and readers are everywhere, so lookups go
/// through a `DashMap` while the first-registration order is kept aside for
/// diagnostics and readiness notification.
pub struct ServiceRegistry {
    services: DashMap<String, Arc<dyn ServiceHandle>>,
    order: RwLock<Vec<String>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Register `handle` under `name`. The last writer wins.
    pub fn add_service(&self, name: impl Into<String>, handle: Arc<dyn ServiceHandle>) {
        let name = name.into();
        let descriptor = handle.descriptor();
        match self.services.insert(name.clone(), handle) {
            None => {
                self.order.write().push(name.clone());
                info!("Service registered: {} ({})", name, descriptor);
            }
            Some(previous) => {
                info!(
                    "Service replaced: {} ({} -> {})",
                    name,
                    previous.descriptor(),
                    descriptor
                );
            }
        }
    }

    /// Handle registered under `name`.
    pub fn get_service(&self, name: &str) -> Option<Arc<dyn ServiceHandle>> {
        let handle = self.services.get(name).map(|entry| entry.value().clone());
        if handle.is_none() {
            debug!("Service lookup miss: {}", name);
        }
        handle
    }

    /// Look up `name` and narrow it to `I` in one step.
    ///
    /// `None` when the name is unknown or its handle does not carry
    /// `I::DESCRIPTOR`.
    pub fn get_interface<I: Interface>(&self, name: &str) -> Option<I> {
        self.get_service(name)?
            .query_local_interface(I::DESCRIPTOR)?
            .narrow()
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Registered names, in first-registration order.
    pub fn list_services(&self) -> Vec<String> {
        self.order.read().clone()
    }

    /// Handles in first-registration order.
    pub fn handles(&self) -> Vec<(String, Arc<dyn ServiceHandle>)> {
        self.order
            .read()
            .iter()
            .filter_map(|name| self.get_service(name).map(|h| (name.clone(), h)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
