//! Service configuration registry.

use crate::types::{ConfigCategory, ServiceConfig};
use serde::{Deserialize, Serialize};

/// Service name -> configuration categories.
///
/// The reconciler reads categories but never restructures them: category
/// lists keep their length and order across disable/enable cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceConfigRegistry {
    services: Vec<ServiceConfig>,
}

impl ServiceConfigRegistry {
    #[must_use]
    pub fn new(services: Vec<ServiceConfig>) -> Self {
        Self { services }
    }

    #[must_use]
    pub fn services(&self) -> &[ServiceConfig] {
        &self.services
    }

    #[must_use]
    pub fn find_service(&self, service_name: &str) -> Option<&ServiceConfig> {
        self.services.iter().find(|s| s.service_name == service_name)
    }

    /// Add a service, replacing any existing entry with the same name.
    pub fn upsert(&mut self, service: ServiceConfig) {
        match self
            .services
            .iter_mut()
            .find(|s| s.service_name == service.service_name)
        {
            Some(existing) => *existing = service,
            None => self.services.push(service),
        }
    }

    /// Every (service name, category) pair, in registry order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &ConfigCategory)> {
        self.services.iter().flat_map(|service| {
            service
                .config_categories
                .iter()
                .map(move |category| (service.service_name.as_str(), category))
        })
    }

    /// Whether any service defines a category named `category`.
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories().any(|(_, c)| c.name == category)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
