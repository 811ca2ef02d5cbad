//! Review-configuration registry.

use crate::types::{ReviewComponent, ReviewService};
use serde::{Deserialize, Serialize};

/// Service name -> component summaries shown to the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewConfigRegistry {
    services: Vec<ReviewService>,
}

impl ReviewConfigRegistry {
    #[must_use]
    pub fn new(services: Vec<ReviewService>) -> Self {
        Self { services }
    }

    #[must_use]
    pub fn services(&self) -> &[ReviewService] {
        &self.services
    }

    #[must_use]
    pub fn find_service(&self, service_name: &str) -> Option<&ReviewService> {
        self.services.iter().find(|s| s.service_name == service_name)
    }

    fn find_service_mut(&mut self, service_name: &str) -> Option<&mut ReviewService> {
        self.services
            .iter_mut()
            .find(|s| s.service_name == service_name)
    }

    /// Remove and return the summary for `component_name` under `service_name`.
    ///
    /// Returns `None` when the service or the component is not listed.
    /// Only the first matching summary is taken.
    pub fn take_component(
        &mut self,
        service_name: &str,
        component_name: &str,
    ) -> Option<ReviewComponent> {
        let service = self.find_service_mut(service_name)?;
        let position = service
            .service_components
            .iter()
            .position(|c| c.component_name == component_name)?;
        Some(service.service_components.remove(position))
    }

    /// Append a summary to its service's list.
    ///
    /// Returns `false` (and drops nothing from the registry) when the
    /// service has no review entry.
    pub fn restore_component(&mut self, service_name: &str, component: ReviewComponent) -> bool {
        match self.find_service_mut(service_name) {
            Some(service) => {
                service.service_components.push(component);
                true
            }
            None => false,
        }
    }

    /// Total number of summaries across all services.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.services.iter().map(|s| s.service_components.len()).sum()
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
