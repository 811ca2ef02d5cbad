//! # Configuration Registries
//!
//! The three interlinked registries the reconciler keeps consistent:
//! - `services`: service name -> configuration categories
//! - `properties`: flat property records per file, per stack generation
//! - `review`: service name -> component summaries shown for review
//!
//! A property is owned by a component through its `category`, which
//! names a category whose `host_component_names` lists the component.

mod properties;
mod review;
mod services;

pub use properties::{PropertyFile, PropertyFiles, PropertyRegistries};
pub use review::ReviewConfigRegistry;
pub use services::ServiceConfigRegistry;

use serde::{Deserialize, Serialize};

/// The three registries, owned together so a reconciliation pass mutates
/// them under a single exclusive borrow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRegistries {
    #[serde(default)]
    pub service_configs: ServiceConfigRegistry,
    #[serde(default)]
    pub properties: PropertyRegistries,
    #[serde(default)]
    pub review_configs: ReviewConfigRegistry,
}

impl ConfigRegistries {
    #[must_use]
    pub fn new(
        service_configs: ServiceConfigRegistry,
        properties: PropertyRegistries,
        review_configs: ReviewConfigRegistry,
    ) -> Self {
        Self {
            service_configs,
            properties,
            review_configs,
        }
    }
}
