//! # Snapshot Format
//!
//! A JSON document carrying everything a reconciler is built from:
//! stack version, component catalogue and the three registries.
//!
//! ```json
//! {
//!   "stack_version": "HDP-2.0.6",
//!   "components": [{ "component_name": "NODEMANAGER", "service_name": "YARN", "is_slave": true }],
//!   "service_configs": [{ "service_name": "YARN", "config_categories": [...] }],
//!   "properties": { "legacy": {...}, "current": { "global_properties": [...], "site_properties": [...] } },
//!   "review_configs": [{ "service_name": "YARN", "service_components": [...] }],
//!   "disabled_components": { "APP_TIMELINE_SERVER": [{ "component_name": ..., "properties": {...} }] }
//! }
//! ```
//!
//! `disabled_components` is omitted while the ledger is empty. A snapshot
//! written after a pass that disabled components must carry it, since the
//! registries no longer hold the removed records.
//!
//! Payload size is checked against `MAX_SNAPSHOT_SIZE` before decoding.

use crate::ledger::DisabledComponentLedger;
use crate::metadata::{MetadataSource, StackCatalog, StackDefinition};
use crate::primitives::MAX_SNAPSHOT_SIZE;
use crate::reconciler::{Reconciler, ReconcilerOptions};
use crate::registry::{
    ConfigRegistries, PropertyRegistries, ReviewConfigRegistry, ServiceConfigRegistry,
};
use crate::stack::StackVersion;
use crate::types::ComponentDescriptor;
use crate::StackDepError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Serializable state of a reconciler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_version: Option<StackVersion>,
    #[serde(default)]
    pub components: Vec<ComponentDescriptor>,
    #[serde(default)]
    pub service_configs: ServiceConfigRegistry,
    #[serde(default)]
    pub properties: PropertyRegistries,
    #[serde(default)]
    pub review_configs: ReviewConfigRegistry,
    #[serde(default, skip_serializing_if = "DisabledComponentLedger::is_empty")]
    pub disabled_components: DisabledComponentLedger,
}

impl Snapshot {
    /// Build a reconciler owning this snapshot's state, ledger included.
    #[must_use]
    pub fn into_reconciler(self, options: ReconcilerOptions) -> Reconciler<StackCatalog> {
        let registries =
            ConfigRegistries::new(self.service_configs, self.properties, self.review_configs);
        let reconciler =
            Reconciler::new(StackCatalog::from_components(self.components), registries, options)
                .with_ledger(self.disabled_components);
        match self.stack_version {
            Some(version) => reconciler.with_stack_version(version),
            None => reconciler,
        }
    }

    /// Capture a reconciler's current state.
    #[must_use]
    pub fn from_reconciler(reconciler: &Reconciler<StackCatalog>) -> Self {
        let registries = reconciler.registries().clone();
        Self {
            stack_version: reconciler.stack_version().cloned(),
            components: reconciler.metadata().components().to_vec(),
            service_configs: registries.service_configs,
            properties: registries.properties,
            review_configs: registries.review_configs,
            disabled_components: reconciler.ledger().clone(),
        }
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StackDepError> {
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(StackDepError::PayloadTooLarge {
            size: bytes.len(),
            max: MAX_SNAPSHOT_SIZE,
        });
    }
    serde_json::from_slice(bytes).map_err(|e| StackDepError::DeserializationError(e.to_string()))
}

/// Decode a snapshot from JSON bytes.
pub fn snapshot_from_json(bytes: &[u8]) -> Result<Snapshot, StackDepError> {
    decode(bytes)
}

/// Encode a snapshot as pretty-printed JSON.
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<Vec<u8>, StackDepError> {
    serde_json::to_vec_pretty(snapshot).map_err(|e| StackDepError::SerializationError(e.to_string()))
}

/// Decode a stack definition from JSON bytes.
///
/// Accepts either an object with `stack_version`/`components` or a bare
/// array of component descriptors.
pub fn stack_definition_from_json(bytes: &[u8]) -> Result<StackDefinition, StackDepError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Definition(StackDefinition),
        Components(Vec<ComponentDescriptor>),
    }

    Ok(match decode::<Wire>(bytes)? {
        Wire::Definition(definition) => definition,
        Wire::Components(components) => StackDefinition {
            stack_version: None,
            components,
        },
    })
}

// =============================================================================
// TESTS
// =============================================================================
