//! # Component Metadata Source
//!
//! The catalogue of components available in the active stack.
//!
//! The reconciler and the capability index only read from this source.
//! [`StackCatalog`] is the in-memory implementation; replacing its
//! contents is how a stack switch is modelled.

use crate::types::{Capability, ComponentDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// METADATA SOURCE TRAIT
// =============================================================================

/// Read access to the component catalogue of the active stack.
///
/// Enumeration order is significant: capability lists preserve it.
pub trait MetadataSource {
    /// All descriptors, in enumeration order.
    fn components(&self) -> &[ComponentDescriptor];

    /// Find a descriptor by component name.
    fn find_by_name(&self, component_name: &str) -> Option<&ComponentDescriptor> {
        self.components()
            .iter()
            .find(|c| c.component_name == component_name)
    }

    /// Descriptors carrying `capability`, in enumeration order.
    fn filter_by(&self, capability: Capability) -> Vec<&ComponentDescriptor> {
        self.components()
            .iter()
            .filter(|c| c.has(capability))
            .collect()
    }

    /// A catalogue reporting zero components has not finished loading.
    fn is_loaded(&self) -> bool {
        !self.components().is_empty()
    }
}

// =============================================================================
// STACK CATALOG
// =============================================================================

/// In-memory component catalogue with a name index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackCatalog {
    components: Vec<ComponentDescriptor>,
    /// component_name -> position of its first occurrence
    by_name: BTreeMap<String, usize>,
}

impl StackCatalog {
    /// Create an empty (not yet loaded) catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalogue from descriptors, preserving their order.
    #[must_use]
    pub fn from_components(components: Vec<ComponentDescriptor>) -> Self {
        let mut catalog = Self::new();
        catalog.replace(components);
        catalog
    }

    /// Replace the whole catalogue, as happens when the active stack changes.
    pub fn replace(&mut self, components: Vec<ComponentDescriptor>) {
        let mut by_name = BTreeMap::new();
        for (position, component) in components.iter().enumerate() {
            by_name
                .entry(component.component_name.clone())
                .or_insert(position);
        }
        self.components = components;
        self.by_name = by_name;
    }

    /// Drop every descriptor, returning the catalogue to the not-loaded state.
    pub fn clear(&mut self) {
        self.components.clear();
        self.by_name.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component names in enumeration order.
    #[must_use]
    pub fn component_names(&self) -> Vec<&str> {
        self.components
            .iter()
            .map(|c| c.component_name.as_str())
            .collect()
    }
}

impl MetadataSource for StackCatalog {
    fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }

    fn find_by_name(&self, component_name: &str) -> Option<&ComponentDescriptor> {
        self.by_name
            .get(component_name)
            .and_then(|&position| self.components.get(position))
    }
}

impl FromIterator<ComponentDescriptor> for StackCatalog {
    fn from_iter<I: IntoIterator<Item = ComponentDescriptor>>(iter: I) -> Self {
        Self::from_components(iter.into_iter().collect())
    }
}

// =============================================================================
// STACK DEFINITION
// =============================================================================

/// A stack as delivered by the external stack parser.
///
/// `stack_version` is optional: a definition without one keeps the
/// currently active version when applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_version: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentDescriptor>,
}

// =============================================================================
// TESTS
// =============================================================================
