//! # Disabled-Component Ledger
//!
//! Records everything removed from the registries when a component is
//! disabled, so the removal can be undone when the component reappears.
//!
//! The ledger is indexed by component name. Under
//! [`LedgerPolicy::Deduplicate`] a component has at most one entry; under
//! [`LedgerPolicy::Accumulate`] every pass that finds the component still
//! missing adds another entry under the same name.

use crate::registry::PropertyFiles;
use crate::stack::StackGeneration;
use crate::types::{ConfigCategory, ReviewComponent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// LEDGER POLICY
// =============================================================================

/// How the disable pass treats a component that already has an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerPolicy {
    /// Skip components already in the ledger: one entry per component.
    #[default]
    Deduplicate,
    /// Disable again on every pass; entries accumulate per component.
    Accumulate,
}

// =============================================================================
// LEDGER ENTRY
// =============================================================================

/// What was removed when one component was disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub component_name: String,
    pub service_name: String,
    /// Generation whose property files the records were taken from.
    pub captured_from: StackGeneration,
    /// Removed property records, per originating file.
    pub properties: PropertyFiles,
    /// Removed review summary.
    pub review_config: Option<ReviewComponent>,
    /// The category that referenced the component.
    pub config_category: Option<ConfigCategory>,
}

impl LedgerEntry {
    /// An entry with nothing captured yet.
    #[must_use]
    pub fn new(
        component_name: impl Into<String>,
        service_name: impl Into<String>,
        captured_from: StackGeneration,
    ) -> Self {
        Self {
            component_name: component_name.into(),
            service_name: service_name.into(),
            captured_from,
            properties: PropertyFiles::default(),
            review_config: None,
            config_category: None,
        }
    }

    /// Nothing was captured: restoring this entry changes no registry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.review_config.is_none()
    }
}

// =============================================================================
// LEDGER
// =============================================================================

/// Currently disabled components, keyed by component name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisabledComponentLedger {
    entries: BTreeMap<String, Vec<LedgerEntry>>,
}

impl DisabledComponentLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry under its component name.
    pub fn insert(&mut self, entry: LedgerEntry) {
        self.entries
            .entry(entry.component_name.clone())
            .or_default()
            .push(entry);
    }

    #[must_use]
    pub fn contains(&self, component_name: &str) -> bool {
        self.entries.contains_key(component_name)
    }

    /// Entries for one component, oldest first; empty if none.
    #[must_use]
    pub fn get(&self, component_name: &str) -> &[LedgerEntry] {
        self.entries
            .get(component_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Remove and return every entry for one component.
    pub fn remove(&mut self, component_name: &str) -> Vec<LedgerEntry> {
        self.entries.remove(component_name).unwrap_or_default()
    }

    /// All entries, by component name then age.
    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.values().flatten()
    }

    /// Component names with at least one entry, sorted.
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Number of distinct components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<LedgerEntry> for DisabledComponentLedger {
    fn extend<I: IntoIterator<Item = LedgerEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
