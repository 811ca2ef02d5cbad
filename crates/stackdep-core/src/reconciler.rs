//! # Dependency Reconciler
//!
//! Keeps the configuration registries consistent with the components of
//! the active stack.
//!
//! A pass runs in three steps:
//! 1. **Disable**: every component named by a category's
//!    `host_component_names` but missing from the metadata source has its
//!    properties and review summary moved out of the registries into a
//!    pending ledger entry.
//! 2. **Enable**: every ledger component that is present again has its
//!    captured records moved back into the registries.
//! 3. **Merge**: pending entries join the ledger.
//!
//! The enable step sees the ledger as it was before this pass, so a
//! component is never disabled and re-enabled in the same pass.
//!
//! ## Atomicity
//!
//! A pass holds `&mut self` from start to finish. No reader can observe
//! the registries between steps; wrap the reconciler in a lock if it is
//! shared across threads.
//!
//! ## Failure Model
//!
//! Nothing here returns an error. A component referenced nowhere, a
//! service without a review entry, a category with no properties: each is
//! a silent no-op, since they are normal transient states while a stack
//! is loading.

use crate::capability::CapabilityIndex;
use crate::consistency::{Inconsistency, check_consistency};
use crate::ledger::{DisabledComponentLedger, LedgerEntry, LedgerPolicy};
use crate::metadata::{MetadataSource, StackCatalog, StackDefinition};
use crate::registry::{ConfigRegistries, PropertyFile};
use crate::stack::{StackGeneration, StackVersion};
use crate::types::ComponentDescriptor;
use crate::StackDepError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// OPTIONS
// =============================================================================

/// Which property file set a ledger entry is restored into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreTarget {
    /// The generation active when the component is enabled.
    #[default]
    Active,
    /// The generation the records were captured from.
    Captured,
}

/// Tunables for a [`Reconciler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcilerOptions {
    pub ledger_policy: LedgerPolicy,
    pub restore_target: RestoreTarget,
    /// Turn every pass into a no-op (test mode).
    pub skip: bool,
}

// =============================================================================
// REPORT
// =============================================================================

/// Why a pass made no changes without looking at the registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The metadata source reports zero components.
    MetadataNotLoaded,
    /// `ReconcilerOptions::skip` is set.
    SkipFlag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassOutcome {
    Applied,
    Skipped(SkipReason),
}

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub outcome: PassOutcome,
    pub generation: StackGeneration,
    /// Components disabled by this pass, in discovery order.
    pub disabled: Vec<String>,
    /// Components restored by this pass, sorted.
    pub enabled: Vec<String>,
    /// Total ledger entries after the pass.
    pub ledger_size: usize,
}

impl ReconcileReport {
    fn skipped(reason: SkipReason, generation: StackGeneration, ledger_size: usize) -> Self {
        Self {
            outcome: PassOutcome::Skipped(reason),
            generation,
            disabled: Vec::new(),
            enabled: Vec::new(),
            ledger_size,
        }
    }

    /// The pass changed neither the registries nor the ledger.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.disabled.is_empty() && self.enabled.is_empty()
    }

    #[must_use]
    pub fn was_skipped(&self) -> bool {
        matches!(self.outcome, PassOutcome::Skipped(_))
    }
}

// =============================================================================
// DISABLE / ENABLE
// =============================================================================

/// Remove every trace of a component from the registries.
///
/// Only `component_name` and `service_name` of the descriptor are used.
/// Properties are taken from the first category of the service that lists
/// the component; other categories listing it keep their properties.
/// The returned entry holds what was removed; fields stay empty when the
/// component is not referenced. Categories are read, never removed.
pub fn disable_component(
    registries: &mut ConfigRegistries,
    descriptor: &ComponentDescriptor,
    generation: StackGeneration,
) -> LedgerEntry {
    let component_name = descriptor.component_name.as_str();
    let service_name = descriptor.service_name.as_str();
    let mut entry = LedgerEntry::new(component_name, service_name, generation);

    let category = registries
        .service_configs
        .find_service(service_name)
        .and_then(|service| service.category_for(component_name))
        .cloned();

    if let Some(category) = &category {
        let files = registries.properties.files_mut(generation);
        for file in PropertyFile::ALL {
            let removed = files.take_category(file, &category.name);
            entry.properties.append(file, removed);
        }
    }

    entry.review_config = registries
        .review_configs
        .take_component(service_name, component_name);
    entry.config_category = category;

    tracing::debug!(
        component = component_name,
        service = service_name,
        %generation,
        properties = entry.properties.len(),
        review = entry.review_config.is_some(),
        "component disabled"
    );

    entry
}

/// Put a ledger entry's captured records back into the registries.
///
/// Properties are appended to `generation`'s files; the review summary is
/// appended to its service's list. Category lists are untouched because
/// disabling never changed them.
pub fn enable_component(
    registries: &mut ConfigRegistries,
    entry: &LedgerEntry,
    generation: StackGeneration,
) {
    let files = registries.properties.files_mut(generation);
    for file in PropertyFile::ALL {
        files.append(file, entry.properties.file(file).iter().cloned());
    }

    if let Some(review) = &entry.review_config {
        let restored = registries
            .review_configs
            .restore_component(&entry.service_name, review.clone());
        if !restored {
            tracing::debug!(
                component = %entry.component_name,
                service = %entry.service_name,
                "no review entry for service, summary dropped"
            );
        }
    }

    tracing::debug!(
        component = %entry.component_name,
        service = %entry.service_name,
        %generation,
        properties = entry.properties.len(),
        "component enabled"
    );
}

// =============================================================================
// RECONCILER
// =============================================================================

/// Owns the registries, the ledger and the metadata source they are
/// reconciled against.
#[derive(Debug, Clone)]
pub struct Reconciler<M: MetadataSource = StackCatalog> {
    metadata: M,
    registries: ConfigRegistries,
    ledger: DisabledComponentLedger,
    stack_version: Option<StackVersion>,
    options: ReconcilerOptions,
}

impl<M: MetadataSource> Reconciler<M> {
    /// Create a reconciler with an empty ledger.
    ///
    /// Without a stack version the current property generation is used.
    #[must_use]
    pub fn new(metadata: M, registries: ConfigRegistries, options: ReconcilerOptions) -> Self {
        Self {
            metadata,
            registries,
            ledger: DisabledComponentLedger::new(),
            stack_version: None,
            options,
        }
    }

    /// Resume from a ledger recorded by an earlier reconciler.
    #[must_use]
    pub fn with_ledger(mut self, ledger: DisabledComponentLedger) -> Self {
        self.ledger = ledger;
        self
    }

    #[must_use]
    pub fn with_stack_version(mut self, version: StackVersion) -> Self {
        self.stack_version = Some(version);
        self
    }

    pub fn set_stack_version(&mut self, version: StackVersion) {
        self.stack_version = Some(version);
    }

    #[must_use]
    pub fn stack_version(&self) -> Option<&StackVersion> {
        self.stack_version.as_ref()
    }

    /// Property generation selected by the active stack version.
    #[must_use]
    pub fn generation(&self) -> StackGeneration {
        self.stack_version
            .as_ref()
            .map(StackVersion::generation)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    /// Mutable access to the metadata source, e.g. to load a new stack.
    pub fn metadata_mut(&mut self) -> &mut M {
        &mut self.metadata
    }

    #[must_use]
    pub fn registries(&self) -> &ConfigRegistries {
        &self.registries
    }

    #[must_use]
    pub fn ledger(&self) -> &DisabledComponentLedger {
        &self.ledger
    }

    #[must_use]
    pub fn options(&self) -> &ReconcilerOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ReconcilerOptions) {
        self.options = options;
    }

    /// Take the owned state back out.
    #[must_use]
    pub fn into_parts(self) -> (M, ConfigRegistries, DisabledComponentLedger) {
        (self.metadata, self.registries, self.ledger)
    }

    /// Run one reconciliation pass.
    ///
    /// Idempotent under [`LedgerPolicy::Deduplicate`]: a second pass with
    /// an unchanged metadata source changes nothing.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let generation = self.generation();

        if self.options.skip {
            tracing::debug!("reconciliation skipped by option");
            return ReconcileReport::skipped(SkipReason::SkipFlag, generation, self.ledger.len());
        }
        if !self.metadata.is_loaded() {
            tracing::warn!("metadata source not loaded, reconciliation skipped");
            return ReconcileReport::skipped(
                SkipReason::MetadataNotLoaded,
                generation,
                self.ledger.len(),
            );
        }

        // Disable pass
        let targets = self.missing_components();
        let pending: Vec<LedgerEntry> = targets
            .iter()
            .map(|descriptor| disable_component(&mut self.registries, descriptor, generation))
            .collect();

        // Enable pass, against the ledger as it was before this pass
        let returning: Vec<String> = self
            .ledger
            .component_names()
            .filter(|name| self.metadata.find_by_name(name).is_some())
            .map(str::to_string)
            .collect();
        for name in &returning {
            for entry in self.ledger.remove(name) {
                let target = match self.options.restore_target {
                    RestoreTarget::Active => generation,
                    RestoreTarget::Captured => entry.captured_from,
                };
                enable_component(&mut self.registries, &entry, target);
            }
        }

        self.ledger.extend(pending);

        let report = ReconcileReport {
            outcome: PassOutcome::Applied,
            generation,
            disabled: targets.into_iter().map(|d| d.component_name).collect(),
            enabled: returning,
            ledger_size: self.ledger.len(),
        };

        if !report.is_noop() {
            tracing::info!(
                %generation,
                disabled = report.disabled.len(),
                enabled = report.enabled.len(),
                ledger = report.ledger_size,
                "reconciliation applied"
            );
        }

        report
    }

    /// Components referenced by a category but absent from the metadata
    /// source, as minimal descriptors in registry order.
    fn missing_components(&self) -> Vec<ComponentDescriptor> {
        let deduplicate = self.options.ledger_policy == LedgerPolicy::Deduplicate;
        let mut seen = BTreeSet::new();
        let mut missing = Vec::new();

        for (service_name, category) in self.registries.service_configs.categories() {
            for component_name in category.host_components() {
                if self.metadata.find_by_name(component_name).is_some() {
                    continue;
                }
                if deduplicate
                    && (self.ledger.contains(component_name)
                        || !seen.insert(component_name.as_str()))
                {
                    continue;
                }
                missing.push(ComponentDescriptor::new(component_name.as_str(), service_name));
            }
        }

        missing
    }

    /// Disable one component against the active generation.
    ///
    /// The entry is returned, not recorded: callers that bypass
    /// [`Reconciler::reconcile`] own the entry from here on.
    pub fn disable_component(&mut self, descriptor: &ComponentDescriptor) -> LedgerEntry {
        let generation = self.generation();
        disable_component(&mut self.registries, descriptor, generation)
    }

    /// Restore one ledger entry according to the configured restore target.
    pub fn enable_component(&mut self, entry: &LedgerEntry) {
        let target = match self.options.restore_target {
            RestoreTarget::Active => self.generation(),
            RestoreTarget::Captured => entry.captured_from,
        };
        enable_component(&mut self.registries, entry, target);
    }

    /// Capability index of the current metadata source.
    #[must_use]
    pub fn capabilities(&self) -> CapabilityIndex {
        CapabilityIndex::from_source(&self.metadata)
    }

    /// Referential problems in the current state.
    #[must_use]
    pub fn check(&self) -> Vec<Inconsistency> {
        check_consistency(&self.registries, &self.ledger, &self.metadata)
    }
}

impl Reconciler<StackCatalog> {
    /// Switch to a new stack definition and reconcile against it.
    ///
    /// A definition without a version keeps the active one. Fails only if
    /// the version string cannot be parsed, in which case nothing changes.
    pub fn apply_stack(
        &mut self,
        definition: StackDefinition,
    ) -> Result<ReconcileReport, StackDepError> {
        if let Some(raw) = definition.stack_version.as_deref() {
            let version = StackVersion::parse(raw)?;
            tracing::info!(stack_version = %version, "active stack changed");
            self.stack_version = Some(version);
        }
        self.metadata.replace(definition.components);
        Ok(self.reconcile())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{
        PropertyFiles, PropertyRegistries, ReviewConfigRegistry, ServiceConfigRegistry,
    };
    use crate::types::{
        Capability, ConfigCategory, ConfigProperty, ReviewComponent, ReviewService, ServiceConfig,
    };

    fn registries() -> ConfigRegistries {
        ConfigRegistries::new(
            ServiceConfigRegistry::new(vec![ServiceConfig::new(
                "YARN",
                vec![
                    ConfigCategory::new("General"),
                    ConfigCategory::owned_by("ResourceManager", ["RESOURCEMANAGER"]),
                    ConfigCategory::owned_by("NodeManager", ["NODEMANAGER"]),
                ],
            )]),
            PropertyRegistries::new(
                PropertyFiles::default(),
                PropertyFiles::new(
                    vec![
                        ConfigProperty::new("rm_host", "ResourceManager", "rm1"),
                        ConfigProperty::new("yarn_log_dir", "General", "/var/log/yarn"),
                    ],
                    vec![
                        ConfigProperty::new("yarn.resourcemanager.address", "ResourceManager", "rm1:8050"),
                        ConfigProperty::new("yarn.nodemanager.address", "NodeManager", "0.0.0.0:45454"),
                    ],
                ),
            ),
            ReviewConfigRegistry::new(vec![ReviewService::new(
                "YARN",
                vec![
                    ReviewComponent::new("RESOURCEMANAGER", "ResourceManager"),
                    ReviewComponent::new("NODEMANAGER", "NodeManager"),
                ],
            )]),
        )
    }

    fn nodemanager_only() -> StackCatalog {
        StackCatalog::from_components(vec![
            ComponentDescriptor::new("NODEMANAGER", "YARN").with(Capability::Slave),
        ])
    }

    #[test]
    fn disable_moves_records_into_entry() {
        let mut regs = registries();
        let entry = disable_component(
            &mut regs,
            &ComponentDescriptor::new("RESOURCEMANAGER", "YARN"),
            StackGeneration::Current,
        );

        assert_eq!(entry.properties.global_properties.len(), 1);
        assert_eq!(entry.properties.site_properties.len(), 1);
        assert_eq!(
            entry.review_config.as_ref().map(|r| r.component_name.as_str()),
            Some("RESOURCEMANAGER")
        );
        assert_eq!(
            entry.config_category.as_ref().map(|c| c.name.as_str()),
            Some("ResourceManager")
        );
        assert_eq!(regs.properties.current.len(), 2);
        assert_eq!(regs.review_configs.component_count(), 1);
        // categories are untouched
        assert_eq!(regs.service_configs, registries().service_configs);
    }

    #[test]
    fn disable_unreferenced_component_is_partial() {
        let mut regs = registries();
        let entry = disable_component(
            &mut regs,
            &ComponentDescriptor::new("APP_TIMELINE_SERVER", "YARN"),
            StackGeneration::Current,
        );

        assert!(entry.is_empty());
        assert!(entry.config_category.is_none());
        assert_eq!(regs, registries());
    }

    #[test]
    fn disable_unknown_service_is_noop() {
        let mut regs = registries();
        let entry = disable_component(
            &mut regs,
            &ComponentDescriptor::new("RESOURCEMANAGER", "MAPREDUCE"),
            StackGeneration::Current,
        );
        assert!(entry.is_empty());
        assert_eq!(regs, registries());
    }

    #[test]
    fn disable_touches_only_selected_generation() {
        let mut regs = registries();
        let entry = disable_component(
            &mut regs,
            &ComponentDescriptor::new("RESOURCEMANAGER", "YARN"),
            StackGeneration::Legacy,
        );

        assert!(entry.properties.is_empty());
        assert_eq!(entry.captured_from, StackGeneration::Legacy);
        assert_eq!(regs.properties.current.len(), 4);
        // review summary is generation independent
        assert!(entry.review_config.is_some());
    }

    #[test]
    fn enable_appends_records() {
        let mut regs = registries();
        let entry = disable_component(
            &mut regs,
            &ComponentDescriptor::new("RESOURCEMANAGER", "YARN"),
            StackGeneration::Current,
        );
        enable_component(&mut regs, &entry, StackGeneration::Current);

        assert_eq!(regs.properties.current.len(), 4);
        assert_eq!(
            regs.properties
                .current
                .global_properties
                .last()
                .map(|p| p.name.as_str()),
            Some("rm_host")
        );
        let review = regs.review_configs.find_service("YARN").expect("service");
        assert_eq!(
            review
                .service_components
                .last()
                .map(|c| c.component_name.as_str()),
            Some("RESOURCEMANAGER")
        );
    }

    #[test]
    fn reconcile_disables_missing_component() {
        let mut reconciler =
            Reconciler::new(nodemanager_only(), registries(), ReconcilerOptions::default());

        let report = reconciler.reconcile();

        assert_eq!(report.outcome, PassOutcome::Applied);
        assert_eq!(report.disabled, vec!["RESOURCEMANAGER"]);
        assert!(report.enabled.is_empty());
        assert!(reconciler.ledger().contains("RESOURCEMANAGER"));
        assert_eq!(report.ledger_size, 1);
    }

    #[test]
    fn reconcile_skips_when_not_loaded() {
        let mut reconciler =
            Reconciler::new(StackCatalog::new(), registries(), ReconcilerOptions::default());

        let report = reconciler.reconcile();

        assert_eq!(
            report.outcome,
            PassOutcome::Skipped(SkipReason::MetadataNotLoaded)
        );
        assert_eq!(reconciler.registries(), &registries());
        assert!(reconciler.ledger().is_empty());
    }

    #[test]
    fn reconcile_honors_skip_flag() {
        let options = ReconcilerOptions {
            skip: true,
            ..ReconcilerOptions::default()
        };
        let mut reconciler = Reconciler::new(nodemanager_only(), registries(), options);

        let report = reconciler.reconcile();

        assert!(report.was_skipped());
        assert!(report.is_noop());
        assert!(reconciler.ledger().is_empty());
    }

    #[test]
    fn generation_follows_stack_version() {
        let reconciler =
            Reconciler::new(nodemanager_only(), registries(), ReconcilerOptions::default());
        assert_eq!(reconciler.generation(), StackGeneration::Current);

        let legacy = reconciler.with_stack_version(StackVersion::parse("HDP-1.3.2").expect("v"));
        assert_eq!(legacy.generation(), StackGeneration::Legacy);
    }

    #[test]
    fn apply_stack_rejects_bad_version_without_changes() {
        let mut reconciler =
            Reconciler::new(nodemanager_only(), registries(), ReconcilerOptions::default());

        let result = reconciler.apply_stack(StackDefinition {
            stack_version: Some("garbage".into()),
            components: Vec::new(),
        });

        assert!(matches!(result, Err(StackDepError::InvalidStackVersion(_))));
        assert_eq!(reconciler.metadata().len(), 1);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ReconcilerOptions =
            serde_json::from_str(r#"{"ledger_policy":"accumulate"}"#).expect("parse");
        assert_eq!(options.ledger_policy, LedgerPolicy::Accumulate);
        assert_eq!(options.restore_target, RestoreTarget::Active);
        assert!(!options.skip);
    }
}
