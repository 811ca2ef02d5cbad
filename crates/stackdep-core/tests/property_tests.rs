//! # Property-Based Tests
//!
//! Invariants of reconciliation over generated stacks.
//!
//! Every generated service configuration gives component `i` its own
//! category `Cat{i}`, a few properties in each file and a review summary.
//! A boolean mask selects which components the active stack provides.

use proptest::collection::vec;
use proptest::prelude::*;
use stackdep_core::{
    Capability, CapabilityIndex, ComponentDescriptor, ConfigCategory, ConfigProperty,
    ConfigRegistries, PropertyFiles, PropertyRegistries, Reconciler, ReconcilerOptions,
    ReviewComponent, ReviewConfigRegistry, ReviewService, ServiceConfig, ServiceConfigRegistry,
    StackCatalog, StackGeneration,
};
use std::collections::BTreeSet;

// =============================================================================
// GENERATORS
// =============================================================================

const SERVICES: [&str; 3] = ["HDFS", "YARN", "HBASE"];

/// Always present and never referenced, so a mask of all `false` still
/// leaves the metadata source loaded.
const ANCHOR: &str = "ZOOKEEPER_SERVER";

fn component_name(i: usize) -> String {
    format!("COMPONENT_{i}")
}

fn service_of(i: usize) -> &'static str {
    SERVICES[i % SERVICES.len()]
}

fn descriptors(count: usize, mask: &[bool]) -> Vec<ComponentDescriptor> {
    let mut out = vec![ComponentDescriptor::new(ANCHOR, "ZOOKEEPER")];
    out.extend(
        (0..count)
            .filter(|&i| mask.get(i).copied().unwrap_or(true))
            .map(|i| ComponentDescriptor::new(component_name(i), service_of(i))),
    );
    out
}

fn registries(count: usize, props_per_file: usize) -> ConfigRegistries {
    let mut services: Vec<ServiceConfig> = SERVICES
        .iter()
        .map(|s| ServiceConfig::new(*s, vec![ConfigCategory::new("General")]))
        .collect();
    let mut review: Vec<ReviewService> = SERVICES
        .iter()
        .map(|s| ReviewService::new(*s, Vec::new()))
        .collect();
    let mut files = PropertyFiles::default();

    for i in 0..count {
        let slot = i % SERVICES.len();
        let category = format!("Cat{i}");
        services[slot]
            .config_categories
            .push(ConfigCategory::owned_by(category.as_str(), [component_name(i)]));
        review[slot]
            .service_components
            .push(ReviewComponent::new(component_name(i), format!("Component {i}")));
        for p in 0..props_per_file {
            files
                .global_properties
                .push(ConfigProperty::new(format!("g{i}_{p}"), category.as_str(), "v"));
            files
                .site_properties
                .push(ConfigProperty::new(format!("s{i}_{p}"), category.as_str(), "v"));
        }
        files
            .global_properties
            .push(ConfigProperty::new(format!("general_{i}"), "General", "v"));
    }

    ConfigRegistries::new(
        ServiceConfigRegistry::new(services),
        PropertyRegistries::new(PropertyFiles::default(), files),
        ReviewConfigRegistry::new(review),
    )
}

fn normalized(registries: &ConfigRegistries) -> ConfigRegistries {
    let mut out = registries.clone();
    for generation in StackGeneration::ALL {
        let files = out.properties.files_mut(generation);
        files.global_properties.sort();
        files.site_properties.sort();
    }
    let services = out
        .review_configs
        .services()
        .iter()
        .cloned()
        .map(|mut service| {
            service.service_components.sort();
            service
        })
        .collect();
    out.review_configs = ReviewConfigRegistry::new(services);
    out
}

fn absent_names(count: usize, mask: &[bool]) -> BTreeSet<String> {
    (0..count)
        .filter(|&i| !mask.get(i).copied().unwrap_or(true))
        .map(component_name)
        .collect()
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Disabling then restoring leaves the registries set-wise unchanged.
    #[test]
    fn round_trip_restores_registries(
        count in 1usize..12,
        props in 0usize..4,
        mask in vec(any::<bool>(), 12)
    ) {
        let original = registries(count, props);
        let mut reconciler = Reconciler::new(
            StackCatalog::from_components(descriptors(count, &[])),
            original.clone(),
            ReconcilerOptions::default(),
        );

        reconciler.metadata_mut().replace(descriptors(count, &mask));
        reconciler.reconcile();
        reconciler.metadata_mut().replace(descriptors(count, &[]));
        reconciler.reconcile();

        prop_assert!(reconciler.ledger().is_empty());
        prop_assert_eq!(normalized(reconciler.registries()), normalized(&original));
    }

    /// A second pass over an unchanged stack changes nothing.
    #[test]
    fn second_pass_is_noop(
        count in 1usize..12,
        props in 0usize..4,
        mask in vec(any::<bool>(), 12)
    ) {
        let mut reconciler = Reconciler::new(
            StackCatalog::from_components(descriptors(count, &mask)),
            registries(count, props),
            ReconcilerOptions::default(),
        );

        reconciler.reconcile();
        let registries_after = reconciler.registries().clone();
        let ledger_after = reconciler.ledger().clone();
        let second = reconciler.reconcile();

        prop_assert!(second.is_noop());
        prop_assert_eq!(reconciler.registries(), &registries_after);
        prop_assert_eq!(reconciler.ledger(), &ledger_after);
    }

    /// The ledger holds exactly the referenced components the stack lacks,
    /// across any sequence of stack switches.
    #[test]
    fn ledger_matches_absent_components(
        count in 1usize..10,
        masks in vec(vec(any::<bool>(), 10), 1..6)
    ) {
        let original = registries(count, 2);
        let mut reconciler = Reconciler::new(
            StackCatalog::from_components(descriptors(count, &[])),
            original.clone(),
            ReconcilerOptions::default(),
        );

        for mask in &masks {
            reconciler.metadata_mut().replace(descriptors(count, mask));
            reconciler.reconcile();

            let ledgered: BTreeSet<String> =
                reconciler.ledger().component_names().map(str::to_string).collect();
            prop_assert_eq!(ledgered, absent_names(count, mask));
            prop_assert_eq!(reconciler.ledger().len(), reconciler.ledger().component_count());
            prop_assert!(reconciler.check().is_empty());
        }

        reconciler.metadata_mut().replace(descriptors(count, &[]));
        reconciler.reconcile();
        prop_assert_eq!(normalized(reconciler.registries()), normalized(&original));
    }

    /// Capability lists have the right length and keep catalogue order.
    #[test]
    fn capability_lists_follow_source(flags in vec(any::<(bool, bool)>(), 0..40)) {
        let components: Vec<ComponentDescriptor> = flags
            .iter()
            .enumerate()
            .map(|(i, &(slave, client))| {
                let mut d = ComponentDescriptor::new(component_name(i), service_of(i));
                d.is_slave = slave;
                d.is_client = client;
                d
            })
            .collect();
        let catalog = StackCatalog::from_components(components);

        let index = CapabilityIndex::from_source(&catalog);

        let expected_slaves: Vec<String> = flags
            .iter()
            .enumerate()
            .filter(|(_, f)| f.0)
            .map(|(i, _)| component_name(i))
            .collect();
        prop_assert_eq!(index.slaves.len(), flags.iter().filter(|f| f.0).count());
        prop_assert_eq!(&index.slaves, &expected_slaves);
        prop_assert_eq!(
            index.names(Capability::Client).len(),
            flags.iter().filter(|f| f.1).count()
        );
        prop_assert_eq!(index.all_components.len(), flags.len());
        prop_assert!(index.masters.is_empty());
    }
}
