//! # Consistency Check
//!
//! Read-only detection of referential problems across the registries,
//! the ledger and the metadata source.
//!
//! A healthy state after a reconciliation pass under the default options
//! yields no findings.

use crate::ledger::DisabledComponentLedger;
use crate::metadata::MetadataSource;
use crate::registry::{ConfigRegistries, PropertyFile};
use crate::stack::StackGeneration;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One referential problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inconsistency {
    /// A property whose category is not defined by its service (or by any
    /// service, when the property names none).
    OrphanProperty {
        generation: StackGeneration,
        file: PropertyFile,
        property: String,
        category: String,
    },
    /// The same (name, category) appears more than once in one generation.
    DuplicateProperty {
        generation: StackGeneration,
        property: String,
        category: String,
        count: usize,
    },
    /// A ledger component that the metadata source reports as present.
    LedgerOverlap { component: String },
    /// A component with more than one ledger entry.
    DuplicateLedgerEntry { component: String, count: usize },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::OrphanProperty {
                generation,
                file,
                property,
                category,
            } => write!(
                f,
                "{generation}/{file}: property {property:?} references unknown category {category:?}"
            ),
            Inconsistency::DuplicateProperty {
                generation,
                property,
                category,
                count,
            } => write!(
                f,
                "{generation}: property {property:?} in category {category:?} appears {count} times"
            ),
            Inconsistency::LedgerOverlap { component } => {
                write!(f, "ledger: {component} is disabled but present in the stack")
            }
            Inconsistency::DuplicateLedgerEntry { component, count } => {
                write!(f, "ledger: {component} has {count} entries")
            }
        }
    }
}

/// Collect every problem in the current state, in a stable order.
#[must_use]
pub fn check_consistency<M: MetadataSource + ?Sized>(
    registries: &ConfigRegistries,
    ledger: &DisabledComponentLedger,
    metadata: &M,
) -> Vec<Inconsistency> {
    let mut findings = Vec::new();

    for generation in StackGeneration::ALL {
        let files = registries.properties.files(generation);
        let mut occurrences: BTreeMap<(&str, &str), usize> = BTreeMap::new();

        for (file, property) in files.iter() {
            *occurrences
                .entry((property.name.as_str(), property.category.as_str()))
                .or_default() += 1;

            let known = match property.service_name.as_deref() {
                Some(service) => registries
                    .service_configs
                    .find_service(service)
                    .is_some_and(|s| s.has_category(&property.category)),
                None => registries.service_configs.has_category(&property.category),
            };
            if !known {
                findings.push(Inconsistency::OrphanProperty {
                    generation,
                    file,
                    property: property.name.clone(),
                    category: property.category.clone(),
                });
            }
        }

        findings.extend(
            occurrences
                .into_iter()
                .filter(|&(_, count)| count > 1)
                .map(|((property, category), count)| Inconsistency::DuplicateProperty {
                    generation,
                    property: property.to_string(),
                    category: category.to_string(),
                    count,
                }),
        );
    }

    for component in ledger.component_names() {
        if metadata.find_by_name(component).is_some() {
            findings.push(Inconsistency::LedgerOverlap {
                component: component.to_string(),
            });
        }
        let count = ledger.get(component).len();
        if count > 1 {
            findings.push(Inconsistency::DuplicateLedgerEntry {
                component: component.to_string(),
                count,
            });
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerEntry;
    use crate::metadata::StackCatalog;
    use crate::registry::{PropertyFiles, PropertyRegistries, ServiceConfigRegistry};
    use crate::types::{ComponentDescriptor, ConfigCategory, ConfigProperty, ServiceConfig};

    fn registries(global: Vec<ConfigProperty>) -> ConfigRegistries {
        ConfigRegistries {
            service_configs: ServiceConfigRegistry::new(vec![ServiceConfig::new(
                "HDFS",
                vec![
                    ConfigCategory::new("General"),
                    ConfigCategory::owned_by("NameNode", ["NAMENODE"]),
                ],
            )]),
            properties: PropertyRegistries::new(
                PropertyFiles::default(),
                PropertyFiles::new(global, Vec::new()),
            ),
            ..ConfigRegistries::default()
        }
    }

    #[test]
    fn clean_state_has_no_findings() {
        let regs = registries(vec![ConfigProperty::new("namenode_host", "NameNode", "nn")]);
        let findings = check_consistency(&regs, &DisabledComponentLedger::new(), &StackCatalog::new());
        assert!(findings.is_empty());
    }

    #[test]
    fn orphan_property_detected() {
        let regs = registries(vec![ConfigProperty::new("snamenode_host", "SNameNode", "snn")]);
        let findings = check_consistency(&regs, &DisabledComponentLedger::new(), &StackCatalog::new());
        assert_eq!(findings.len(), 1);
        assert!(matches!(
            &findings[0],
            Inconsistency::OrphanProperty { category, .. } if category == "SNameNode"
        ));
    }

    #[test]
    fn property_service_scopes_category_lookup() {
        let mut scoped = ConfigProperty::new("namenode_host", "NameNode", "nn");
        scoped.service_name = Some("YARN".into());
        let regs = registries(vec![scoped]);

        let findings = check_consistency(&regs, &DisabledComponentLedger::new(), &StackCatalog::new());
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn duplicate_property_counted() {
        let prop = ConfigProperty::new("namenode_host", "NameNode", "nn");
        let regs = registries(vec![prop.clone(), prop]);
        let findings = check_consistency(&regs, &DisabledComponentLedger::new(), &StackCatalog::new());
        assert_eq!(
            findings,
            vec![Inconsistency::DuplicateProperty {
                generation: StackGeneration::Current,
                property: "namenode_host".into(),
                category: "NameNode".into(),
                count: 2,
            }]
        );
    }

    #[test]
    fn ledger_findings() {
        let regs = registries(Vec::new());
        let mut ledger = DisabledComponentLedger::new();
        ledger.insert(LedgerEntry::new("NAMENODE", "HDFS", StackGeneration::Current));
        ledger.insert(LedgerEntry::new("NAMENODE", "HDFS", StackGeneration::Current));
        let catalog = StackCatalog::from_components(vec![ComponentDescriptor::new("NAMENODE", "HDFS")]);

        let findings = check_consistency(&regs, &ledger, &catalog);

        assert_eq!(
            findings,
            vec![
                Inconsistency::LedgerOverlap {
                    component: "NAMENODE".into()
                },
                Inconsistency::DuplicateLedgerEntry {
                    component: "NAMENODE".into(),
                    count: 2
                },
            ]
        );
        assert_eq!(findings[1].to_string(), "ledger: NAMENODE has 2 entries");
    }
}
