//! # Capability Index
//!
//! Named subsets of the component catalogue, one per capability flag.
//!
//! The index is a snapshot: it is never cached by the reconciler and must
//! be rebuilt whenever the metadata source changes.

use crate::metadata::MetadataSource;
use crate::types::Capability;
use serde::{Deserialize, Serialize};

/// Component names grouped by capability, in catalogue order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityIndex {
    pub all_components: Vec<String>,
    pub reassignable: Vec<String>,
    pub restartable: Vec<String>,
    pub deletable: Vec<String>,
    pub rollin_restart_allowed: Vec<String>,
    pub decommission_allowed: Vec<String>,
    pub addable_to_host: Vec<String>,
    pub slaves: Vec<String>,
    pub masters: Vec<String>,
    pub clients: Vec<String>,
}

impl CapabilityIndex {
    /// Build the index from the current contents of `source`.
    #[must_use]
    pub fn from_source<M: MetadataSource + ?Sized>(source: &M) -> Self {
        let mut index = Self::default();
        for component in source.components() {
            index.all_components.push(component.component_name.clone());
            for capability in Capability::ALL {
                if component.has(capability) {
                    index
                        .names_mut(capability)
                        .push(component.component_name.clone());
                }
            }
        }
        index
    }

    /// Names of components carrying `capability`.
    #[must_use]
    pub fn names(&self, capability: Capability) -> &[String] {
        match capability {
            Capability::Reassignable => &self.reassignable,
            Capability::Restartable => &self.restartable,
            Capability::Deletable => &self.deletable,
            Capability::RollinRestartAllowed => &self.rollin_restart_allowed,
            Capability::DecommissionAllowed => &self.decommission_allowed,
            Capability::AddableToHost => &self.addable_to_host,
            Capability::Slave => &self.slaves,
            Capability::Master => &self.masters,
            Capability::Client => &self.clients,
        }
    }

    fn names_mut(&mut self, capability: Capability) -> &mut Vec<String> {
        match capability {
            Capability::Reassignable => &mut self.reassignable,
            Capability::Restartable => &mut self.restartable,
            Capability::Deletable => &mut self.deletable,
            Capability::RollinRestartAllowed => &mut self.rollin_restart_allowed,
            Capability::DecommissionAllowed => &mut self.decommission_allowed,
            Capability::AddableToHost => &mut self.addable_to_host,
            Capability::Slave => &mut self.slaves,
            Capability::Master => &mut self.masters,
            Capability::Client => &mut self.clients,
        }
    }

    /// Whether `component_name` carries `capability`.
    #[must_use]
    pub fn allows(&self, capability: Capability, component_name: &str) -> bool {
        self.names(capability).iter().any(|n| n == component_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::StackCatalog;
    use crate::types::ComponentDescriptor;

    #[test]
    fn empty_source_gives_empty_index() {
        let index = CapabilityIndex::from_source(&StackCatalog::new());
        assert_eq!(index, CapabilityIndex::default());
    }

    #[test]
    fn lists_follow_catalog_order() {
        let catalog = StackCatalog::from_components(vec![
            ComponentDescriptor::new("DATANODE", "HDFS")
                .with(Capability::Slave)
                .with(Capability::DecommissionAllowed),
            ComponentDescriptor::new("NAMENODE", "HDFS")
                .with(Capability::Master)
                .with(Capability::Restartable),
            ComponentDescriptor::new("NODEMANAGER", "YARN")
                .with(Capability::Slave)
                .with(Capability::DecommissionAllowed),
            ComponentDescriptor::new("HDFS_CLIENT", "HDFS").with(Capability::Client),
        ]);

        let index = CapabilityIndex::from_source(&catalog);

        assert_eq!(
            index.all_components,
            vec!["DATANODE", "NAMENODE", "NODEMANAGER", "HDFS_CLIENT"]
        );
        assert_eq!(index.slaves, vec!["DATANODE", "NODEMANAGER"]);
        assert_eq!(index.decommission_allowed, vec!["DATANODE", "NODEMANAGER"]);
        assert_eq!(index.masters, vec!["NAMENODE"]);
        assert_eq!(index.clients, vec!["HDFS_CLIENT"]);
        assert!(index.reassignable.is_empty());
        assert!(index.allows(Capability::Restartable, "NAMENODE"));
        assert!(!index.allows(Capability::Restartable, "DATANODE"));
    }
}
