//! # Core Type Definitions
//!
//! This module contains the data model shared by every registry:
//! - Component descriptors and their capability flags (`ComponentDescriptor`, `Capability`)
//! - Service configuration (`ServiceConfig`, `ConfigCategory`)
//! - Configuration properties (`ConfigProperty`)
//! - Review summaries (`ReviewService`, `ReviewComponent`)
//! - Error types (`StackDepError`)
//!
//! ## Ownership
//!
//! Descriptors are supplied wholesale by the metadata source and are only
//! read here. Categories, properties and review summaries live in the
//! registries and are moved in and out of the ledger by the reconciler.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// CAPABILITIES
// =============================================================================

/// A boolean capability flag carried by every component descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Reassignable,
    Restartable,
    Deletable,
    RollinRestartAllowed,
    DecommissionAllowed,
    AddableToHost,
    Slave,
    Master,
    Client,
}

impl Capability {
    /// Every capability, in capability-index field order.
    pub const ALL: [Capability; 9] = [
        Capability::Reassignable,
        Capability::Restartable,
        Capability::Deletable,
        Capability::RollinRestartAllowed,
        Capability::DecommissionAllowed,
        Capability::AddableToHost,
        Capability::Slave,
        Capability::Master,
        Capability::Client,
    ];

    /// Name of the capability-index list holding components with this flag.
    #[must_use]
    pub const fn index_name(self) -> &'static str {
        match self {
            Capability::Reassignable => "reassignable",
            Capability::Restartable => "restartable",
            Capability::Deletable => "deletable",
            Capability::RollinRestartAllowed => "rollin_restart_allowed",
            Capability::DecommissionAllowed => "decommission_allowed",
            Capability::AddableToHost => "addable_to_host",
            Capability::Slave => "slaves",
            Capability::Master => "masters",
            Capability::Client => "clients",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.index_name())
    }
}

impl FromStr for Capability {
    type Err = StackDepError;

    /// Accepts the index list name (`slaves`) or the singular flag name (`slave`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Capability::ALL
            .into_iter()
            .find(|cap| {
                let name = cap.index_name();
                name == normalized || name.strip_suffix('s') == Some(normalized.as_str())
            })
            .ok_or_else(|| StackDepError::UnknownCapability(s.to_string()))
    }
}

// =============================================================================
// COMPONENT DESCRIPTOR
// =============================================================================

/// Identifies one deployable unit of the active stack.
///
/// Only `component_name` and `service_name` are needed to disable a
/// component; the reconciler synthesizes such minimal descriptors for
/// components referenced by configuration but absent from the stack.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentDescriptor {
    pub component_name: String,
    pub service_name: String,
    pub is_reassignable: bool,
    pub is_restartable: bool,
    pub is_deletable: bool,
    pub is_rollin_restart_allowed: bool,
    pub is_decommission_allowed: bool,
    pub is_addable_to_host: bool,
    pub is_slave: bool,
    pub is_master: bool,
    pub is_client: bool,
}

impl ComponentDescriptor {
    /// Create a minimal descriptor with every capability flag cleared.
    #[must_use]
    pub fn new(component_name: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            service_name: service_name.into(),
            ..Self::default()
        }
    }

    /// Builder-style helper that sets one capability flag.
    #[must_use]
    pub fn with(mut self, capability: Capability) -> Self {
        *self.flag_mut(capability) = true;
        self
    }

    /// Check a capability flag.
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Reassignable => self.is_reassignable,
            Capability::Restartable => self.is_restartable,
            Capability::Deletable => self.is_deletable,
            Capability::RollinRestartAllowed => self.is_rollin_restart_allowed,
            Capability::DecommissionAllowed => self.is_decommission_allowed,
            Capability::AddableToHost => self.is_addable_to_host,
            Capability::Slave => self.is_slave,
            Capability::Master => self.is_master,
            Capability::Client => self.is_client,
        }
    }

    fn flag_mut(&mut self, capability: Capability) -> &mut bool {
        match capability {
            Capability::Reassignable => &mut self.is_reassignable,
            Capability::Restartable => &mut self.is_restartable,
            Capability::Deletable => &mut self.is_deletable,
            Capability::RollinRestartAllowed => &mut self.is_rollin_restart_allowed,
            Capability::DecommissionAllowed => &mut self.is_decommission_allowed,
            Capability::AddableToHost => &mut self.is_addable_to_host,
            Capability::Slave => &mut self.is_slave,
            Capability::Master => &mut self.is_master,
            Capability::Client => &mut self.is_client,
        }
    }
}

// =============================================================================
// SERVICE CONFIGURATION
// =============================================================================

/// A named grouping of properties belonging to one service.
///
/// When `host_component_names` is non-empty, every property whose
/// `category` equals `name` is owned by those components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigCategory {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_component_names: Option<Vec<String>>,
}

impl ConfigCategory {
    /// Create a category that is not bound to any component.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            host_component_names: None,
        }
    }

    /// Create a category owned by the given components.
    #[must_use]
    pub fn owned_by<I, S>(name: impl Into<String>, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            display_name: None,
            host_component_names: Some(components.into_iter().map(Into::into).collect()),
        }
    }

    /// Owning component names; empty when the category is unbound.
    #[must_use]
    pub fn host_components(&self) -> &[String] {
        self.host_component_names.as_deref().unwrap_or(&[])
    }

    /// Whether `component_name` is listed as an owner of this category.
    #[must_use]
    pub fn is_owned_by(&self, component_name: &str) -> bool {
        self.host_components().iter().any(|c| c == component_name)
    }
}

/// Configuration categories of one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub config_categories: Vec<ConfigCategory>,
}

impl ServiceConfig {
    #[must_use]
    pub fn new(service_name: impl Into<String>, config_categories: Vec<ConfigCategory>) -> Self {
        Self {
            service_name: service_name.into(),
            display_name: None,
            config_categories,
        }
    }

    /// First category owned by `component_name`, in declaration order.
    ///
    /// When several categories list the component, later ones are never
    /// returned.
    #[must_use]
    pub fn category_for(&self, component_name: &str) -> Option<&ConfigCategory> {
        self.config_categories
            .iter()
            .find(|category| category.is_owned_by(component_name))
    }

    /// Whether any category of this service is named `category`.
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.config_categories.iter().any(|c| c.name == category)
    }
}

// =============================================================================
// CONFIGURATION PROPERTY
// =============================================================================

/// One configuration property record from a property file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigProperty {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ConfigProperty {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            value: value.into(),
            service_name: None,
            display_name: None,
        }
    }
}

// =============================================================================
// REVIEW CONFIGURATION
// =============================================================================

/// A component as shown to an operator for review before deployment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReviewComponent {
    pub component_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_value: Option<String>,
}

impl ReviewComponent {
    #[must_use]
    pub fn new(component_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            display_name: Some(display_name.into()),
            component_value: None,
        }
    }
}

/// Review entry for one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewService {
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub service_components: Vec<ReviewComponent>,
}

impl ReviewService {
    #[must_use]
    pub fn new(service_name: impl Into<String>, service_components: Vec<ReviewComponent>) -> Self {
        Self {
            service_name: service_name.into(),
            display_name: None,
            service_components,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised at the edges of the reconciler.
///
/// Reconciliation itself never fails: a missing reference is a no-op.
/// These errors come from parsing versions, decoding snapshots and
/// reading configuration.
#[derive(Debug, Error)]
pub enum StackDepError {
    /// The stack version string cannot be parsed.
    #[error("Invalid stack version: {0:?}")]
    InvalidStackVersion(String),

    /// The capability name is not one of the nine known flags.
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    /// The property file name is not `global_properties` or `site_properties`.
    #[error("Unknown property file: {0}")]
    UnknownPropertyFile(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// A payload exceeds the accepted size.
    #[error("Payload of {size} bytes exceeds maximum of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The configuration file is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A consistency check found problems.
    #[error("{count} consistency problem(s) found")]
    Inconsistent { count: usize },
}

// =============================================================================
// TESTS
// =============================================================================
