//! # stackdep-core
//!
//! The stack-component dependency reconciler - THE LOGIC.
//!
//! Cluster configuration references optional components through the
//! `host_component_names` of its configuration categories. When the active
//! stack definition omits such a component, this crate removes every trace
//! of it from three interlinked registries and records what it removed, so
//! the component can be restored if a later stack brings it back.
//!
//! ## Data Flow
//!
//! ```text
//! MetadataSource ──► Reconciler ──► { ServiceConfigRegistry,
//!        │                            PropertyRegistries,
//!        │                            ReviewConfigRegistry,
//!        │                            DisabledComponentLedger }
//!        └─────────► CapabilityIndex
//! ```
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no file I/O
//! - Registries are injected into and owned by the `Reconciler`
//! - Reconciliation never fails; missing references are no-ops
//! - Ledger state is never persisted implicitly; a `Snapshot` carries it
//!   only when a caller writes one

// =============================================================================
// MODULES
// =============================================================================

pub mod capability;
pub mod consistency;
pub mod formats;
pub mod ledger;
pub mod metadata;
pub mod primitives;
pub mod reconciler;
pub mod registry;
pub mod stack;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    Capability, ComponentDescriptor, ConfigCategory, ConfigProperty, ReviewComponent,
    ReviewService, ServiceConfig, StackDepError,
};

// =============================================================================
// RE-EXPORTS: Registries & Metadata
// =============================================================================

pub use metadata::{MetadataSource, StackCatalog, StackDefinition};
pub use registry::{
    ConfigRegistries, PropertyFile, PropertyFiles, PropertyRegistries, ReviewConfigRegistry,
    ServiceConfigRegistry,
};
pub use stack::{StackGeneration, StackVersion, compare_versions};

// =============================================================================
// RE-EXPORTS: Reconciliation
// =============================================================================

pub use capability::CapabilityIndex;
pub use consistency::{Inconsistency, check_consistency};
pub use ledger::{DisabledComponentLedger, LedgerEntry, LedgerPolicy};
pub use reconciler::{
    PassOutcome, ReconcileReport, Reconciler, ReconcilerOptions, RestoreTarget, SkipReason,
    disable_component, enable_component,
};

// =============================================================================
// RE-EXPORTS: Formats
// =============================================================================

pub use formats::{Snapshot, snapshot_from_json, snapshot_to_json, stack_definition_from_json};
