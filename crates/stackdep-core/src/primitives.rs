//! # Primitives
//!
//! Hardcoded constants shared across the reconciler.
//!
//! These are compiled into the binary and are immutable at runtime.

/// First stack version number that uses the current property file layout.
///
/// Stacks at or above this version read their property files from the
/// `data/HDP2/` set; older stacks use the legacy `data/` set.
pub const CURRENT_GENERATION_BASELINE: &str = "2.0";

/// Location of the legacy property file set.
pub const LEGACY_REQUIRE_PREFIX: &str = "data/";

/// Location of the current property file set.
pub const CURRENT_REQUIRE_PREFIX: &str = "data/HDP2/";

/// File name of the global property registry.
pub const GLOBAL_PROPERTIES_FILE: &str = "global_properties";

/// File name of the site property registry.
pub const SITE_PROPERTIES_FILE: &str = "site_properties";

/// Maximum accepted snapshot payload (64 MB).
///
/// Checked before decoding so a corrupted or hostile file cannot force a
/// large allocation.
pub const MAX_SNAPSHOT_SIZE: usize = 64 * 1024 * 1024;
