//! Property registries, partitioned by file and by stack generation.

use crate::primitives::{GLOBAL_PROPERTIES_FILE, SITE_PROPERTIES_FILE};
use crate::stack::StackGeneration;
use crate::types::ConfigProperty;
use crate::StackDepError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// PROPERTY FILE
// =============================================================================

/// The originating file of a property record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyFile {
    Global,
    Site,
}

impl PropertyFile {
    /// Global first, then site.
    pub const ALL: [PropertyFile; 2] = [PropertyFile::Global, PropertyFile::Site];

    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            PropertyFile::Global => GLOBAL_PROPERTIES_FILE,
            PropertyFile::Site => SITE_PROPERTIES_FILE,
        }
    }
}

impl fmt::Display for PropertyFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl FromStr for PropertyFile {
    type Err = StackDepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            GLOBAL_PROPERTIES_FILE | "global" => Ok(PropertyFile::Global),
            SITE_PROPERTIES_FILE | "site" => Ok(PropertyFile::Site),
            other => Err(StackDepError::UnknownPropertyFile(other.to_string())),
        }
    }
}

// =============================================================================
// PROPERTY FILES (one generation)
// =============================================================================

/// The global and site property lists of one generation.
///
/// Also used by ledger entries to hold records captured per file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFiles {
    #[serde(default)]
    pub global_properties: Vec<ConfigProperty>,
    #[serde(default)]
    pub site_properties: Vec<ConfigProperty>,
}

impl PropertyFiles {
    #[must_use]
    pub fn new(global_properties: Vec<ConfigProperty>, site_properties: Vec<ConfigProperty>) -> Self {
        Self {
            global_properties,
            site_properties,
        }
    }

    #[must_use]
    pub fn file(&self, file: PropertyFile) -> &[ConfigProperty] {
        match file {
            PropertyFile::Global => &self.global_properties,
            PropertyFile::Site => &self.site_properties,
        }
    }

    pub fn file_mut(&mut self, file: PropertyFile) -> &mut Vec<ConfigProperty> {
        match file {
            PropertyFile::Global => &mut self.global_properties,
            PropertyFile::Site => &mut self.site_properties,
        }
    }

    /// Remove every record of `file` whose category is `category`.
    ///
    /// Kept records stay in order; removed records are returned in the
    /// order they appeared.
    pub fn take_category(&mut self, file: PropertyFile, category: &str) -> Vec<ConfigProperty> {
        let records = std::mem::take(self.file_mut(file));
        let (removed, kept): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|p| p.category == category);
        *self.file_mut(file) = kept;
        removed
    }

    /// Append `records` to the end of `file`.
    pub fn append(&mut self, file: PropertyFile, records: impl IntoIterator<Item = ConfigProperty>) {
        self.file_mut(file).extend(records);
    }

    /// Total records across both files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.global_properties.len() + self.site_properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global_properties.is_empty() && self.site_properties.is_empty()
    }

    /// Every (file, record) pair, global first.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyFile, &ConfigProperty)> {
        PropertyFile::ALL
            .into_iter()
            .flat_map(move |file| self.file(file).iter().map(move |p| (file, p)))
    }
}

// =============================================================================
// PROPERTY REGISTRIES (both generations)
// =============================================================================

/// Property files for the legacy and current stack generations.
///
/// Only the generation selected by the active stack is touched during a
/// reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRegistries {
    #[serde(default)]
    pub legacy: PropertyFiles,
    #[serde(default)]
    pub current: PropertyFiles,
}

impl PropertyRegistries {
    #[must_use]
    pub fn new(legacy: PropertyFiles, current: PropertyFiles) -> Self {
        Self { legacy, current }
    }

    #[must_use]
    pub fn files(&self, generation: StackGeneration) -> &PropertyFiles {
        match generation {
            StackGeneration::Legacy => &self.legacy,
            StackGeneration::Current => &self.current,
        }
    }

    pub fn files_mut(&mut self, generation: StackGeneration) -> &mut PropertyFiles {
        match generation {
            StackGeneration::Legacy => &mut self.legacy,
            StackGeneration::Current => &mut self.current,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
