//! # Stack Versions
//!
//! Parsing of stack version identifiers (`HDP-2.0.6`, `HDPLocal-1.3.2`)
//! and the property file generation they select.
//!
//! Property files are laid out differently between stack generations, so
//! the reconciler resolves a [`StackGeneration`] once per pass and threads
//! it through every disable and enable operation.

use crate::primitives::{CURRENT_GENERATION_BASELINE, CURRENT_REQUIRE_PREFIX, LEGACY_REQUIRE_PREFIX};
use crate::StackDepError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// STACK GENERATION
// =============================================================================

/// Which property file set is active.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StackGeneration {
    /// Stacks below 2.0.
    Legacy,
    /// Stacks at 2.0 and above.
    #[default]
    Current,
}

impl StackGeneration {
    /// Every generation, legacy first.
    pub const ALL: [StackGeneration; 2] = [StackGeneration::Legacy, StackGeneration::Current];

    /// Prefix under which this generation's property files live.
    #[must_use]
    pub const fn require_prefix(self) -> &'static str {
        match self {
            StackGeneration::Legacy => LEGACY_REQUIRE_PREFIX,
            StackGeneration::Current => CURRENT_REQUIRE_PREFIX,
        }
    }

    /// Generation selected by a bare version number such as `2.0.6`.
    #[must_use]
    pub fn for_version_number(number: &str) -> Self {
        match compare_versions(number, CURRENT_GENERATION_BASELINE) {
            Ordering::Less => StackGeneration::Legacy,
            Ordering::Equal | Ordering::Greater => StackGeneration::Current,
        }
    }
}

impl fmt::Display for StackGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackGeneration::Legacy => f.write_str("legacy"),
            StackGeneration::Current => f.write_str("current"),
        }
    }
}

// =============================================================================
// STACK VERSION
// =============================================================================

/// A stack identifier of the form `<stack>-<number>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackVersion {
    stack_name: String,
    number: String,
}

impl StackVersion {
    /// Parse `HDP-2.0.6` into stack `HDP` and number `2.0.6`.
    ///
    /// The number must start with a digit; the stack name must be non-empty.
    pub fn parse(raw: &str) -> Result<Self, StackDepError> {
        let raw = raw.trim();
        let (stack_name, number) = raw
            .split_once('-')
            .ok_or_else(|| StackDepError::InvalidStackVersion(raw.to_string()))?;

        let starts_with_digit = number.chars().next().is_some_and(|c| c.is_ascii_digit());
        if stack_name.is_empty() || !starts_with_digit {
            return Err(StackDepError::InvalidStackVersion(raw.to_string()));
        }

        Ok(Self {
            stack_name: stack_name.to_string(),
            number: number.to_string(),
        })
    }

    /// Stack name, e.g. `HDP` or `HDPLocal`.
    #[must_use]
    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    /// Version number without the stack prefix, e.g. `2.0.6`.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Whether this is a locally mirrored stack.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.stack_name.ends_with("Local")
    }

    /// Property file generation selected by this version.
    #[must_use]
    pub fn generation(&self) -> StackGeneration {
        StackGeneration::for_version_number(&self.number)
    }
}

impl fmt::Display for StackVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.stack_name, self.number)
    }
}

impl FromStr for StackVersion {
    type Err = StackDepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for StackVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StackVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// VERSION COMPARISON
// =============================================================================

/// Compare two dotted version numbers segment by segment.
///
/// Missing segments count as `0`, so `2.0` equals `2.0.0`. Segments that
/// are not plain integers also count as `0`.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|segment| segment.trim().parse::<u64>().unwrap_or(0))
            .collect()
    };
    let left = parse(a);
    let right = parse(b);
    let len = left.len().max(right.len());

    (0..len)
        .map(|i| {
            let l = left.get(i).copied().unwrap_or(0);
            let r = right.get(i).copied().unwrap_or(0);
            l.cmp(&r)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

// =============================================================================
// TESTS
// =============================================================================
