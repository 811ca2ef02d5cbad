//! # Formats Module
//!
//! JSON encodings for snapshots and stack definitions.
//!
//! All functions are pure transformations between bytes and values; file
//! I/O lives in the app layer.

mod snapshot;

pub use snapshot::*;
