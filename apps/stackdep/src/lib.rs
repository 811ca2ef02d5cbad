//! # stackdep
//!
//! Command-line front end for `stackdep-core`.
//!
//! Exposed as a library so integration tests can drive the commands and
//! the configuration loader directly.

pub mod cli;
pub mod config;
