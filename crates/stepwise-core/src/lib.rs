//! Core data types for stepwise.
//!
//! This crate defines the values the resolver works on: namespace-scoped
//! versions, the versioned-unit abstraction and a concrete unit type, the
//! `Stepwise.toml` manifest that supplies units to the command-line tool, and
//! the global user configuration.
//!
//! This crate is intentionally free of graph logic.

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "Stepwise.toml";

pub mod config;
pub mod manifest;
pub mod unit;
pub mod version;
