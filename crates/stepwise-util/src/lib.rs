//! Shared utilities for stepwise.
//!
//! This crate provides the cross-cutting concerns used by the other stepwise
//! crates: the unified error type, filesystem helpers for locating manifests,
//! and Cargo-style terminal status lines.

pub mod errors;
pub mod fs;
pub mod status;
