//! Dependency resolution engine: per-namespace version ranges, transitive
//! dependency closure with supersession propagation, and deterministic
//! dependency-respecting ordering of versioned units.

pub mod graph;
pub mod items;
pub mod model;
pub mod resolver;

pub use graph::{DependencyGraph, EdgeKind, UnitId};
pub use items::VersionedItems;
pub use model::Model;
