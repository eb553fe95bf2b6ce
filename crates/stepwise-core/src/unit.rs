//! Versioned units: the items the resolver orders.

use serde::{Deserialize, Serialize};

use crate::version::Version;

/// Anything keyed by a unique [`Version`] that may require other versions.
///
/// The resolver never looks past these two accessors; what a unit does when
/// applied is up to the caller.
pub trait VersionedUnit {
    /// The version this unit brings its namespace to.
    fn version(&self) -> &Version;

    /// Minimum versions of other (or the same) namespaces that must be
    /// applied first. At most one entry per namespace.
    fn dependencies(&self) -> &[Version];
}

/// A plain versioned unit, as declared in `Stepwise.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub version: Version,
    #[serde(default, rename = "depends")]
    pub dependencies: Vec<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Unit {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            dependencies: Vec::new(),
            description: None,
        }
    }

    /// Add a dependency on `version`.
    pub fn depends_on(mut self, version: Version) -> Self {
        self.dependencies.push(version);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl VersionedUnit for Unit {
    fn version(&self) -> &Version {
        &self.version
    }

    fn dependencies(&self) -> &[Version] {
        &self.dependencies
    }
}

impl<T: VersionedUnit + ?Sized> VersionedUnit for Box<T> {
    fn version(&self) -> &Version {
        (**self).version()
    }

    fn dependencies(&self) -> &[Version] {
        (**self).dependencies()
    }
}
