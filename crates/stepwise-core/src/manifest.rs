use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use stepwise_util::errors::{StepwiseError, StepwiseResult};

use crate::unit::Unit;
use crate::version::Version;

/// The parsed representation of a `Stepwise.toml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub project: ProjectMetadata,

    #[serde(default, rename = "unit")]
    pub units: Vec<Unit>,

    /// Named baselines, each a list of one version per namespace.
    #[serde(default)]
    pub states: BTreeMap<String, Vec<Version>>,
}

/// Project identity and the ordered namespace list from `[project]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default)]
    pub name: Option<String>,
    /// Namespace names; their order breaks ties between independent units.
    pub namespaces: Vec<String>,
}

impl Manifest {
    /// Load and parse a `Stepwise.toml` from the given path.
    pub fn from_path(path: &Path) -> StepwiseResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StepwiseError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content)
    }

    /// Parse a `Stepwise.toml` from a string.
    pub fn parse_toml(content: &str) -> StepwiseResult<Self> {
        let manifest: Manifest = toml::from_str(content).map_err(|e| StepwiseError::Manifest {
            message: format!("Failed to parse Stepwise.toml: {e}"),
        })?;
        tracing::debug!(
            "Parsed manifest: {} namespaces, {} units, {} states",
            manifest.project.namespaces.len(),
            manifest.units.len(),
            manifest.states.len()
        );
        Ok(manifest)
    }

    /// Look up a named state from `[states]`.
    pub fn state(&self, name: &str) -> StepwiseResult<&[Version]> {
        self.states
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| StepwiseError::Manifest {
                message: format!("No state named '{name}' in [states]"),
            })
    }

    /// Serialize the manifest to a pretty-printed TOML string.
    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_is_error() {
        let err = Manifest::parse_toml("[[unit]]\nversion = \"scout-1\"\n").unwrap_err();
        assert!(matches!(err, StepwiseError::Manifest { .. }));
    }

    #[test]
    fn unknown_state_is_error() {
        let manifest = Manifest::parse_toml("[project]\nnamespaces = []\n").unwrap();
        assert!(manifest.state("production").is_err());
    }
}
