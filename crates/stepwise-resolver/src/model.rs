//! The immutable resolution model.
//!
//! A [`Model`] is built once from the ordered namespace names and every known
//! unit. Construction validates the units, computes the dependency graph and
//! runs a full-range resolution as a self-check; afterwards the model is only
//! read.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use stepwise_core::unit::VersionedUnit;
use stepwise_core::version::Version;
use stepwise_util::errors::{StepwiseError, StepwiseResult};

use crate::graph::{DependencyGraph, GraphBuilder, UnitId};

/// Validated units, their dependency graph and per-namespace lookups.
#[derive(Debug)]
pub struct Model<U> {
    names: Vec<String>,
    /// Baseline order; `UnitId(i)` is `units[i]`.
    pub(crate) units: Vec<U>,
    pub(crate) by_namespace: HashMap<String, Vec<UnitId>>,
    index: HashMap<Version, UnitId>,
    pub(crate) graph: DependencyGraph,
}

impl<U: VersionedUnit> Model<U> {
    /// Build and validate a model.
    ///
    /// `names` orders the namespaces: independent units are applied in this
    /// order. Every unit must belong to one of them.
    pub fn new<N, I>(names: N, units: I) -> StepwiseResult<Self>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        I: IntoIterator<Item = U>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut rank: HashMap<&str, usize> = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            if rank.insert(name.as_str(), i).is_some() {
                return Err(StepwiseError::DuplicateNamespace {
                    namespace: name.clone(),
                });
            }
        }

        let mut ranked = Vec::new();
        for unit in units {
            let position = validate_unit(&unit, &rank)?;
            ranked.push((position, unit));
        }
        ranked.sort_by(|(ra, a), (rb, b)| {
            ra.cmp(rb)
                .then_with(|| a.version().compare_version(b.version()))
        });
        for pair in ranked.windows(2) {
            if pair[0].1.version() == pair[1].1.version() {
                return Err(StepwiseError::DuplicateUnit {
                    version: pair[1].1.version().to_string(),
                });
            }
        }
        let units: Vec<U> = ranked.into_iter().map(|(_, unit)| unit).collect();

        let mut by_namespace: HashMap<String, Vec<UnitId>> = names
            .iter()
            .map(|name| (name.clone(), Vec::new()))
            .collect();
        let mut index = HashMap::with_capacity(units.len());
        for (i, unit) in units.iter().enumerate() {
            let id = UnitId::new(i);
            if let Some(ids) = by_namespace.get_mut(unit.version().namespace()) {
                ids.push(id);
            }
            index.insert(unit.version().clone(), id);
        }

        let graph = GraphBuilder::new(&units, &by_namespace, &index).build()?;
        let model = Self {
            names,
            units,
            by_namespace,
            index,
            graph,
        };
        model.self_check()?;

        tracing::debug!(
            "Model ready: {} units across {} namespaces",
            model.units.len(),
            model.names.len()
        );
        Ok(model)
    }

    /// Resolve every namespace from its initial version to its latest one and
    /// require the result to be fully satisfied, then order every unit so
    /// units at the initial version are checked for cycles too.
    fn self_check(&self) -> StepwiseResult<()> {
        let items = self.resolve(&self.initial_state(), &self.latest_state())?;
        if items.is_valid() {
            self.resolve_all()?;
            return Ok(());
        }
        Err(StepwiseError::Unsatisfied {
            versions: items
                .unsatisfied_versions()
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
    }

    /// Configured namespace names, in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// All units in baseline order.
    pub fn units(&self) -> &[U] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> &U {
        &self.units[id.index()]
    }

    pub fn id_of(&self, version: &Version) -> Option<UnitId> {
        self.index.get(version).copied()
    }

    /// The direct dependency graph and computed closures.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// The unit with exactly this version.
    pub fn lookup_exact(&self, version: &Version) -> Option<&U> {
        self.id_of(version).map(|id| self.unit(id))
    }

    /// The nearest unit strictly before `version` in the same namespace.
    /// `version` itself does not need to belong to a unit.
    pub fn lookup_previous(&self, version: &Version) -> Option<&U> {
        let ids = self.by_namespace.get(version.namespace())?;
        let below = ids.partition_point(|id| {
            self.unit(*id).version().compare_version(version) == Ordering::Less
        });
        below.checked_sub(1).map(|i| self.unit(ids[i]))
    }

    /// Units of a namespace, ascending. Empty for unknown namespaces.
    pub fn list(&self, namespace: &str) -> Vec<&U> {
        self.by_namespace
            .get(namespace)
            .map(|ids| ids.iter().map(|id| self.unit(*id)).collect())
            .unwrap_or_default()
    }

    /// The highest unit of a namespace.
    pub fn latest(&self, namespace: &str) -> Option<&U> {
        let ids = self.by_namespace.get(namespace)?;
        ids.last().map(|id| self.unit(*id))
    }

    /// The latest version of every namespace that has units.
    pub fn latest_state(&self) -> Vec<Version> {
        self.names
            .iter()
            .filter_map(|name| self.latest(name))
            .map(|unit| unit.version().clone())
            .collect()
    }

    /// `namespace-0` for every configured namespace.
    pub fn initial_state(&self) -> Vec<Version> {
        self.names.iter().map(Version::initial).collect()
    }

    /// The full dependency closure of a unit, in baseline order.
    pub fn dependencies_of(&self, version: &Version) -> Option<Vec<&U>> {
        let id = self.id_of(version)?;
        Some(
            self.graph
                .closure_of(id)
                .iter()
                .map(|dep| self.unit(*dep))
                .collect(),
        )
    }
}

/// Check a unit against the configured namespaces. Returns the position of
/// its namespace.
fn validate_unit<U: VersionedUnit>(unit: &U, rank: &HashMap<&str, usize>) -> StepwiseResult<usize> {
    let version = unit.version();
    let position = rank
        .get(version.namespace())
        .copied()
        .ok_or_else(|| StepwiseError::UnknownNamespace {
            unit: version.to_string(),
            namespace: version.namespace().to_string(),
        })?;

    let mut seen = HashSet::new();
    for dep in unit.dependencies() {
        if !seen.insert(dep.namespace()) {
            return Err(StepwiseError::DuplicateDependencyNamespace {
                unit: version.to_string(),
                namespace: dep.namespace().to_string(),
            });
        }
        if !rank.contains_key(dep.namespace()) {
            return Err(StepwiseError::UnknownNamespace {
                unit: version.to_string(),
                namespace: dep.namespace().to_string(),
            });
        }
    }
    Ok(position)
}
