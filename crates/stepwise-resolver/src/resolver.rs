//! Core resolution algorithm: per-namespace range selection, unsatisfied
//! requirement detection, and a stable topological sort whose ties are
//! broken by baseline order.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use stepwise_core::unit::VersionedUnit;
use stepwise_core::version::Version;
use stepwise_util::errors::{StepwiseError, StepwiseResult};

use crate::graph::UnitId;
use crate::items::VersionedItems;
use crate::model::Model;

/// One version per namespace, indexed by namespace name.
type State<'s> = HashMap<&'s str, &'s Version>;

fn index_state(versions: &[Version]) -> StepwiseResult<State<'_>> {
    let mut state = HashMap::with_capacity(versions.len());
    for version in versions {
        if state.insert(version.namespace(), version).is_some() {
            return Err(StepwiseError::DuplicateNamespaceInQuery {
                namespace: version.namespace().to_string(),
            });
        }
    }
    Ok(state)
}

impl<U: VersionedUnit> Model<U> {
    /// Units needed to move from state `from` to state `to`, ordered.
    ///
    /// Each state holds at most one version per namespace. A namespace in
    /// `to` contributes the units in `(from, to]`; namespaces missing from
    /// `from` are treated as not in use and contribute nothing. Requirements
    /// outside that range which are newer than `from` are reported as
    /// unsatisfied rather than failing the call.
    pub fn resolve(&self, from: &[Version], to: &[Version]) -> StepwiseResult<VersionedItems<'_, U>> {
        let from_state = index_state(from)?;
        let to_state = index_state(to)?;

        let mut candidates = BTreeSet::new();
        for to_version in to_state.values() {
            let Some(from_version) = from_state.get(to_version.namespace()) else {
                tracing::trace!(
                    "Skipping {}: namespace not in starting state",
                    to_version.namespace()
                );
                continue;
            };
            if from_version.compare_version(to_version) != Ordering::Less {
                continue;
            }
            let Some(ids) = self.by_namespace.get(to_version.namespace()) else {
                continue;
            };
            candidates.extend(ids.iter().copied().filter(|id| {
                let version = self.unit(*id).version();
                version.compare_version(from_version) == Ordering::Greater
                    && version.compare_version(to_version) != Ordering::Greater
            }));
        }

        let items = self.order(&candidates, Some(&from_state))?;
        tracing::debug!(
            "Resolved {} units, {} unsatisfied",
            items.len(),
            items.unsatisfied().len()
        );
        Ok(items)
    }

    /// Every known unit, ordered.
    pub fn resolve_all(&self) -> StepwiseResult<VersionedItems<'_, U>> {
        let candidates: BTreeSet<UnitId> = (0..self.units.len()).map(UnitId::new).collect();
        self.order(&candidates, None)
    }

    /// Order `candidates` so every unit follows the candidates in its
    /// dependency closure. Among units that are ready at the same time the
    /// one earliest in baseline order goes first.
    ///
    /// With a starting state, closure members outside `candidates` that are
    /// newer than the state are collected as unsatisfied.
    fn order(
        &self,
        candidates: &BTreeSet<UnitId>,
        from: Option<&State<'_>>,
    ) -> StepwiseResult<VersionedItems<'_, U>> {
        let mut pending: HashMap<UnitId, usize> = HashMap::with_capacity(candidates.len());
        let mut dependents: HashMap<UnitId, Vec<UnitId>> = HashMap::new();
        let mut unsatisfied = BTreeSet::new();

        for &id in candidates {
            let mut count = 0;
            for &dep in self.graph.closure_of(id) {
                if candidates.contains(&dep) {
                    count += 1;
                    dependents.entry(dep).or_default().push(id);
                } else if let Some(from) = from {
                    let required = self.graph.version(dep);
                    if let Some(base) = from.get(required.namespace()) {
                        if required.compare_version(base) == Ordering::Greater {
                            unsatisfied.insert(dep);
                        }
                    }
                }
            }
            pending.insert(id, count);
        }

        let mut ready: BTreeSet<UnitId> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut ordered = Vec::with_capacity(candidates.len());
        while let Some(id) = ready.pop_first() {
            ordered.push(id);
            for dependent in dependents.get(&id).into_iter().flatten() {
                if let Some(count) = pending.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if ordered.len() < candidates.len() {
            let placed: BTreeSet<UnitId> = ordered.iter().copied().collect();
            let stuck: BTreeSet<UnitId> = candidates.difference(&placed).copied().collect();
            let cycle = self.graph.find_cycle(&stuck);
            return Err(StepwiseError::DependencyCycle {
                units: cycle
                    .iter()
                    .map(|id| self.graph.version(*id).to_string())
                    .collect(),
            });
        }

        Ok(VersionedItems::new(
            ordered.into_iter().map(|id| self.unit(id)).collect(),
            unsatisfied.into_iter().map(|id| self.unit(id)).collect(),
        ))
    }
}
