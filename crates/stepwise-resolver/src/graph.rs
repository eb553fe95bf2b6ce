//! Dependency graph construction and traversal.
//!
//! Three layers are computed once per model:
//! - direct edges: each unit to its predecessor in the same namespace, plus
//!   its declared dependencies
//! - the transitive closure, keeping only the highest required version per
//!   namespace
//! - supersession: a unit that requires the predecessor of X also requires X

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use stepwise_core::unit::VersionedUnit;
use stepwise_core::version::Version;
use stepwise_util::errors::{StepwiseError, StepwiseResult};

/// Handle of a unit inside a model.
///
/// Ids follow baseline order: namespaces in configured order, versions
/// ascending within a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(usize);

impl UnitId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    fn node(self) -> NodeIndex {
        NodeIndex::new(self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why one unit directly depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// The previous unit of the same namespace.
    Predecessor,
    /// A dependency the unit declares itself.
    Declared,
}

/// Direct dependency edges plus the computed dependency closure of every unit.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Node `i` holds the version of `UnitId(i)`.
    direct: DiGraph<Version, EdgeKind>,
    closure: Vec<BTreeSet<UnitId>>,
}

impl DependencyGraph {
    /// Number of units in the graph.
    pub fn len(&self) -> usize {
        self.direct.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of direct edges (predecessor and declared).
    pub fn edge_count(&self) -> usize {
        self.direct.edge_count()
    }

    pub fn version(&self, id: UnitId) -> &Version {
        &self.direct[id.node()]
    }

    /// Full dependency closure of a unit: transitive requirements (the
    /// strongest per namespace) plus supersession-propagated ones.
    pub fn closure_of(&self, id: UnitId) -> &BTreeSet<UnitId> {
        &self.closure[id.0]
    }

    /// Direct dependencies of a unit, in baseline order.
    pub fn dependencies_of(&self, id: UnitId) -> Vec<(UnitId, EdgeKind)> {
        let mut deps: Vec<(UnitId, EdgeKind)> = self
            .direct
            .edges_directed(id.node(), Direction::Outgoing)
            .map(|e| (UnitId(e.target().index()), *e.weight()))
            .collect();
        deps.sort_by_key(|(dep, _)| *dep);
        deps
    }

    /// Units that directly depend on this one, in baseline order.
    pub fn dependents_of(&self, id: UnitId) -> Vec<(UnitId, EdgeKind)> {
        let mut deps: Vec<(UnitId, EdgeKind)> = self
            .direct
            .edges_directed(id.node(), Direction::Incoming)
            .map(|e| (UnitId(e.source().index()), *e.weight()))
            .collect();
        deps.sort_by_key(|(dep, _)| *dep);
        deps
    }

    /// Print the direct dependency tree of a unit.
    pub fn print_tree(&self, root: UnitId, max_depth: Option<usize>) -> String {
        let mut output = format!("{}\n", self.version(root));
        let mut visited = HashSet::new();
        visited.insert(root);
        let deps = self.dependencies_of(root);
        let count = deps.len();
        for (i, (dep, kind)) in deps.into_iter().enumerate() {
            self.print_subtree(
                &mut output,
                Branch {
                    id: dep,
                    kind,
                    prefix: "",
                    is_last: i == count - 1,
                    depth: 1,
                },
                max_depth,
                Direction::Outgoing,
                &mut visited,
            );
        }
        output
    }

    /// Print the tree of units that (transitively) depend directly on `root`.
    pub fn print_inverted_tree(&self, root: UnitId) -> String {
        let mut output = format!("{}\n", self.version(root));
        let mut visited = HashSet::new();
        visited.insert(root);
        let dependents = self.dependents_of(root);
        let count = dependents.len();
        for (i, (dep, kind)) in dependents.into_iter().enumerate() {
            self.print_subtree(
                &mut output,
                Branch {
                    id: dep,
                    kind,
                    prefix: "",
                    is_last: i == count - 1,
                    depth: 1,
                },
                None,
                Direction::Incoming,
                &mut visited,
            );
        }
        output
    }

    fn print_subtree(
        &self,
        output: &mut String,
        branch: Branch<'_>,
        max_depth: Option<usize>,
        direction: Direction,
        visited: &mut HashSet<UnitId>,
    ) {
        let connector = if branch.is_last { "└── " } else { "├── " };
        let marker = match branch.kind {
            EdgeKind::Predecessor => " (previous)",
            EdgeKind::Declared => "",
        };
        output.push_str(&format!(
            "{}{connector}{}{marker}\n",
            branch.prefix,
            self.version(branch.id)
        ));

        if let Some(max) = max_depth {
            if branch.depth >= max {
                return;
            }
        }

        if !visited.insert(branch.id) {
            return;
        }

        let child_prefix = format!(
            "{}{}",
            branch.prefix,
            if branch.is_last { "    " } else { "│   " }
        );
        let children = match direction {
            Direction::Outgoing => self.dependencies_of(branch.id),
            Direction::Incoming => self.dependents_of(branch.id),
        };
        let count = children.len();
        for (i, (child, kind)) in children.into_iter().enumerate() {
            self.print_subtree(
                output,
                Branch {
                    id: child,
                    kind,
                    prefix: &child_prefix,
                    is_last: i == count - 1,
                    depth: branch.depth + 1,
                },
                max_depth,
                direction,
                visited,
            );
        }

        visited.remove(&branch.id);
    }

    /// Find a chain of direct dependencies leading from `from` to `to`.
    pub fn find_path(&self, from: UnitId, to: UnitId) -> Option<Vec<UnitId>> {
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(from, to, &mut path, &mut visited) {
            Some(path)
        } else {
            None
        }
    }

    fn dfs_path(
        &self,
        current: UnitId,
        target: UnitId,
        path: &mut Vec<UnitId>,
        visited: &mut HashSet<UnitId>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for (next, _) in self.dependencies_of(current) {
            if self.dfs_path(next, target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Pick the units forming a cycle among `stuck`, i.e. units whose ordering
    /// could not make progress. Falls back to all of `stuck`.
    pub(crate) fn find_cycle(&self, stuck: &BTreeSet<UnitId>) -> Vec<UnitId> {
        let mut sub: DiGraphMap<UnitId, ()> = DiGraphMap::new();
        for &id in stuck {
            sub.add_node(id);
            for dep in self.closure_of(id).intersection(stuck) {
                sub.add_edge(id, *dep, ());
            }
        }
        tarjan_scc(&sub)
            .into_iter()
            .filter(|scc| scc.len() > 1 || sub.contains_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort();
                scc
            })
            .min_by_key(|scc| scc[0])
            .unwrap_or_else(|| stuck.iter().copied().collect())
    }
}

struct Branch<'p> {
    id: UnitId,
    kind: EdgeKind,
    prefix: &'p str,
    is_last: bool,
    depth: usize,
}

/// Single-use builder turning a baseline-ordered unit list into a [`DependencyGraph`].
pub(crate) struct GraphBuilder<'a, U> {
    units: &'a [U],
    by_namespace: &'a HashMap<String, Vec<UnitId>>,
    index: &'a HashMap<Version, UnitId>,
}

impl<'a, U: VersionedUnit> GraphBuilder<'a, U> {
    /// `units` must already be in baseline order and validated.
    pub(crate) fn new(
        units: &'a [U],
        by_namespace: &'a HashMap<String, Vec<UnitId>>,
        index: &'a HashMap<Version, UnitId>,
    ) -> Self {
        Self {
            units,
            by_namespace,
            index,
        }
    }

    pub(crate) fn build(self) -> StepwiseResult<DependencyGraph> {
        let (direct, predecessors) = self.direct_edges()?;
        let transitive: Vec<BTreeSet<UnitId>> = (0..self.units.len())
            .map(|i| transitive_closure(&direct, UnitId(i)))
            .collect();
        let closure = propagate_supersession(&transitive, &predecessors);

        tracing::debug!(
            "Built dependency graph: {} units, {} direct edges, {} closure edges",
            direct.node_count(),
            direct.edge_count(),
            closure.iter().map(BTreeSet::len).sum::<usize>()
        );

        Ok(DependencyGraph { direct, closure })
    }

    /// Predecessor edges and declared edges. Returns the graph together with
    /// each unit's predecessor, if it has one.
    fn direct_edges(&self) -> StepwiseResult<(DiGraph<Version, EdgeKind>, Vec<Option<UnitId>>)> {
        let mut graph = DiGraph::with_capacity(self.units.len(), self.units.len());
        for unit in self.units {
            graph.add_node(unit.version().clone());
        }

        let mut predecessors = vec![None; self.units.len()];
        for i in 1..self.units.len() {
            if self.units[i].version().namespace_eq(self.units[i - 1].version()) {
                predecessors[i] = Some(UnitId(i - 1));
                graph.add_edge(NodeIndex::new(i), NodeIndex::new(i - 1), EdgeKind::Predecessor);
            }
        }

        for (i, unit) in self.units.iter().enumerate() {
            for dep in unit.dependencies() {
                let populated = self
                    .by_namespace
                    .get(dep.namespace())
                    .is_some_and(|ids| !ids.is_empty());
                if !populated {
                    tracing::trace!(
                        "Dropping dependency {dep} of {}: namespace has no units",
                        unit.version()
                    );
                    continue;
                }
                let target = self.index.get(dep).ok_or_else(|| {
                    StepwiseError::UnresolvableDependency {
                        unit: unit.version().to_string(),
                        dependency: dep.to_string(),
                    }
                })?;
                let (from, to) = (NodeIndex::new(i), target.node());
                if !graph.edges(from).any(|e| e.target() == to) {
                    graph.add_edge(from, to, EdgeKind::Declared);
                }
            }
        }

        Ok((graph, predecessors))
    }
}

/// Breadth-first walk over direct edges from `start`, keeping the highest
/// version reached in each namespace.
fn transitive_closure(direct: &DiGraph<Version, EdgeKind>, start: UnitId) -> BTreeSet<UnitId> {
    let mut best: BTreeMap<&str, UnitId> = BTreeMap::new();
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut queue: VecDeque<NodeIndex> = direct.neighbors(start.node()).collect();

    while let Some(idx) = queue.pop_front() {
        if !visited.insert(idx) {
            continue;
        }
        let version = &direct[idx];
        let id = UnitId(idx.index());
        best.entry(version.namespace())
            .and_modify(|current| {
                if version.compare_version(&direct[current.node()]).is_gt() {
                    *current = id;
                }
            })
            .or_insert(id);
        queue.extend(direct.neighbors(idx).filter(|next| !visited.contains(next)));
    }

    best.into_values().collect()
}

/// For every unit X with predecessor P, each other unit whose transitive
/// closure contains P also depends on X.
fn propagate_supersession(
    transitive: &[BTreeSet<UnitId>],
    predecessors: &[Option<UnitId>],
) -> Vec<BTreeSet<UnitId>> {
    let mut holders: HashMap<UnitId, Vec<UnitId>> = HashMap::new();
    for (i, deps) in transitive.iter().enumerate() {
        for dep in deps {
            holders.entry(*dep).or_default().push(UnitId(i));
        }
    }

    let mut closure = transitive.to_vec();
    for (x, predecessor) in predecessors.iter().enumerate() {
        let Some(p) = predecessor else { continue };
        for y in holders.get(p).into_iter().flatten() {
            if y.0 != x {
                closure[y.0].insert(UnitId(x));
            }
        }
    }
    closure
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_core::unit::Unit;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    /// Build a graph from units already listed in baseline order.
    fn build(units: &[Unit]) -> StepwiseResult<DependencyGraph> {
        let mut by_namespace: HashMap<String, Vec<UnitId>> = HashMap::new();
        let mut index = HashMap::new();
        for (i, unit) in units.iter().enumerate() {
            by_namespace
                .entry(unit.version.namespace().to_string())
                .or_default()
                .push(UnitId(i));
            index.insert(unit.version.clone(), UnitId(i));
        }
        GraphBuilder::new(units, &by_namespace, &index).build()
    }

    fn closure_versions(graph: &DependencyGraph, id: usize) -> Vec<String> {
        graph
            .closure_of(UnitId(id))
            .iter()
            .map(|dep| graph.version(*dep).to_string())
            .collect()
    }

    fn scout_app() -> Vec<Unit> {
        vec![
            Unit::new(v("scout-1")),
            Unit::new(v("scout-2")),
            Unit::new(v("app-1")).depends_on(v("scout-1")),
        ]
    }

    #[test]
    fn predecessor_edges() {
        let graph = build(&scout_app()).unwrap();
        assert_eq!(
            graph.dependencies_of(UnitId(1)),
            vec![(UnitId(0), EdgeKind::Predecessor)]
        );
        assert!(graph.dependencies_of(UnitId(0)).is_empty());
    }

    #[test]
    fn declared_edges() {
        let graph = build(&scout_app()).unwrap();
        assert_eq!(
            graph.dependencies_of(UnitId(2)),
            vec![(UnitId(0), EdgeKind::Declared)]
        );
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn supersession_pulls_dependents_forward() {
        let graph = build(&scout_app()).unwrap();
        assert_eq!(closure_versions(&graph, 1), ["scout-1"]);
        assert_eq!(closure_versions(&graph, 2), ["scout-1", "scout-2"]);
    }

    #[test]
    fn supersession_moves_one_step_only() {
        let units = vec![
            Unit::new(v("scout-1")),
            Unit::new(v("scout-2")),
            Unit::new(v("scout-3")),
            Unit::new(v("app-1")).depends_on(v("scout-1")),
        ];
        let graph = build(&units).unwrap();
        assert_eq!(closure_versions(&graph, 3), ["scout-1", "scout-2"]);
        assert_eq!(closure_versions(&graph, 2), ["scout-2"]);
    }

    #[test]
    fn transitive_keeps_highest_per_namespace() {
        // core-1 <- core-2; lib-1 needs core-2; app-1 needs lib-1 and core-1.
        let units = vec![
            Unit::new(v("core-1")),
            Unit::new(v("core-2")),
            Unit::new(v("lib-1")).depends_on(v("core-2")),
            Unit::new(v("app-1"))
                .depends_on(v("lib-1"))
                .depends_on(v("core-1")),
        ];
        let graph = build(&units).unwrap();
        assert_eq!(closure_versions(&graph, 3), ["core-2", "lib-1"]);
    }

    #[test]
    fn dependency_on_empty_namespace_is_dropped() {
        let units = vec![Unit::new(v("app-1")).depends_on(v("scout-4"))];
        let mut by_namespace = HashMap::new();
        by_namespace.insert("app".to_string(), vec![UnitId(0)]);
        by_namespace.insert("scout".to_string(), Vec::new());
        let mut index = HashMap::new();
        index.insert(v("app-1"), UnitId(0));
        let graph = GraphBuilder::new(&units, &by_namespace, &index)
            .build()
            .unwrap();
        assert!(graph.closure_of(UnitId(0)).is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn missing_dependency_is_unresolvable() {
        let units = vec![
            Unit::new(v("scout-1")),
            Unit::new(v("app-1")).depends_on(v("scout-3")),
        ];
        let err = build(&units).unwrap_err();
        match err {
            StepwiseError::UnresolvableDependency { unit, dependency } => {
                assert_eq!(unit, "app-1");
                assert_eq!(dependency, "scout-3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cyclic_units_reach_themselves() {
        let units = vec![
            Unit::new(v("a-1")).depends_on(v("b-1")),
            Unit::new(v("b-1")).depends_on(v("a-1")),
        ];
        let graph = build(&units).unwrap();
        assert!(graph.closure_of(UnitId(0)).contains(&UnitId(0)));
        let stuck: BTreeSet<UnitId> = [UnitId(0), UnitId(1)].into_iter().collect();
        assert_eq!(graph.find_cycle(&stuck), vec![UnitId(0), UnitId(1)]);
    }

    #[test]
    fn tree_printing() {
        let graph = build(&scout_app()).unwrap();
        let tree = graph.print_tree(UnitId(1), None);
        assert_eq!(tree, "scout-2\n└── scout-1 (previous)\n");
    }

    #[test]
    fn inverted_tree_printing() {
        let graph = build(&scout_app()).unwrap();
        let tree = graph.print_inverted_tree(UnitId(0));
        assert!(tree.starts_with("scout-1\n"));
        assert!(tree.contains("├── scout-2 (previous)"));
        assert!(tree.contains("└── app-1"));
    }

    #[test]
    fn tree_depth_limit() {
        let units = vec![
            Unit::new(v("scout-1")),
            Unit::new(v("scout-2")),
            Unit::new(v("scout-3")),
        ];
        let graph = build(&units).unwrap();
        let tree = graph.print_tree(UnitId(2), Some(1));
        assert!(tree.contains("scout-2"));
        assert!(!tree.contains("scout-1"));
    }

    #[test]
    fn find_path_follows_direct_edges() {
        let graph = build(&scout_app()).unwrap();
        assert_eq!(graph.find_path(UnitId(2), UnitId(0)), Some(vec![UnitId(2), UnitId(0)]));
        assert_eq!(graph.find_path(UnitId(0), UnitId(2)), None);
    }
}
