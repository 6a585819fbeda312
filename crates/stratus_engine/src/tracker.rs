//! Dependency bookkeeping and cycle detection.
//!
//! Declarations are colored while the interpreter evaluates them: gray
//! ([`VisitState::InProgress`]) from [`DependencyTracker::begin`] until
//! [`DependencyTracker::finish`], black ([`VisitState::Finished`]) afterwards.
//! A reference that lands on a gray declaration and needs an immediate value is
//! a cycle.
//!
//! Edges between instances are recorded with their [`EdgeKind`]. Deferred edges
//! never form a hard cycle; value and explicit edges are checked by
//! [`DependencyTracker::check_acyclic`] and ordered by
//! [`DependencyTracker::topological_order`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use indexmap::IndexMap;
use stratus_foundation::{Error, Result};

/// Evaluation state of a declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisitState {
    /// Currently being evaluated (gray).
    InProgress,
    /// Fully evaluated (black).
    Finished,
}

/// Why one instance depends on another.
///
/// Ordered by strength: when the same pair is recorded twice, the stronger
/// kind is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    /// Waits on a cloud-managed value; the property stays null until apply.
    Deferred,
    /// Declared with `@dependsOn`; the target is never evaluated for it.
    Explicit,
    /// Read a concrete value of the target.
    Value,
}

impl EdgeKind {
    /// Returns true for edges that must be satisfied before the dependent
    /// can be created.
    #[must_use]
    pub const fn is_hard(self) -> bool {
        !matches!(self, Self::Deferred)
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deferred => write!(f, "deferred"),
            Self::Explicit => write!(f, "explicit"),
            Self::Value => write!(f, "value"),
        }
    }
}

/// Tracks in-progress declarations and the dependency graph of a run.
#[derive(Clone, Debug, Default)]
pub struct DependencyTracker {
    states: HashMap<String, VisitState>,
    stack: Vec<String>,
    edges: IndexMap<String, IndexMap<String, EdgeKind>>,
    groups: IndexMap<String, Vec<String>>,
}

impl DependencyTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Gray / black marking
    // =========================================================================

    /// Marks `name` as in progress.
    ///
    /// # Errors
    /// Returns `Cycle` if `name` is already in progress.
    pub fn begin(&mut self, name: &str) -> Result<()> {
        if self.is_in_progress(name) {
            return Err(Error::cycle(self.cycle_path(name)));
        }
        self.states.insert(name.to_string(), VisitState::InProgress);
        self.stack.push(name.to_string());
        Ok(())
    }

    /// Marks `name` as finished and pops it off the evaluation stack.
    pub fn finish(&mut self, name: &str) {
        if let Some(pos) = self.stack.iter().rposition(|n| n == name) {
            self.stack.remove(pos);
        }
        self.states.insert(name.to_string(), VisitState::Finished);
    }

    /// Forgets an in-progress mark without finishing, used when evaluation
    /// of `name` failed.
    pub fn abandon(&mut self, name: &str) {
        if let Some(pos) = self.stack.iter().rposition(|n| n == name) {
            self.stack.remove(pos);
        }
        self.states.remove(name);
    }

    /// Current state of `name`, if it has been visited.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<VisitState> {
        self.states.get(name).copied()
    }

    /// Returns true if `name` is gray.
    #[must_use]
    pub fn is_in_progress(&self, name: &str) -> bool {
        self.state(name) == Some(VisitState::InProgress)
    }

    /// Returns true if `name` is black.
    #[must_use]
    pub fn is_finished(&self, name: &str) -> bool {
        self.state(name) == Some(VisitState::Finished)
    }

    /// Declarations currently being evaluated, outermost first.
    #[must_use]
    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    /// The chain of in-progress declarations from `name` to the innermost,
    /// closed with `name` again: `a -> b -> a`.
    #[must_use]
    pub fn cycle_path(&self, name: &str) -> Vec<String> {
        let mut path: Vec<String> = self
            .stack
            .iter()
            .skip_while(|n| *n != name)
            .cloned()
            .collect();
        if path.is_empty() {
            path.push(name.to_string());
        }
        path.push(name.to_string());
        path
    }

    // =========================================================================
    // Edges
    // =========================================================================

    /// Records that `from` depends on `to`. Self edges are ignored.
    pub fn add_edge(&mut self, from: &str, to: &str, kind: EdgeKind) {
        if from == to {
            return;
        }
        let targets = self.edges.entry(from.to_string()).or_default();
        let slot = targets.entry(to.to_string()).or_insert(kind);
        *slot = (*slot).max(kind);
    }

    /// Registers `name` as a graph node even if it has no dependencies.
    pub fn add_node(&mut self, name: &str) {
        self.edges.entry(name.to_string()).or_default();
    }

    /// Records the instances a counted declaration `base` expanded into.
    pub fn add_group(&mut self, base: &str, members: impl IntoIterator<Item = String>) {
        self.groups.insert(base.to_string(), members.into_iter().collect());
    }

    /// Rewrites edges that target a group's base name into edges to each of
    /// its instances.
    ///
    /// Explicit dependencies on a declaration that had not been evaluated yet
    /// are recorded against its base name; this resolves them once every
    /// declaration has run.
    pub fn expand_groups(&mut self) {
        let groups = &self.groups;
        for targets in self.edges.values_mut() {
            let grouped: Vec<String> = targets
                .keys()
                .filter(|t| groups.contains_key(t.as_str()))
                .cloned()
                .collect();
            for base in grouped {
                let Some(kind) = targets.shift_remove(&base) else {
                    continue;
                };
                for member in &groups[&base] {
                    let slot = targets.entry(member.clone()).or_insert(kind);
                    *slot = (*slot).max(kind);
                }
            }
        }
    }

    /// Dependencies of `name` with their kinds, in recording order.
    #[must_use]
    pub fn dependencies_of(&self, name: &str) -> Vec<(&str, EdgeKind)> {
        self.edges
            .get(name)
            .map(|targets| targets.iter().map(|(t, k)| (t.as_str(), *k)).collect())
            .unwrap_or_default()
    }

    /// Every node that has been registered or has dependencies.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Number of recorded edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(IndexMap::len).sum()
    }

    /// Checks the hard (non-deferred) edges for cycles.
    ///
    /// # Errors
    /// Returns `Cycle` with the offending path.
    pub fn check_acyclic(&self) -> Result<()> {
        let graph = self.hard_graph();
        let mut colors: HashMap<&str, VisitState> = HashMap::new();
        let mut path: Vec<&str> = Vec::new();

        for start in graph.keys() {
            if colors.contains_key(start) {
                continue;
            }
            if let Some(cycle) = dfs(&graph, *start, &mut colors, &mut path) {
                return Err(Error::cycle(cycle));
            }
        }
        Ok(())
    }

    /// Orders every node so dependencies come before dependents.
    ///
    /// Ties are broken alphabetically, so the order is stable across runs.
    /// Deferred edges are ignored; targets that were never registered as
    /// nodes (such as instances of a deferred template) are left out.
    ///
    /// # Errors
    /// Returns `Cycle` if the hard edges contain a cycle.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        self.check_acyclic()?;
        let graph = self.hard_graph();

        let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for (node, targets) in &graph {
            let known: Vec<&str> = targets
                .iter()
                .copied()
                .filter(|t| graph.contains_key(t))
                .collect();
            pending.insert(*node, known.len());
            for target in known {
                dependents.entry(target).or_default().push(*node);
            }
        }

        let mut ready: BTreeSet<&str> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut order = Vec::with_capacity(pending.len());

        while let Some(node) = ready.pop_first() {
            order.push(node.to_string());
            for &dependent in dependents.get(node).into_iter().flatten() {
                if let Some(count) = pending.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        Ok(order)
    }

    fn hard_graph(&self) -> BTreeMap<&str, Vec<&str>> {
        self.edges
            .iter()
            .map(|(from, targets)| {
                let hard = targets
                    .iter()
                    .filter(|(_, kind)| kind.is_hard())
                    .map(|(to, _)| to.as_str())
                    .collect();
                (from.as_str(), hard)
            })
            .collect()
    }
}

fn dfs<'a>(
    graph: &BTreeMap<&'a str, Vec<&'a str>>,
    node: &'a str,
    colors: &mut HashMap<&'a str, VisitState>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    colors.insert(node, VisitState::InProgress);
    path.push(node);

    for &next in graph.get(node).into_iter().flatten() {
        match colors.get(next) {
            Some(VisitState::InProgress) => {
                let mut cycle: Vec<String> = path
                    .iter()
                    .skip_while(|n| **n != next)
                    .map(|n| (*n).to_string())
                    .collect();
                cycle.push(next.to_string());
                return Some(cycle);
            }
            Some(VisitState::Finished) => {}
            None => {
                if let Some(cycle) = dfs(graph, next, colors, path) {
                    return Some(cycle);
                }
            }
        }
    }

    path.pop();
    colors.insert(node, VisitState::Finished);
    None
}
