// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use petgraph::{
    prelude::DiGraph,
    visit::{Dfs, Topo, Walker},
};

use self::subgraph::subgraph;

mod subgraph;

pub type NodeIndex = petgraph::prelude::NodeIndex<u32>;

/// A thin wrapper over `petgraph::DiGraph` keyed by node identity
/// rather than index, so callers never have to track indices
/// themselves.
#[derive(Debug, Clone)]
pub struct Dag<N>(DiGraph<N, (), u32>);

impl<N> Default for Dag<N> {
    fn default() -> Self {
        Self(DiGraph::default())
    }
}

impl<N> Dag<N>
where
    N: Clone + PartialEq,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node_or_get_index(&mut self, node: N) -> NodeIndex {
        if let Some(index) = self.get_index(&node) {
            index
        } else {
            self.0.add_node(node)
        }
    }

    pub fn node_exists(&self, node: &N) -> bool {
        self.get_index(node).is_some()
    }

    /// Adds an edge `a -> b`. Returns `false` without mutating the graph
    /// if the edge would close a cycle or already exists.
    pub fn add_edge(&mut self, a: NodeIndex, b: NodeIndex) -> bool {
        let a_node = &self.0[a];

        if self.dfs(b).any(|n| n == a_node) {
            return false;
        }
        if self.0.find_edge(a, b).is_some() {
            return false;
        }

        self.0.add_edge(a, b, ());
        true
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = &'_ N> {
        self.0.node_indices().map(|i| &self.0[i])
    }

    pub fn dfs(&self, start: NodeIndex) -> impl Iterator<Item = &'_ N> {
        let dfs = Dfs::new(&self.0, start);
        dfs.iter(&self.0).map(|i| &self.0[i])
    }

    /// Deterministic topological order: `petgraph::visit::Topo` visits
    /// nodes in index-insertion order among those with no remaining
    /// incoming edges, so insertion order (not hashing) decides ties.
    pub fn topo(&self) -> impl Iterator<Item = &'_ N> {
        let topo = Topo::new(&self.0);
        topo.iter(&self.0).map(|i| &self.0[i])
    }

    pub fn transpose(&self) -> Self {
        let mut transposed = self.0.clone();
        transposed.reverse();
        Self(transposed)
    }

    pub fn subgraph(&self, starting_nodes: &[N]) -> Self {
        Self(subgraph(&self.0, starting_nodes))
    }

    pub fn get_index(&self, node: &N) -> Option<NodeIndex> {
        self.0.node_indices().find(|i| self.0[*i] == *node)
    }

    /// `true` if adding edge `a -> b` would close a cycle, without
    /// mutating the graph.
    pub fn would_cycle(&self, a: NodeIndex, b: NodeIndex) -> bool {
        let a_node = &self.0[a];
        self.dfs(b).any(|n| n == a_node)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_cyclic_edge() {
        let mut dag: Dag<&str> = Dag::new();
        let a = dag.add_node_or_get_index("a");
        let b = dag.add_node_or_get_index("b");
        assert!(dag.add_edge(a, b));
        assert!(!dag.add_edge(b, a));
    }

    #[test]
    fn topo_is_stable_across_repeated_calls() {
        let mut dag: Dag<&str> = Dag::new();
        let a = dag.add_node_or_get_index("a");
        let b = dag.add_node_or_get_index("b");
        let c = dag.add_node_or_get_index("c");
        dag.add_edge(a, b);
        dag.add_edge(b, c);

        let first: Vec<_> = dag.topo().copied().collect();
        let second: Vec<_> = dag.topo().copied().collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["a", "b", "c"]);
    }
}
