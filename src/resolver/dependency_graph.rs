//! Coordinate-level dependency graph used for cycle detection.
//!
//! While the collector expands the dependency tree it records every edge
//! here, keyed by full coordinate id. The collector itself only sees cycles
//! along the path it is expanding; a subtree it records as a duplicate is
//! never walked again, so a cycle closing through one is only visible here.
//! After collection the whole graph is checked once and a cycle aborts with
//! [`HpkgError::CircularDependency`].

use crate::core::HpkgError;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Directed graph of `groupId:artifactId:type[:classifier]:version` ids.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(id) {
            index
        } else {
            let index = self.graph.add_node(id.to_string());
            self.node_map.insert(id.to_string(), index);
            index
        }
    }

    /// Adds a node without edges (the root of a collection).
    pub fn add_node(&mut self, id: &str) {
        self.ensure_node(id);
    }

    /// Records that `from` depends on `to`.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);
        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Detect cycles using DFS with colors.
    ///
    /// # Errors
    ///
    /// [`HpkgError::CircularDependency`] with the cycle rendered as
    /// `a -> b -> a`.
    pub fn detect_cycles(&self) -> Result<(), HpkgError> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|n| (n, Color::White)).collect();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White))
                && let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path)
            {
                let chain = cycle
                    .iter()
                    .map(|idx| self.graph[*idx].as_str())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(HpkgError::CircularDependency {
                    chain,
                });
            }
        }
        Ok(())
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for neighbor in self.graph.neighbors(node) {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acyclic_graph() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("root", "a");
        graph.add_dependency("root", "b");
        graph.add_dependency("a", "c");
        graph.add_dependency("b", "c");
        graph.add_dependency("b", "c");

        assert!(graph.detect_cycles().is_ok());
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_cycle_reports_chain() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("root", "a");
        graph.add_dependency("a", "b");
        graph.add_dependency("b", "a");

        match graph.detect_cycles() {
            Err(HpkgError::CircularDependency {
                chain,
            }) => assert_eq!(chain, "a -> b -> a"),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_isolated_node() {
        let mut graph = DependencyGraph::new();
        graph.add_node("root");
        assert_eq!(graph.node_count(), 1);
        assert!(graph.detect_cycles().is_ok());
    }
}
