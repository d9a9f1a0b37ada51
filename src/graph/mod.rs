//! Schema relationship graph: declaration parsing and bounded BFS path finding.
//!
//! Tables are petgraph nodes in an undirected graph, interned through a
//! name-to-`NodeIndex` map. Edge indices grow in insertion order, and
//! neighbours are reported in that order so traversal follows the configured
//! declaration order. The graph is built once and only read afterwards, so a
//! single instance can be shared across concurrent queries behind an `Arc`.

mod declaration;
mod traversal;

pub use declaration::{parse_relationship, RelationshipDeclaration};
pub use traversal::DEFAULT_MAX_DEPTH;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a relationship was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// `"other_table.column"` form.
    ForeignKey,
    /// Plain `"other_table"` form.
    Direct,
}

/// Metadata kept for an edge (source --relationship--> target as declared).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Table the declaration was written on.
    pub source_table: String,
    /// Table named by the relationship string.
    pub target_table: String,
    /// Join column for the foreign-key form.
    pub column: Option<String>,
    /// Relationship string exactly as configured.
    pub relationship: String,
    pub kind: RelationshipKind,
}

/// Undirected graph of schema tables joined by declared relationships.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    graph: UnGraph<String, Relationship>,
    node_indices: HashMap<String, NodeIndex>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table without any edges. Returns its node.
    pub(crate) fn ensure_table(&mut self, table: &str) -> NodeIndex {
        if let Some(idx) = self.node_indices.get(table) {
            return *idx;
        }
        let idx = self.graph.add_node(table.to_string());
        self.node_indices.insert(table.to_string(), idx);
        idx
    }

    /// Insert a bidirectional edge between two tables.
    ///
    /// Adding an existing edge again keeps its position in traversal order
    /// and replaces the stored metadata. Self references are recorded as
    /// tables only.
    pub fn add_relationship(&mut self, table_a: &str, table_b: &str, metadata: Relationship) {
        let a = self.ensure_table(table_a);
        let b = self.ensure_table(table_b);
        if a == b {
            log::debug!("Ignoring self relationship on table '{}'", table_a);
            return;
        }

        match self.graph.find_edge(a, b) {
            Some(edge) => self.graph[edge] = metadata,
            None => {
                self.graph.add_edge(a, b, metadata);
            }
        }
    }

    /// Neighbours of `table` in declaration order; empty for unknown tables.
    pub fn adjacent_to(&self, table: &str) -> Vec<&str> {
        match self.node_indices.get(table) {
            Some(idx) => self
                .neighbours(*idx)
                .into_iter()
                .map(|n| self.name_of(n))
                .collect(),
            None => Vec::new(),
        }
    }

    /// True when the two tables share a direct edge.
    pub fn is_adjacent(&self, table_a: &str, table_b: &str) -> bool {
        match (self.node_indices.get(table_a), self.node_indices.get(table_b)) {
            (Some(a), Some(b)) => self.graph.contains_edge(*a, *b),
            _ => false,
        }
    }

    /// Metadata for the edge between two tables, in either orientation.
    pub fn relationship(&self, table_a: &str, table_b: &str) -> Option<&Relationship> {
        let a = self.node_indices.get(table_a)?;
        let b = self.node_indices.get(table_b)?;
        let edge = self.graph.find_edge(*a, *b)?;
        self.graph.edge_weight(edge)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.node_indices.contains_key(table)
    }

    /// Known tables in the order they were first seen.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.graph
            .node_indices()
            .map(move |idx| self.graph[idx].as_str())
    }

    pub fn table_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub(crate) fn id_of(&self, table: &str) -> Option<NodeIndex> {
        self.node_indices.get(table).copied()
    }

    pub(crate) fn name_of(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// Neighbours ordered by edge index.
    ///
    /// petgraph walks a node's edge list most-recent first, so the edges are
    /// re-sorted to recover insertion order.
    pub(crate) fn neighbours(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges(idx)
            .map(|edge| {
                let other = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                (edge.id(), other)
            })
            .collect();
        edges.sort_by_key(|(edge, _)| *edge);
        edges.into_iter().map(|(_, other)| other).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct(source: &str, target: &str) -> Relationship {
        Relationship {
            source_table: source.to_string(),
            target_table: target.to_string(),
            column: None,
            relationship: target.to_string(),
            kind: RelationshipKind::Direct,
        }
    }

    #[test]
    fn test_add_relationship_is_symmetric() {
        let mut graph = RelationshipGraph::new();
        graph.add_relationship("ord_hdr", "cust", direct("ord_hdr", "cust"));
        graph.add_relationship("ord_ln", "ord_hdr", direct("ord_ln", "ord_hdr"));

        for (a, b) in [("ord_hdr", "cust"), ("ord_ln", "ord_hdr")] {
            assert!(graph.adjacent_to(a).contains(&b));
            assert!(graph.adjacent_to(b).contains(&a));
            assert!(graph.is_adjacent(a, b));
            assert!(graph.is_adjacent(b, a));
        }
        assert!(!graph.is_adjacent("cust", "ord_ln"));
    }

    #[test]
    fn test_unknown_table_has_no_neighbours() {
        let graph = RelationshipGraph::new();
        assert!(graph.adjacent_to("missing").is_empty());
        assert!(!graph.contains("missing"));
        assert!(graph.relationship("missing", "other").is_none());
    }

    #[test]
    fn test_duplicate_edge_is_idempotent() {
        let mut graph = RelationshipGraph::new();
        graph.add_relationship("a", "b", direct("a", "b"));
        graph.add_relationship("a", "b", direct("a", "b"));
        graph.add_relationship("b", "a", direct("b", "a"));

        assert_eq!(graph.adjacent_to("a"), vec!["b"]);
        assert_eq!(graph.adjacent_to("b"), vec!["a"]);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.table_count(), 2);
        // Last declaration wins for metadata
        assert_eq!(graph.relationship("a", "b").unwrap().source_table, "b");
    }

    #[test]
    fn test_relationship_lookup_either_orientation() {
        let mut graph = RelationshipGraph::new();
        graph.add_relationship("ord_ln", "prd_mstr", direct("ord_ln", "prd_mstr"));
        let forward = graph.relationship("ord_ln", "prd_mstr").unwrap();
        let backward = graph.relationship("prd_mstr", "ord_ln").unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.kind, RelationshipKind::Direct);
    }

    #[test]
    fn test_self_relationship_adds_no_edge() {
        let mut graph = RelationshipGraph::new();
        graph.add_relationship("emp_mstr", "emp_mstr", direct("emp_mstr", "emp_mstr"));
        assert!(graph.contains("emp_mstr"));
        assert!(graph.adjacent_to("emp_mstr").is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_adjacency_keeps_insertion_order() {
        let mut graph = RelationshipGraph::new();
        graph.add_relationship("hub", "zeta", direct("hub", "zeta"));
        graph.add_relationship("hub", "alpha", direct("hub", "alpha"));
        graph.add_relationship("hub", "mid", direct("hub", "mid"));
        assert_eq!(graph.adjacent_to("hub"), vec!["zeta", "alpha", "mid"]);
        assert_eq!(graph.tables().collect::<Vec<_>>(), vec!["hub", "zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_adjacency_order_ignores_edge_orientation() {
        let mut graph = RelationshipGraph::new();
        graph.add_relationship("x", "hub", direct("x", "hub"));
        graph.add_relationship("hub", "y", direct("hub", "y"));
        graph.add_relationship("z", "hub", direct("z", "hub"));
        // Re-declaring keeps the original position
        graph.add_relationship("hub", "x", direct("hub", "x"));
        assert_eq!(graph.adjacent_to("hub"), vec!["x", "y", "z"]);
        assert_eq!(graph.relationship("x", "hub").unwrap().source_table, "hub");
    }
}
