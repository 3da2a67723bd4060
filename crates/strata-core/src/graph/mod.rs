//! Weighted directed dependency graphs derived from a system snapshot.
//!
//! Edges accumulate directly into a map keyed by (source, target) during a
//! single pass over the snapshot, so duplicate matches collapse into the
//! edge weight as they are discovered.  Node and edge iteration order is
//! insertion order, which keeps detector output deterministic.

pub mod matching;
pub mod method;
pub mod service;

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use serde_json::json;

pub use method::{build_method_graph, MethodNode};
pub use service::build_service_graph;

/// A vertex that can render itself as a stable string id for serialization.
pub trait GraphNode {
    fn id(&self) -> String;
}

impl GraphNode for String {
    fn id(&self) -> String {
        self.clone()
    }
}

/// Directed weighted graph over nodes of type `N`.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph<N: Eq + Hash + Clone> {
    /// Name of the system the graph was derived from.
    pub label: String,
    /// Commit id of the snapshot the graph represents.
    pub timestamp: String,
    nodes: IndexSet<N>,
    edges: IndexMap<(N, N), u32>,
}

impl<N: Eq + Hash + Clone> DependencyGraph<N> {
    pub fn new(label: impl Into<String>, timestamp: impl Into<String>) -> Self {
        DependencyGraph {
            label: label.into(),
            timestamp: timestamp.into(),
            nodes: IndexSet::new(),
            edges: IndexMap::new(),
        }
    }

    /// Insert a vertex with no edges.
    pub fn add_node(&mut self, node: N) {
        self.nodes.insert(node);
    }

    /// Record one occurrence of `source -> target`, inserting both endpoints
    /// and bumping the edge weight.
    pub fn add_edge(&mut self, source: N, target: N) {
        self.nodes.insert(source.clone());
        self.nodes.insert(target.clone());
        *self.edges.entry((source, target)).or_insert(0) += 1;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.nodes.contains(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&N, &N, u32)> {
        self.edges.iter().map(|((s, t), w)| (s, t, *w))
    }

    pub fn edge_weight(&self, source: &N, target: &N) -> Option<u32> {
        self.edges
            .get(&(source.clone(), target.clone()))
            .copied()
    }

    /// Out-adjacency for every vertex, in insertion order.  Vertices without
    /// outgoing edges map to an empty list.
    pub fn adjacency(&self) -> IndexMap<&N, Vec<&N>> {
        let mut adjacency: IndexMap<&N, Vec<&N>> =
            self.nodes.iter().map(|n| (n, Vec::new())).collect();
        for (source, target) in self.edges.keys() {
            if let Some(neighbors) = adjacency.get_mut(source) {
                neighbors.push(target);
            }
        }
        adjacency
    }

    /// Undirected adjacency, each edge visible from both endpoints.
    pub fn undirected_adjacency(&self) -> IndexMap<&N, Vec<&N>> {
        let mut adjacency: IndexMap<&N, Vec<&N>> =
            self.nodes.iter().map(|n| (n, Vec::new())).collect();
        for (source, target) in self.edges.keys() {
            if let Some(neighbors) = adjacency.get_mut(source) {
                neighbors.push(target);
            }
            if let Some(neighbors) = adjacency.get_mut(target) {
                neighbors.push(source);
            }
        }
        adjacency
    }
}

impl<N: Eq + Hash + Clone + GraphNode> DependencyGraph<N> {
    /// JSON rendering with the persisted graph shape: `label`, `timestamp`,
    /// `directed`, `multigraph`, `nodes`, `edges` with per-edge weights.
    /// Parallel matches collapse into weights, so the graph is never a
    /// multigraph.
    pub fn to_json(&self) -> serde_json::Value {
        let nodes: Vec<_> = self.nodes.iter().map(|n| json!({ "name": n.id() })).collect();
        let edges: Vec<_> = self
            .edges
            .iter()
            .map(|((s, t), w)| {
                json!({ "source": s.id(), "target": t.id(), "weight": w })
            })
            .collect();
        json!({
            "label": self.label,
            "timestamp": self.timestamp,
            "directed": true,
            "multigraph": false,
            "nodes": nodes,
            "edges": edges,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
