//! Wrong-cut detection: weakly-connected service clusters.
//!
//! The service graph is partitioned into clusters reachable from each other
//! when edge direction is ignored.  Every cluster with more than one service
//! is reported; the result is a raw signal for downstream filtering, not a
//! thresholded judgement.

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;

use crate::graph::DependencyGraph;

/// Cluster the graph by weak connectivity and report every multi-service
/// cluster.  Singletons — services with no surviving connection — are not
/// wrong cuts.
pub fn wrong_cuts(graph: &DependencyGraph<String>) -> Vec<BTreeSet<String>> {
    clusters(graph)
        .into_iter()
        .filter(|cluster| cluster.len() > 1)
        .collect()
}

/// All weakly-connected clusters, singletons included.
pub fn clusters(graph: &DependencyGraph<String>) -> Vec<BTreeSet<String>> {
    let adjacency = graph.undirected_adjacency();
    let mut visited: HashSet<&String> = HashSet::new();
    let mut found = Vec::new();

    for node in graph.nodes() {
        if !visited.contains(node) {
            let mut cluster = BTreeSet::new();
            collect(node, &adjacency, &mut visited, &mut cluster);
            found.push(cluster);
        }
    }
    found
}

fn collect<'g>(
    node: &'g String,
    adjacency: &IndexMap<&'g String, Vec<&'g String>>,
    visited: &mut HashSet<&'g String>,
    cluster: &mut BTreeSet<String>,
) {
    visited.insert(node);
    cluster.insert(node.clone());
    for &neighbor in adjacency.get(node).map(Vec::as_slice).unwrap_or_default() {
        if !visited.contains(neighbor) {
            collect(neighbor, adjacency, visited, cluster);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(edges: &[(&str, &str)], isolated: &[&str]) -> DependencyGraph<String> {
        let mut graph = DependencyGraph::new("test", "c0");
        for (s, t) in edges {
            graph.add_edge(s.to_string(), t.to_string());
        }
        for node in isolated {
            graph.add_node(node.to_string());
        }
        graph
    }

    fn cluster(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_clusters_isolated_node_excluded() {
        let graph = graph_of(&[("a", "b"), ("c", "d")], &["e"]);
        let cuts = wrong_cuts(&graph);
        assert_eq!(cuts.len(), 2);
        assert!(cuts.contains(&cluster(&["a", "b"])));
        assert!(cuts.contains(&cluster(&["c", "d"])));
    }

    #[test]
    fn test_direction_is_ignored() {
        // a -> b <- c is one weak cluster even though a and c never connect
        // directionally.
        let graph = graph_of(&[("a", "b"), ("c", "b")], &[]);
        let cuts = wrong_cuts(&graph);
        assert_eq!(cuts, vec![cluster(&["a", "b", "c"])]);
    }

    #[test]
    fn test_fully_connected_system_is_one_cluster() {
        let graph = graph_of(&[("a", "b"), ("b", "c"), ("c", "a")], &[]);
        let cuts = wrong_cuts(&graph);
        assert_eq!(cuts, vec![cluster(&["a", "b", "c"])]);
    }

    #[test]
    fn test_clusters_keeps_singletons() {
        let graph = graph_of(&[("a", "b")], &["z"]);
        let all = clusters(&graph);
        assert_eq!(all.len(), 2);
        assert!(all.contains(&cluster(&["z"])));
    }

    #[test]
    fn test_empty_graph_has_no_cuts() {
        let graph = DependencyGraph::<String>::new("test", "c0");
        assert!(wrong_cuts(&graph).is_empty());
    }
}
