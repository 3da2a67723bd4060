//! Service-chain detection: call paths long enough to signal tight coupling.
//!
//! A chain is a DFS path through the dependency graph whose length reaches
//! the configured threshold.  Cycle detection is path-local: a path that
//! runs back into one of its own vertices is excluded rather than reported
//! as a chain, but sibling branches of the same traversal are unaffected.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::graph::{DependencyGraph, MethodNode};

// ---------------------------------------------------------------------------
// Service level
// ---------------------------------------------------------------------------

/// Find all service chains of at least `min_length` services.
pub fn service_chains(graph: &DependencyGraph<String>, min_length: usize) -> Vec<Vec<String>> {
    let adjacency = graph.adjacency();
    let mut visited: HashSet<&String> = HashSet::new();
    let mut chains = Vec::new();

    for node in graph.nodes() {
        if !visited.contains(node) {
            let mut path = Vec::new();
            extend_chain(node, &adjacency, &mut visited, &mut path, min_length, &mut chains);
        }
    }
    chains
}

fn extend_chain<'g>(
    node: &'g String,
    adjacency: &IndexMap<&'g String, Vec<&'g String>>,
    visited: &mut HashSet<&'g String>,
    path: &mut Vec<&'g String>,
    min_length: usize,
    chains: &mut Vec<Vec<String>>,
) {
    path.push(node);
    visited.insert(node);
    let mut closed_on_path = false;

    for &neighbor in adjacency.get(node).map(Vec::as_slice).unwrap_or_default() {
        if path.contains(&neighbor) {
            closed_on_path = true;
            continue;
        }
        if !visited.contains(neighbor) {
            extend_chain(neighbor, adjacency, visited, path, min_length, chains);
        }
    }

    if !closed_on_path && path.len() >= min_length {
        chains.push(path.iter().map(|s| s.to_string()).collect());
    }
    path.pop();
}

// ---------------------------------------------------------------------------
// Method level, service granularity
// ---------------------------------------------------------------------------

/// Find service chains by walking the method graph, compressing consecutive
/// same-service hops into a single path entry.  A chain is reported once its
/// service path exceeds `min_length` distinct consecutive services.
pub fn method_level_chains(
    graph: &DependencyGraph<MethodNode>,
    min_length: usize,
) -> Vec<Vec<String>> {
    let adjacency = graph.adjacency();
    let mut visited: HashSet<&MethodNode> = HashSet::new();
    let mut chains = Vec::new();

    for node in graph.nodes() {
        if !visited.contains(node) {
            let mut path: Vec<&str> = Vec::new();
            extend_method_chain(node, &adjacency, &mut visited, &mut path, min_length, &mut chains);
        }
    }
    chains
}

fn extend_method_chain<'g>(
    node: &'g MethodNode,
    adjacency: &IndexMap<&'g MethodNode, Vec<&'g MethodNode>>,
    visited: &mut HashSet<&'g MethodNode>,
    path: &mut Vec<&'g str>,
    min_length: usize,
    chains: &mut Vec<Vec<String>>,
) {
    visited.insert(node);
    let service = node.microservice.as_str();
    let pushed = path.last() != Some(&service);
    if pushed {
        path.push(service);
    }

    for &neighbor in adjacency.get(node).map(Vec::as_slice).unwrap_or_default() {
        if !visited.contains(neighbor) {
            extend_method_chain(neighbor, adjacency, visited, path, min_length, chains);
        }
    }

    if pushed {
        if path.len() > min_length {
            chains.push(path.iter().map(|s| s.to_string()).collect());
        }
        path.pop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
