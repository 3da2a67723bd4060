//! Cyclic-dependency detection at service and method granularity.
//!
//! Both variants are depth-first searches over the graph adjacency with a
//! recursion stack; a back-edge into the stack closes a cycle.  Cycle paths
//! are reported in forward edge order with both endpoints included, so a
//! two-service cycle renders as `[A, B, A]`.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::graph::{DependencyGraph, MethodNode};

// ---------------------------------------------------------------------------
// Service level
// ---------------------------------------------------------------------------

/// Find all cyclic dependencies in the service graph.  One cycle is reported
/// per back-edge discovered.
pub fn service_cycles(graph: &DependencyGraph<String>) -> Vec<Vec<String>> {
    let adjacency = graph.adjacency();
    let mut state = ServiceState {
        visited: HashSet::new(),
        stack: HashSet::new(),
        parents: HashMap::new(),
        cycles: Vec::new(),
    };

    for node in graph.nodes() {
        if !state.visited.contains(node) {
            visit_service(node, &adjacency, &mut state);
        }
    }
    state.cycles
}

struct ServiceState<'g> {
    visited: HashSet<&'g String>,
    stack: HashSet<&'g String>,
    parents: HashMap<&'g String, &'g String>,
    cycles: Vec<Vec<String>>,
}

fn visit_service<'g>(
    node: &'g String,
    adjacency: &IndexMap<&'g String, Vec<&'g String>>,
    state: &mut ServiceState<'g>,
) {
    state.visited.insert(node);
    state.stack.insert(node);

    for &neighbor in adjacency.get(node).map(Vec::as_slice).unwrap_or_default() {
        if !state.visited.contains(neighbor) {
            state.parents.insert(neighbor, node);
            visit_service(neighbor, adjacency, state);
        } else if state.stack.contains(neighbor) {
            state
                .cycles
                .push(reconstruct_cycle(neighbor, node, &state.parents));
        }
    }

    state.stack.remove(node);
}

/// Walk the parent chain from the back-edge source up to the re-entered
/// node, then reverse into forward edge order.
fn reconstruct_cycle(
    start: &String,
    back_edge_source: &String,
    parents: &HashMap<&String, &String>,
) -> Vec<String> {
    let mut path = vec![start.clone()];
    let mut node = back_edge_source;
    while node != start {
        path.push(node.clone());
        match parents.get(node) {
            Some(&parent) => node = parent,
            None => break,
        }
    }
    path.push(start.clone());
    path.reverse();
    path
}

// ---------------------------------------------------------------------------
// Method level, service granularity
// ---------------------------------------------------------------------------

/// Find service-granular cycles by traversing the method graph.
///
/// The recursion stack holds the ordered list of distinct services on the
/// open DFS path: a service is pushed only when traversal crosses into it,
/// and an edge that crosses into a service already on the stack closes a
/// cycle reconstructed from the stack itself.  Intra-service call chains —
/// recursion included — never touch the stack and cannot register as
/// cycles.
pub fn method_level_cycles(graph: &DependencyGraph<MethodNode>) -> Vec<Vec<String>> {
    let adjacency = graph.adjacency();
    let mut state = MethodState {
        visited: HashSet::new(),
        service_stack: Vec::new(),
        cycles: Vec::new(),
    };

    for node in graph.nodes() {
        if !state.visited.contains(node) {
            visit_method(node, &adjacency, &mut state);
        }
    }
    state.cycles
}

struct MethodState<'g> {
    visited: HashSet<&'g MethodNode>,
    service_stack: Vec<&'g str>,
    cycles: Vec<Vec<String>>,
}

fn visit_method<'g>(
    node: &'g MethodNode,
    adjacency: &IndexMap<&'g MethodNode, Vec<&'g MethodNode>>,
    state: &mut MethodState<'g>,
) {
    state.visited.insert(node);
    let service = node.microservice.as_str();
    let pushed = state.service_stack.last() != Some(&service);
    if pushed {
        state.service_stack.push(service);
    }

    for &neighbor in adjacency.get(node).map(Vec::as_slice).unwrap_or_default() {
        let neighbor_service = neighbor.microservice.as_str();
        if neighbor_service == service {
            if !state.visited.contains(neighbor) {
                visit_method(neighbor, adjacency, state);
            }
        } else if let Some(pos) = state
            .service_stack
            .iter()
            .position(|&s| s == neighbor_service)
        {
            // Crossing back into an open service closes a cycle; the branch
            // is not descended further, the neighbor stays reachable as a
            // later DFS root.
            let mut cycle: Vec<String> =
                state.service_stack[pos..].iter().map(|s| s.to_string()).collect();
            cycle.push(neighbor_service.to_string());
            state.cycles.push(cycle);
        } else if !state.visited.contains(neighbor) {
            visit_method(neighbor, adjacency, state);
        }
    }

    if pushed {
        state.service_stack.pop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
