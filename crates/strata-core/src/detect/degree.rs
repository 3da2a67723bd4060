//! Degree-threshold detectors: greedy and hub-like services.

use std::collections::HashSet;

use crate::graph::DependencyGraph;

/// Services calling at least `threshold` distinct other services.
pub fn greedy_services(graph: &DependencyGraph<String>, threshold: usize) -> Vec<String> {
    degree_at_least(graph, threshold, Direction::Out)
}

/// Services called by at least `threshold` distinct other services.
pub fn hub_like_services(graph: &DependencyGraph<String>, threshold: usize) -> Vec<String> {
    degree_at_least(graph, threshold, Direction::In)
}

enum Direction {
    Out,
    In,
}

fn degree_at_least(
    graph: &DependencyGraph<String>,
    threshold: usize,
    direction: Direction,
) -> Vec<String> {
    graph
        .nodes()
        .filter(|node| {
            let mut partners: HashSet<&String> = HashSet::new();
            for (source, target, _) in graph.edges() {
                match direction {
                    Direction::Out if source == *node => {
                        partners.insert(target);
                    }
                    Direction::In if target == *node => {
                        partners.insert(source);
                    }
                    _ => {}
                }
            }
            partners.len() >= threshold
        })
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
