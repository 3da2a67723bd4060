//! Method-level dependency graph construction.
//!
//! Vertices are individual method declarations (endpoints included) keyed by
//! (service, class, method name).  Edges are call records whose source
//! method resolved by that same identity; calls made from outside any
//! tracked method — static initializers, field initializers — are dropped,
//! a deliberate approximation rather than an error.

use std::collections::HashMap;

use tracing::debug;

use crate::graph::matching;
use crate::graph::{DependencyGraph, GraphNode};
use crate::models::{CallKind, SystemRecord};

/// Identity of a method vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodNode {
    pub microservice: String,
    pub class_name: String,
    pub name: String,
}

impl GraphNode for MethodNode {
    fn id(&self) -> String {
        format!("{}.{}.{}", self.microservice, self.class_name, self.name)
    }
}

/// Build the method dependency graph for one snapshot.
pub fn build_method_graph(system: &SystemRecord) -> DependencyGraph<MethodNode> {
    let mut graph = DependencyGraph::new(system.name.clone(), system.commit_id.clone());

    // Vertex per method; identity index for source and plain-target lookup,
    // endpoint list for rest-call targeting.
    let mut by_identity: HashMap<(String, String, String), MethodNode> = HashMap::new();
    let mut endpoints = Vec::new();

    for ms in &system.microservices {
        for method in ms.methods() {
            let node = MethodNode {
                microservice: ms.name.clone(),
                class_name: method.class_name().to_string(),
                name: method.name.clone(),
            };
            graph.add_node(node.clone());
            by_identity.insert(
                (
                    node.microservice.clone(),
                    node.class_name.clone(),
                    node.name.clone(),
                ),
                node.clone(),
            );
            if method.is_endpoint() {
                endpoints.push((node, method));
            }
        }
    }

    let mut dropped = 0usize;
    for ms in &system.microservices {
        for call in ms.method_calls() {
            let source_key = (
                ms.name.clone(),
                call.class_name.clone(),
                call.called_from.clone(),
            );
            let Some(source) = by_identity.get(&source_key).cloned() else {
                dropped += 1;
                continue;
            };

            match &call.kind {
                CallKind::Rest { .. } => {
                    for (target, endpoint) in &endpoints {
                        if matching::matches(call, endpoint) {
                            graph.add_edge(source.clone(), target.clone());
                        }
                    }
                }
                CallKind::Plain {} => {
                    // An ordinary call resolves within its own service, to
                    // the method named by the receiver's static type.
                    let target_key = (
                        call.microservice_name.clone(),
                        call.object_type.clone(),
                        call.name.clone(),
                    );
                    if let Some(target) = by_identity.get(&target_key) {
                        graph.add_edge(source.clone(), target.clone());
                    }
                }
            }
        }
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        dropped_sources = dropped,
        "built method dependency graph"
    );
    graph
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
