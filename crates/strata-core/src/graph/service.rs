//! Service-level dependency graph construction.

use tracing::debug;

use crate::graph::matching;
use crate::graph::DependencyGraph;
use crate::models::SystemRecord;

/// Build the service dependency graph for one snapshot.
///
/// Every rest call in the system is tested against every endpoint; each
/// match contributes one occurrence to the edge between the calling and the
/// owning service.  Services that participate in no matched edge do not
/// appear as vertices — the graph reflects inferred connectivity, not
/// membership.
pub fn build_service_graph(system: &SystemRecord) -> DependencyGraph<String> {
    let mut graph = DependencyGraph::new(system.name.clone(), system.commit_id.clone());

    let rest_calls: Vec<_> = system
        .microservices
        .iter()
        .flat_map(|m| m.rest_calls())
        .collect();
    let endpoints: Vec<_> = system
        .microservices
        .iter()
        .flat_map(|m| m.endpoints())
        .collect();

    for call in &rest_calls {
        for endpoint in &endpoints {
            if matching::matches(call, endpoint) {
                graph.add_edge(
                    call.microservice_name.clone(),
                    endpoint.microservice_name.clone(),
                );
            }
        }
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        calls = rest_calls.len(),
        endpoints = endpoints.len(),
        "built service dependency graph"
    );
    graph
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CallKind, CallRecord, ClassRecord, ClassRole, HttpVerb, MethodKind, MethodRecord,
        ServiceRecord,
    };

    fn controller_class(service: &str, url: &str, verb: HttpVerb) -> ClassRecord {
        ClassRecord {
            name: "Controller".to_string(),
            path: format!("/{service}/Controller.java"),
            package_name: format!("com.example.{service}"),
            class_role: ClassRole::Controller,
            annotations: vec![],
            fields: vec![],
            methods: vec![MethodRecord {
                name: "handle".to_string(),
                package_and_class_name: format!("com.example.{service}.Controller"),
                parameters: vec![],
                return_type: "Response".to_string(),
                annotations: vec![],
                microservice_name: service.to_string(),
                kind: MethodKind::Endpoint {
                    url: url.to_string(),
                    http_method: verb,
                },
            }],
            method_calls: vec![],
            implemented_types: vec![],
        }
    }

    fn service_class(service: &str, urls: &[&str]) -> ClassRecord {
        ClassRecord {
            name: "Client".to_string(),
            path: format!("/{service}/Client.java"),
            package_name: format!("com.example.{service}"),
            class_role: ClassRole::Service,
            annotations: vec![],
            fields: vec![],
            methods: vec![],
            method_calls: urls
                .iter()
                .map(|url| CallRecord {
                    name: "getForObject".to_string(),
                    package_and_class_name: format!("com.example.{service}.Client"),
                    object_name: "restTemplate".to_string(),
                    object_type: "RestTemplate".to_string(),
                    called_from: "fetch".to_string(),
                    parameter_contents: String::new(),
                    microservice_name: service.to_string(),
                    class_name: "Client".to_string(),
                    kind: CallKind::Rest {
                        url: url.to_string(),
                        http_method: HttpVerb::Get,
                    },
                })
                .collect(),
            implemented_types: vec![],
        }
    }

    fn service(name: &str, classes: Vec<ClassRecord>) -> ServiceRecord {
        let mut svc = ServiceRecord::new(name, format!("/{name}"));
        for class in classes {
            svc.insert_class(class);
        }
        svc
    }

    fn two_service_system() -> SystemRecord {
        let mut system = SystemRecord::new("shop", "c0");
        system.microservices.push(service(
            "ts-order",
            vec![service_class("ts-order", &["/api/users/{id}"])],
        ));
        system.microservices.push(service(
            "ts-user",
            vec![controller_class("ts-user", "/api/users/{userId}", HttpVerb::Get)],
        ));
        system
    }

    #[test]
    fn test_matched_pair_becomes_weighted_edge() {
        let graph = build_service_graph(&two_service_system());
        assert_eq!(graph.node_count(), 2);
        assert_eq!(
            graph.edge_weight(&"ts-order".to_string(), &"ts-user".to_string()),
            Some(1)
        );
    }

    #[test]
    fn test_repeated_calls_collapse_into_weight() {
        let mut system = two_service_system();
        system.microservices[0] = service(
            "ts-order",
            vec![service_class(
                "ts-order",
                &["/api/users/{id}", "/api/users/{id}"],
            )],
        );
        let graph = build_service_graph(&system);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.edge_weight(&"ts-order".to_string(), &"ts-user".to_string()),
            Some(2)
        );
    }

    #[test]
    fn test_unmatched_services_stay_off_the_graph() {
        let mut system = two_service_system();
        system
            .microservices
            .push(service("ts-idle", vec![service_class("ts-idle", &["/api/none"])]));
        let graph = build_service_graph(&system);
        assert!(!graph.contains_node(&"ts-idle".to_string()));
    }

    #[test]
    fn test_empty_system_yields_empty_graph() {
        let graph = build_service_graph(&SystemRecord::new("shop", "c0"));
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }
}
