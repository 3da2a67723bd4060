//! Typed record model for one commit's fully-resolved system architecture.
//!
//! A [`SystemRecord`] is the unit that is snapshotted and advanced commit by
//! commit: a set of services, each holding role-binned class records, plus a
//! pool of orphan classes whose owning service is not yet known.  Field names
//! in the serialized form are pinned to the persisted JSON contract
//! (`classRole`, `methodCalls`, `implementedTypes`, ...).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role and verb enums
// ---------------------------------------------------------------------------

/// Architectural role of a class, assigned once at extraction time and never
/// recomputed by the merge engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassRole {
    Controller,
    Service,
    Repository,
    Entity,
    Unknown,
}

/// HTTP verb carried by endpoints and rest calls.  `Unknown` covers call
/// sites whose verb could not be resolved upstream; it still participates in
/// matching (an unknown-verb call can only match an unknown-verb endpoint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    #[serde(rename = "NONE")]
    Unknown,
}

// ---------------------------------------------------------------------------
// Leaf records: fields and annotations
// ---------------------------------------------------------------------------

/// A class field or a method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub field_name: String,
    pub field_type: String,
}

/// A class-level or method-level annotation with its raw contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub name: String,
    pub package_and_class_name: String,
    pub contents: String,
}

// ---------------------------------------------------------------------------
// Methods and endpoints
// ---------------------------------------------------------------------------

/// Distinguishes a plain method declaration from an HTTP endpoint.  Endpoints
/// only arise from [`ClassRole::Controller`] classes; the variant data is
/// flattened into the method's JSON object (`url` / `httpMethod` keys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MethodKind {
    #[serde(rename_all = "camelCase")]
    Endpoint { url: String, http_method: HttpVerb },
    Plain {},
}

/// A method declaration owned by a class record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRecord {
    /// Declared method name.
    pub name: String,
    /// Fully-qualified owner, e.g. `com.shop.order.OrderController`.
    pub package_and_class_name: String,
    pub parameters: Vec<FieldRecord>,
    pub return_type: String,
    pub annotations: Vec<AnnotationRecord>,
    /// Name of the service this method currently belongs to.  Maintained by
    /// the merge engine whenever the owning class changes hands.
    pub microservice_name: String,
    #[serde(flatten)]
    pub kind: MethodKind,
}

impl MethodRecord {
    pub fn is_endpoint(&self) -> bool {
        matches!(self.kind, MethodKind::Endpoint { .. })
    }

    /// Simple class name, the last `.`-separated segment of the qualified
    /// owner.
    pub fn class_name(&self) -> &str {
        self.package_and_class_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.package_and_class_name)
    }
}

// ---------------------------------------------------------------------------
// Method calls and rest calls
// ---------------------------------------------------------------------------

/// Distinguishes an in-process method invocation from an outbound HTTP call.
/// Rest calls only arise from [`ClassRole::Service`] classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallKind {
    #[serde(rename_all = "camelCase")]
    Rest { url: String, http_method: HttpVerb },
    Plain {},
}

/// A method invocation recorded inside a class body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    /// Callee method name.
    pub name: String,
    pub package_and_class_name: String,
    /// Receiver object name, whatever appears before the `.`.
    pub object_name: String,
    /// Static type of the receiver when resolvable, empty otherwise.
    pub object_type: String,
    /// Name of the method whose body contains this call.
    pub called_from: String,
    /// Raw argument text of the call site.
    pub parameter_contents: String,
    /// Name of the service this call is made from.
    pub microservice_name: String,
    /// Simple name of the class this call is made from.
    pub class_name: String,
    #[serde(flatten)]
    pub kind: CallKind,
}

impl CallRecord {
    pub fn is_rest_call(&self) -> bool {
        matches!(self.kind, CallKind::Rest { .. })
    }
}

// ---------------------------------------------------------------------------
// Class records
// ---------------------------------------------------------------------------

/// One source class with its declarations and outbound calls.  Identity is
/// (name, path, role); `path` is unique within a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub name: String,
    pub path: String,
    pub package_name: String,
    pub class_role: ClassRole,
    pub annotations: Vec<AnnotationRecord>,
    pub fields: Vec<FieldRecord>,
    pub methods: Vec<MethodRecord>,
    pub method_calls: Vec<CallRecord>,
    pub implemented_types: Vec<String>,
}

impl ClassRecord {
    /// Endpoints declared by this class.  Non-controller classes expose none
    /// regardless of what their method records claim.
    pub fn endpoints(&self) -> impl Iterator<Item = &MethodRecord> {
        let is_controller = self.class_role == ClassRole::Controller;
        self.methods
            .iter()
            .filter(move |m| is_controller && m.is_endpoint())
    }

    /// Outbound rest calls made by this class.  Only service-role classes
    /// contribute rest calls.
    pub fn rest_calls(&self) -> impl Iterator<Item = &CallRecord> {
        let is_service = self.class_role == ClassRole::Service;
        self.method_calls
            .iter()
            .filter(move |c| is_service && c.is_rest_call())
    }

    /// Rewrite the owning-service name on every method and call.  Invoked by
    /// the merge engine when the class is placed into a service.
    pub fn set_owning_service(&mut self, service: &str) {
        for method in &mut self.methods {
            method.microservice_name = service.to_string();
        }
        for call in &mut self.method_calls {
            call.microservice_name = service.to_string();
        }
    }
}

// ---------------------------------------------------------------------------
// Service records
// ---------------------------------------------------------------------------

/// One service and its role-binned classes.  A class belongs to exactly one
/// bin; classes with [`ClassRole::Unknown`] never enter a service and live in
/// the system orphan pool instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub name: String,
    /// Directory that contains the service, derived from its build
    /// descriptor.
    pub path: String,
    pub controllers: Vec<ClassRecord>,
    pub services: Vec<ClassRecord>,
    pub repositories: Vec<ClassRecord>,
    pub entities: Vec<ClassRecord>,
}

impl ServiceRecord {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        ServiceRecord {
            name: name.into(),
            path: path.into(),
            ..ServiceRecord::default()
        }
    }

    /// Whether a service bin exists for the given role.
    pub fn accepts_role(role: ClassRole) -> bool {
        !matches!(role, ClassRole::Unknown)
    }

    /// Insert a class into its role bin, rewriting the owning-service name on
    /// the way in.  Returns the class unchanged when the role has no bin.
    pub fn insert_class(&mut self, mut class: ClassRecord) -> Option<ClassRecord> {
        if !Self::accepts_role(class.class_role) {
            return Some(class);
        }
        class.set_owning_service(&self.name);
        let bin = match class.class_role {
            ClassRole::Controller => &mut self.controllers,
            ClassRole::Service => &mut self.services,
            ClassRole::Repository => &mut self.repositories,
            ClassRole::Entity => &mut self.entities,
            ClassRole::Unknown => unreachable!("unknown role rejected above"),
        };
        bin.push(class);
        None
    }

    /// Remove and return the class at `path`, searching every bin.
    pub fn remove_class(&mut self, path: &str) -> Option<ClassRecord> {
        for bin in [
            &mut self.controllers,
            &mut self.services,
            &mut self.repositories,
            &mut self.entities,
        ] {
            if let Some(pos) = bin.iter().position(|c| c.path == path) {
                return Some(bin.remove(pos));
            }
        }
        None
    }

    /// All classes across the four bins.
    pub fn classes(&self) -> impl Iterator<Item = &ClassRecord> {
        self.controllers
            .iter()
            .chain(&self.services)
            .chain(&self.repositories)
            .chain(&self.entities)
    }

    /// Drain every class out of the service, emptying all bins.
    pub fn drain_classes(&mut self) -> Vec<ClassRecord> {
        let mut all = Vec::new();
        all.append(&mut self.controllers);
        all.append(&mut self.services);
        all.append(&mut self.repositories);
        all.append(&mut self.entities);
        all
    }

    /// All endpoints exposed by this service's controllers.
    pub fn endpoints(&self) -> impl Iterator<Item = &MethodRecord> {
        self.controllers.iter().flat_map(|c| c.endpoints())
    }

    /// All rest calls made by this service's service-role classes.
    pub fn rest_calls(&self) -> impl Iterator<Item = &CallRecord> {
        self.services.iter().flat_map(|c| c.rest_calls())
    }

    /// All method declarations across every class of the service.
    pub fn methods(&self) -> impl Iterator<Item = &MethodRecord> {
        self.classes().flat_map(|c| c.methods.iter())
    }

    /// All method calls across every class of the service.
    pub fn method_calls(&self) -> impl Iterator<Item = &CallRecord> {
        self.classes().flat_map(|c| c.method_calls.iter())
    }
}

// ---------------------------------------------------------------------------
// System records
// ---------------------------------------------------------------------------

/// A whole-system snapshot at one commit.  Mutated in place by the merge
/// engine once per commit step; read-only for graph builders and detectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemRecord {
    pub name: String,
    #[serde(rename = "commitID")]
    pub commit_id: String,
    pub microservices: Vec<ServiceRecord>,
    /// Classes currently attached to no service.  Disjoint from every
    /// service bin; all movement goes through [`SystemRecord::take_class`]
    /// and [`SystemRecord::place_class`].
    pub orphans: Vec<ClassRecord>,
}

impl SystemRecord {
    pub fn new(name: impl Into<String>, commit_id: impl Into<String>) -> Self {
        SystemRecord {
            name: name.into(),
            commit_id: commit_id.into(),
            microservices: Vec::new(),
            orphans: Vec::new(),
        }
    }

    /// Index of the service rooted at exactly `path`.
    pub fn service_index_by_path(&self, path: &str) -> Option<usize> {
        self.microservices.iter().position(|m| m.path == path)
    }

    /// Index of the service whose directory contains `class_path`.  When
    /// service directories nest, the longest matching prefix wins.
    pub fn owning_service_index(&self, class_path: &str) -> Option<usize> {
        self.microservices
            .iter()
            .enumerate()
            .filter(|(_, m)| path_contains(&m.path, class_path))
            .max_by_key(|(_, m)| m.path.len())
            .map(|(idx, _)| idx)
    }

    /// Look up a class by path across every service and the orphan pool.
    pub fn find_class(&self, path: &str) -> Option<&ClassRecord> {
        self.microservices
            .iter()
            .flat_map(|m| m.classes())
            .find(|c| c.path == path)
            .or_else(|| self.orphans.iter().find(|c| c.path == path))
    }

    /// Remove and return the class at `path` from wherever it currently
    /// lives.  Returns `None` when the snapshot has no such class.
    pub fn take_class(&mut self, path: &str) -> Option<ClassRecord> {
        for service in &mut self.microservices {
            if let Some(class) = service.remove_class(path) {
                return Some(class);
            }
        }
        if let Some(pos) = self.orphans.iter().position(|c| c.path == path) {
            return Some(self.orphans.remove(pos));
        }
        None
    }

    /// Insert a class wherever its path currently resolves: the owning
    /// service when one contains it and its role has a bin, the orphan pool
    /// otherwise.
    pub fn place_class(&mut self, class: ClassRecord) {
        match self.owning_service_index(&class.path) {
            Some(idx) => {
                if let Some(rejected) = self.microservices[idx].insert_class(class) {
                    self.orphans.push(rejected);
                }
            }
            None => self.orphans.push(class),
        }
    }

    /// Total number of class records tracked by the snapshot.
    pub fn class_count(&self) -> usize {
        self.microservices
            .iter()
            .map(|m| m.classes().count())
            .sum::<usize>()
            + self.orphans.len()
    }
}

/// Whether the directory at `dir` contains `path`.  Matching is
/// segment-aware so `/ts-auth` does not claim `/ts-auth-mocks/...`.
pub(crate) fn path_contains(dir: &str, path: &str) -> bool {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        return false;
    }
    match path.strip_prefix(dir) {
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, path: &str, role: ClassRole) -> ClassRecord {
        ClassRecord {
            name: name.to_string(),
            path: path.to_string(),
            package_name: format!("com.example.{name}"),
            class_role: role,
            annotations: vec![],
            fields: vec![],
            methods: vec![],
            method_calls: vec![],
            implemented_types: vec![],
        }
    }

    #[test]
    fn test_path_contains_segment_aware() {
        assert!(path_contains("/ts-auth", "/ts-auth/src/Login.java"));
        assert!(!path_contains("/ts-auth", "/ts-auth-mocks/src/Login.java"));
        assert!(!path_contains("/ts-auth", "/ts-auth"));
        assert!(!path_contains("", "/ts-auth/src/Login.java"));
    }

    #[test]
    fn test_insert_class_bins_by_role() {
        let mut service = ServiceRecord::new("ts-auth", "/ts-auth");
        assert!(service
            .insert_class(class(
                "LoginController",
                "/ts-auth/a.java",
                ClassRole::Controller
            ))
            .is_none());
        assert!(service
            .insert_class(class("LoginService", "/ts-auth/b.java", ClassRole::Service))
            .is_none());
        assert!(service
            .insert_class(class("UserRepo", "/ts-auth/c.java", ClassRole::Repository))
            .is_none());
        assert!(service
            .insert_class(class("User", "/ts-auth/d.java", ClassRole::Entity))
            .is_none());
        assert_eq!(service.controllers.len(), 1);
        assert_eq!(service.services.len(), 1);
        assert_eq!(service.repositories.len(), 1);
        assert_eq!(service.entities.len(), 1);
    }

    #[test]
    fn test_insert_class_rejects_unknown_role() {
        let mut service = ServiceRecord::new("ts-auth", "/ts-auth");
        let rejected =
            service.insert_class(class("Mystery", "/ts-auth/m.java", ClassRole::Unknown));
        assert!(rejected.is_some());
        assert_eq!(service.classes().count(), 0);
    }

    #[test]
    fn test_insert_class_rewrites_owning_service() {
        let mut c = class("OrderService", "/ts-order/s.java", ClassRole::Service);
        c.methods.push(MethodRecord {
            name: "placeOrder".to_string(),
            package_and_class_name: "com.example.OrderService".to_string(),
            parameters: vec![],
            return_type: "void".to_string(),
            annotations: vec![],
            microservice_name: "stale".to_string(),
            kind: MethodKind::Plain {},
        });
        let mut service = ServiceRecord::new("ts-order", "/ts-order");
        service.insert_class(c);
        assert_eq!(service.services[0].methods[0].microservice_name, "ts-order");
    }

    #[test]
    fn test_owning_service_prefers_longest_prefix() {
        let mut system = SystemRecord::new("shop", "c0");
        system.microservices.push(ServiceRecord::new("root", "/apps"));
        system
            .microservices
            .push(ServiceRecord::new("auth", "/apps/auth"));
        let idx = system
            .owning_service_index("/apps/auth/src/Login.java")
            .unwrap();
        assert_eq!(system.microservices[idx].name, "auth");
    }

    #[test]
    fn test_take_class_searches_services_then_orphans() {
        let mut system = SystemRecord::new("shop", "c0");
        let mut svc = ServiceRecord::new("auth", "/auth");
        svc.insert_class(class("Login", "/auth/Login.java", ClassRole::Controller));
        system.microservices.push(svc);
        system
            .orphans
            .push(class("Stray", "/stray/Stray.java", ClassRole::Entity));

        assert!(system.take_class("/auth/Login.java").is_some());
        assert!(system.take_class("/stray/Stray.java").is_some());
        assert!(system.take_class("/auth/Login.java").is_none());
        assert_eq!(system.class_count(), 0);
    }

    #[test]
    fn test_endpoints_require_controller_role() {
        let mut c = class("Sneaky", "/svc/Sneaky.java", ClassRole::Service);
        c.methods.push(MethodRecord {
            name: "notReally".to_string(),
            package_and_class_name: "com.example.Sneaky".to_string(),
            parameters: vec![],
            return_type: "String".to_string(),
            annotations: vec![],
            microservice_name: "svc".to_string(),
            kind: MethodKind::Endpoint {
                url: "/api/x".to_string(),
                http_method: HttpVerb::Get,
            },
        });
        assert_eq!(c.endpoints().count(), 0);
        c.class_role = ClassRole::Controller;
        assert_eq!(c.endpoints().count(), 1);
    }

    #[test]
    fn test_method_kind_json_shape() {
        let method = MethodRecord {
            name: "getUser".to_string(),
            package_and_class_name: "com.example.UserController".to_string(),
            parameters: vec![],
            return_type: "User".to_string(),
            annotations: vec![],
            microservice_name: "ts-user".to_string(),
            kind: MethodKind::Endpoint {
                url: "/api/users/{?}".to_string(),
                http_method: HttpVerb::Get,
            },
        };
        let value = serde_json::to_value(&method).unwrap();
        assert_eq!(value["httpMethod"], "GET");
        assert_eq!(value["url"], "/api/users/{?}");
        assert_eq!(value["packageAndClassName"], "com.example.UserController");

        let back: MethodRecord = serde_json::from_value(value).unwrap();
        assert!(back.is_endpoint());

        let plain = MethodRecord {
            kind: MethodKind::Plain {},
            ..method
        };
        let value = serde_json::to_value(&plain).unwrap();
        assert!(value.get("url").is_none());
        let back: MethodRecord = serde_json::from_value(value).unwrap();
        assert!(!back.is_endpoint());
    }

    #[test]
    fn test_class_name_from_qualified_owner() {
        let method = MethodRecord {
            name: "save".to_string(),
            package_and_class_name: "com.shop.order.OrderRepo".to_string(),
            parameters: vec![],
            return_type: "void".to_string(),
            annotations: vec![],
            microservice_name: "ts-order".to_string(),
            kind: MethodKind::Plain {},
        };
        assert_eq!(method.class_name(), "OrderRepo");
    }

    #[test]
    fn test_system_json_field_names() {
        let mut system = SystemRecord::new("train-ticket", "abc123");
        system
            .microservices
            .push(ServiceRecord::new("ts-auth", "/ts-auth"));
        let value = serde_json::to_value(&system).unwrap();
        assert_eq!(value["commitID"], "abc123");
        assert!(value["microservices"].is_array());
        assert!(value["orphans"].is_array());
        assert_eq!(value["microservices"][0]["name"], "ts-auth");
    }
}
