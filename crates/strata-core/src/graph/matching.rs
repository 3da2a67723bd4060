//! Call-to-endpoint matching and URL template normalization.
//!
//! A rest call targets an endpoint when verb and normalized URL agree and
//! the two sides belong to different services; a service invoking its own
//! endpoint is not a dependency.  Normalization reduces every dynamic URL
//! segment — named path parameters, format specifiers, concatenated
//! expressions — to the `{?}` placeholder so call sites and endpoint
//! definitions compare structurally.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{CallKind, CallRecord, MethodKind, MethodRecord};

/// Placeholder a dynamic URL segment collapses to.
pub const URL_PLACEHOLDER: &str = "{?}";

static PATH_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^}]*\}").unwrap());

static FORMAT_SPECIFIER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%[sdif]").unwrap());

// ---------------------------------------------------------------------------
// URL normalization
// ---------------------------------------------------------------------------

/// Normalize a URL into its comparable template form.
///
/// Strips scheme and authority, keeps the path from the first `/`, drops a
/// trailing `/` (ignored by routing anyway), and replaces `{param}` segments
/// and `%s`-style format specifiers with [`URL_PLACEHOLDER`].  Already
/// normalized input passes through unchanged.
pub fn normalize_url(url: &str) -> String {
    let mut stripped = url.trim().to_string();
    for scheme in ["http://", "https://"] {
        if let Some(rest) = stripped.strip_prefix(scheme) {
            stripped = rest.to_string();
        }
    }

    // Anything before the first slash is host (or host:port); drop it.
    if !stripped.starts_with('/') {
        stripped = match stripped.find('/') {
            Some(idx) => stripped[idx..].to_string(),
            None => format!("/{stripped}"),
        };
    }

    if stripped.len() > 1 && stripped.ends_with('/') {
        stripped.pop();
    }

    let stripped = FORMAT_SPECIFIER_RE.replace_all(&stripped, URL_PLACEHOLDER);
    PATH_PARAM_RE
        .replace_all(&stripped, URL_PLACEHOLDER)
        .into_owned()
}

// ---------------------------------------------------------------------------
// Match predicate
// ---------------------------------------------------------------------------

/// Whether `call` targets `endpoint`.
///
/// Only rest calls can match, only endpoints can be matched, and a call
/// never matches an endpoint of its own service.
pub fn matches(call: &CallRecord, endpoint: &MethodRecord) -> bool {
    let (call_url, call_verb) = match &call.kind {
        CallKind::Rest { url, http_method } => (url, *http_method),
        CallKind::Plain {} => return false,
    };
    let (endpoint_url, endpoint_verb) = match &endpoint.kind {
        MethodKind::Endpoint { url, http_method } => (url, *http_method),
        MethodKind::Plain {} => return false,
    };

    if call.microservice_name == endpoint.microservice_name {
        return false;
    }

    call_verb == endpoint_verb && normalize_url(call_url) == normalize_url(endpoint_url)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HttpVerb;

    fn rest_call(service: &str, url: &str, verb: HttpVerb) -> CallRecord {
        CallRecord {
            name: "getForObject".to_string(),
            package_and_class_name: "com.example.Client".to_string(),
            object_name: "restTemplate".to_string(),
            object_type: "RestTemplate".to_string(),
            called_from: "fetch".to_string(),
            parameter_contents: String::new(),
            microservice_name: service.to_string(),
            class_name: "Client".to_string(),
            kind: CallKind::Rest {
                url: url.to_string(),
                http_method: verb,
            },
        }
    }

    fn endpoint(service: &str, url: &str, verb: HttpVerb) -> MethodRecord {
        MethodRecord {
            name: "handle".to_string(),
            package_and_class_name: "com.example.Controller".to_string(),
            parameters: vec![],
            return_type: "Response".to_string(),
            annotations: vec![],
            microservice_name: service.to_string(),
            kind: MethodKind::Endpoint {
                url: url.to_string(),
                http_method: verb,
            },
        }
    }

    #[test]
    fn test_normalize_strips_scheme_and_host() {
        assert_eq!(
            normalize_url("http://ts-order:8080/api/orders"),
            "/api/orders"
        );
        assert_eq!(normalize_url("https://gateway/api/orders/"), "/api/orders");
    }

    #[test]
    fn test_normalize_collapses_dynamic_segments() {
        assert_eq!(normalize_url("/api/users/{id}"), "/api/users/{?}");
        assert_eq!(
            normalize_url("/api/users/{id}/orders/{orderId}"),
            "/api/users/{?}/orders/{?}"
        );
        assert_eq!(normalize_url("/api/users/%s"), "/api/users/{?}");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_url("http://svc/api/users/{id}/");
        assert_eq!(normalize_url(&once), once);
        assert_eq!(once, "/api/users/{?}");
    }

    #[test]
    fn test_normalize_keeps_root() {
        assert_eq!(normalize_url("/"), "/");
    }

    #[test]
    fn test_match_requires_verb_and_url() {
        let call = rest_call("ts-a", "/api/users/{id}", HttpVerb::Get);
        assert!(matches(&call, &endpoint("ts-b", "/api/users/{userId}", HttpVerb::Get)));
        assert!(!matches(&call, &endpoint("ts-b", "/api/users/{userId}", HttpVerb::Post)));
        assert!(!matches(&call, &endpoint("ts-b", "/api/accounts/{id}", HttpVerb::Get)));
    }

    #[test]
    fn test_match_breaks_symmetry_on_same_service() {
        for verb in [HttpVerb::Get, HttpVerb::Post, HttpVerb::Delete] {
            for url in ["/api/users", "/api/users/{id}"] {
                let call = rest_call("ts-a", url, verb);
                assert!(!matches(&call, &endpoint("ts-a", url, verb)));
            }
        }
    }

    #[test]
    fn test_plain_records_never_match() {
        let mut call = rest_call("ts-a", "/api/users", HttpVerb::Get);
        let target = endpoint("ts-b", "/api/users", HttpVerb::Get);
        call.kind = CallKind::Plain {};
        assert!(!matches(&call, &target));

        let call = rest_call("ts-a", "/api/users", HttpVerb::Get);
        let mut target = endpoint("ts-b", "/api/users", HttpVerb::Get);
        target.kind = MethodKind::Plain {};
        assert!(!matches(&call, &target));
    }
}
