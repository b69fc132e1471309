//! Test fixtures with sample data.

use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Prefix used by the sample tree.
pub const SAMPLE_PREFIX: &str = "secret/app";

/// Kubernetes login mount used in fixtures.
pub const SAMPLE_K8S_LOGIN_PATH: &str = "auth/kubernetes/login";

/// Session token handed out by fixture logins.
pub const SAMPLE_SESSION_TOKEN: &str = "s.fixture-session";

/// The `db/host`, `db/port`, `cache` tree, relative to [`SAMPLE_PREFIX`].
#[must_use]
pub fn sample_tree() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("db/host".to_string(), "x".to_string()),
        ("db/port".to_string(), "5432".to_string()),
        ("cache".to_string(), "redis://y".to_string()),
    ])
}

/// Export lines the sample tree must produce, in sorted order.
#[must_use]
pub fn sample_exports() -> Vec<String> {
    vec![
        "export CACHE='redis://y'".to_string(),
        "export DB_HOST='x'".to_string(),
        "export DB_PORT='5432'".to_string(),
    ]
}

/// A login response body as returned by Vault auth endpoints.
#[must_use]
pub fn login_response(token: &str) -> Value {
    json!({
        "request_id": "fixture-request",
        "lease_id": "",
        "lease_duration": 0,
        "renewable": false,
        "data": null,
        "auth": {
            "client_token": token,
            "accessor": "fixture-accessor",
            "policies": ["default"],
            "lease_duration": 3600,
            "renewable": true
        }
    })
}

/// A listing response body.
#[must_use]
pub fn listing_response(keys: &[&str]) -> Value {
    json!({ "request_id": "fixture-request", "data": { "keys": keys } })
}

/// A leaf read response body.
#[must_use]
pub fn leaf_response(value: &str) -> Value {
    json!({ "request_id": "fixture-request", "data": { "value": value } })
}
