//! In-memory secret store for tests.
//!
//! Behaves like Vault's logical API for the operations vaultenv uses:
//! listing a directory yields its immediate children (directories carry a
//! trailing `/`), listing a leaf or a missing path yields no data, and
//! reading a leaf yields its payload.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use vaultenv_vault::{Secret, SecretStore, VaultError, VaultResult};

/// Order in which `list` returns sibling names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingOrder {
    /// Lexicographic
    #[default]
    Sorted,
    /// Reverse lexicographic
    Reversed,
    /// Deterministic shuffle seeded per store
    Shuffled(u64),
}

/// A recorded store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `list(path)`
    List(String),
    /// `read(path)`
    Read(String),
    /// `write(path, ..)`
    Write(String),
    /// `set_token(..)`
    SetToken,
    /// `revoke_self()`
    RevokeSelf,
}

#[derive(Debug, Default)]
struct StoreState {
    calls: Vec<StoreCall>,
    writes: Vec<(String, Value)>,
    token: Option<String>,
}

/// Fake [`SecretStore`] backed by a map of full leaf paths to payloads.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    leaves: BTreeMap<String, Map<String, Value>>,
    listings: HashMap<String, Map<String, Value>>,
    vanished: HashSet<String>,
    failing_lists: HashSet<String>,
    failing_reads: HashSet<String>,
    logins: HashMap<String, String>,
    revoke_fails: bool,
    order: ListingOrder,
    state: Arc<RwLock<StoreState>>,
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a tree of `relative path -> value` under `prefix`.
    #[must_use]
    pub fn from_tree(prefix: &str, tree: &BTreeMap<String, String>) -> Self {
        tree.iter().fold(Self::new(), |store, (relative, value)| {
            store.with_value(&format!("{prefix}/{relative}"), value)
        })
    }

    /// Add a leaf whose payload is `{"value": value}`.
    #[must_use]
    pub fn with_value(self, path: &str, value: &str) -> Self {
        self.with_payload(path, json!({ "value": value }))
    }

    /// Add a leaf with an arbitrary JSON object payload.
    #[must_use]
    pub fn with_payload(mut self, path: &str, payload: Value) -> Self {
        let data = match payload {
            Value::Object(map) => map,
            other => Map::from_iter([("value".to_string(), other)]),
        };
        self.leaves.insert(normalize(path), data);
        self
    }

    /// Answer `list(path)` with `data` instead of the derived children.
    #[must_use]
    pub fn with_listing(mut self, path: &str, data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            other => Map::from_iter([("keys".to_string(), other)]),
        };
        self.listings.insert(normalize(path), data);
        self
    }

    /// Make a leaf disappear between `list` and `read`.
    #[must_use]
    pub fn with_vanished(mut self, path: &str) -> Self {
        self.vanished.insert(normalize(path));
        self
    }

    /// Make `list(path)` fail with a transport error.
    #[must_use]
    pub fn with_failing_list(mut self, path: &str) -> Self {
        self.failing_lists.insert(normalize(path));
        self
    }

    /// Make `read(path)` fail with a transport error.
    #[must_use]
    pub fn with_failing_read(mut self, path: &str) -> Self {
        self.failing_reads.insert(normalize(path));
        self
    }

    /// Accept logins at `path`, answering with `token`.
    #[must_use]
    pub fn with_login(mut self, path: &str, token: &str) -> Self {
        self.logins.insert(normalize(path), token.to_string());
        self
    }

    /// Make `revoke_self` fail.
    #[must_use]
    pub const fn with_failing_revoke(mut self) -> Self {
        self.revoke_fails = true;
        self
    }

    /// Set the order siblings are listed in.
    #[must_use]
    pub const fn with_order(mut self, order: ListingOrder) -> Self {
        self.order = order;
        self
    }

    /// Get all recorded calls.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.state.read().await.calls.clone()
    }

    /// Get all recorded writes.
    pub async fn writes(&self) -> Vec<(String, Value)> {
        self.state.read().await.writes.clone()
    }

    /// Get the token currently set, if any.
    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    /// Number of times `path` was listed or read.
    pub async fn visits(&self, path: &str) -> usize {
        let path = normalize(path);
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|call| matches!(call, StoreCall::List(p) | StoreCall::Read(p) if *p == path))
            .count()
    }

    async fn record(&self, call: StoreCall) {
        self.state.write().await.calls.push(call);
    }

    fn children(&self, dir: &str) -> Vec<String> {
        let prefix = if dir.is_empty() { String::new() } else { format!("{dir}/") };
        let names: BTreeSet<String> = self
            .leaves
            .keys()
            .filter_map(|leaf| leaf.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty())
            .map(|rest| match rest.split_once('/') {
                Some((head, _)) => format!("{head}/"),
                None => rest.to_string(),
            })
            .collect();

        let mut names: Vec<String> = names.into_iter().collect();
        match self.order {
            ListingOrder::Sorted => {}
            ListingOrder::Reversed => names.reverse(),
            ListingOrder::Shuffled(seed) => names.shuffle(&mut StdRng::seed_from_u64(seed)),
        }
        names
    }
}

#[async_trait]
impl SecretStore for InMemoryStore {
    async fn list(&self, path: &str) -> VaultResult<Option<Secret>> {
        let path = normalize(path);
        self.record(StoreCall::List(path.clone())).await;

        if self.failing_lists.contains(&path) {
            return Err(VaultError::unavailable(format!("injected list failure at {path}")));
        }

        if let Some(data) = self.listings.get(&path) {
            return Ok(Some(Secret {
                data: Some(data.clone()),
                ..Secret::default()
            }));
        }

        let children = self.children(&path);
        if children.is_empty() {
            return Ok(None);
        }

        Ok(Some(Secret {
            data: Some(Map::from_iter([("keys".to_string(), json!(children))])),
            ..Secret::default()
        }))
    }

    async fn read(&self, path: &str) -> VaultResult<Option<Secret>> {
        let path = normalize(path);
        self.record(StoreCall::Read(path.clone())).await;

        if self.failing_reads.contains(&path) {
            return Err(VaultError::unavailable(format!("injected read failure at {path}")));
        }
        if self.vanished.contains(&path) {
            return Ok(None);
        }

        Ok(self.leaves.get(&path).map(|data| Secret {
            data: Some(data.clone()),
            ..Secret::default()
        }))
    }

    async fn write(&self, path: &str, payload: Value) -> VaultResult<Option<Secret>> {
        let path = normalize(path);
        self.record(StoreCall::Write(path.clone())).await;
        self.state.write().await.writes.push((path.clone(), payload));

        match self.logins.get(&path) {
            Some(token) => Ok(Some(Secret {
                auth: Some(vaultenv_vault::SecretAuth {
                    client_token: token.clone(),
                    ..Default::default()
                }),
                ..Secret::default()
            })),
            None => Err(VaultError::api(400, path, vec!["permission denied".to_string()])),
        }
    }

    async fn set_token(&self, token: SecretString) {
        self.record(StoreCall::SetToken).await;
        self.state.write().await.token = Some(token.expose_secret().to_string());
    }

    async fn revoke_self(&self) -> VaultResult<()> {
        self.record(StoreCall::RevokeSelf).await;
        if self.revoke_fails {
            return Err(VaultError::unavailable("injected revoke failure"));
        }
        self.state.write().await.token = None;
        Ok(())
    }
}
