//! Secret Walker: depth-first traversal of the store below a prefix.
//!
//! The store has no node type. A path whose listing returns data is a
//! directory; one whose listing is empty or absent is a leaf and is handed
//! to the emitter. Children are visited in the order the listing returns
//! them, each subtree finishing before the next sibling starts. The first
//! failure aborts the walk.

use std::io::Write;

use serde_json::Value;
use tracing::{debug, instrument, warn};
use vaultenv_vault::SecretStore;

use crate::emitter::{env_var_name, render_value, EmitStats, EnvEmitter};
use crate::error::WalkError;
use crate::paths::{join, last_segment};

/// What a finished walk saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Directories listed with at least one entry
    pub directories: usize,
    /// Leaf paths handed to the emitter
    pub leaves: usize,
    /// Emitter counters
    pub emitted: EmitStats,
}

/// Walks a [`SecretStore`] and feeds leaves to an [`EnvEmitter`].
#[derive(Debug)]
pub struct SecretWalker<'a, S: SecretStore + ?Sized, W: Write> {
    store: &'a S,
    emitter: EnvEmitter<W>,
    directories: usize,
    leaves: usize,
}

impl<'a, S: SecretStore + ?Sized, W: Write> SecretWalker<'a, S, W> {
    /// Create a walker reading from `store` and writing to `out`.
    pub fn new(store: &'a S, out: W) -> Self {
        Self {
            store,
            emitter: EnvEmitter::new(out),
            directories: 0,
            leaves: 0,
        }
    }

    /// Counters so far.
    #[must_use]
    pub const fn stats(&self) -> WalkStats {
        WalkStats {
            directories: self.directories,
            leaves: self.leaves,
            emitted: self.emitter.stats(),
        }
    }

    /// Consume the walker and return the output sink.
    pub fn into_inner(self) -> W {
        self.emitter.into_inner()
    }

    /// Visit every leaf under `join(base, postfix)`.
    ///
    /// # Errors
    ///
    /// The first list or read failure, wrapped once per directory level
    /// with the child path that failed.
    pub async fn walk(&mut self, base: &str, postfix: &str) -> Result<(), WalkError> {
        let path = join(base, postfix);
        let listing = self
            .store
            .list(&path)
            .await
            .map_err(|source| WalkError::List {
                path: path.clone(),
                source,
            })?;

        let Some(listing) = listing.filter(|secret| !secret.is_empty()) else {
            return self.emit(base, postfix).await;
        };

        let children: Vec<String> = match listing.field("keys") {
            None => {
                debug!(path = %path, "Listing has no keys, nothing to visit");
                Vec::new()
            }
            Some(Value::Array(keys)) => keys
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(other) => {
                return Err(WalkError::UnexpectedListing {
                    path,
                    found: json_type(other),
                })
            }
        };

        self.directories += 1;
        debug!(path = %path, children = children.len(), "Listed directory");

        for child in children {
            let child_postfix = join(postfix, &child);
            Box::pin(self.walk(base, &child_postfix))
                .await
                .map_err(|source| WalkError::Child {
                    path: join(base, &child_postfix),
                    source: Box::new(source),
                })?;
        }

        Ok(())
    }

    /// Read one leaf and export it.
    ///
    /// A leaf gone since its listing gets a warning comment and is skipped.
    /// A leaf without a `value` field produces nothing.
    ///
    /// # Errors
    ///
    /// [`WalkError::Read`] when the read fails, [`WalkError::Output`] when
    /// the sink does.
    #[instrument(skip(self))]
    pub async fn emit(&mut self, base: &str, postfix: &str) -> Result<(), WalkError> {
        let path = join(base, postfix);
        self.leaves += 1;

        let secret = self
            .store
            .read(&path)
            .await
            .map_err(|source| WalkError::Read {
                path: path.clone(),
                source,
            })?;

        let Some(secret) = secret else {
            warn!(path = %path, "Secret vanished before it could be read, skipping");
            self.emitter.missing(&path)?;
            return Ok(());
        };

        let Some(value) = secret.field("value").and_then(render_value) else {
            debug!(path = %path, "Secret has no value field");
            return Ok(());
        };

        let relative = join("", postfix);
        let name = if relative.is_empty() {
            env_var_name(last_segment(base))
        } else {
            env_var_name(&relative)
        };

        self.emitter.export(&name, &value, &path)?;
        Ok(())
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
