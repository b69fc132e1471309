//! Env Emitter: turns leaf secrets into shell `export` statements.
//!
//! Output is meant to be `eval`ed or sourced, so every value is wrapped in
//! single quotes and embedded single quotes are closed, emitted inside
//! double quotes, and reopened.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{self, Write};

use serde_json::Value;
use tracing::warn;

/// Variable name for a leaf: `/` becomes `_`, then upper-cased.
///
/// Distinct paths can map to the same name (`db/host` and `DB_HOST`);
/// [`EnvEmitter`] reports such collisions.
#[must_use]
pub fn env_var_name(relative_path: &str) -> String {
    relative_path.replace('/', "_").to_uppercase()
}

/// POSIX single-quote escaping.
///
/// ```
/// use vaultenv::emitter::shell_escape;
///
/// assert_eq!(shell_escape("plain"), "'plain'");
/// assert_eq!(shell_escape("it's"), r#"'it'"'"'s'"#);
/// ```
#[must_use]
pub fn shell_escape(value: &str) -> String {
    format!("'{}'", value.replace('\'', r#"'"'"'"#))
}

/// Text to export for a `value` field.
///
/// Strings pass through, `null` counts as absent, anything else is
/// rendered as compact JSON.
#[must_use]
pub fn render_value(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s)),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Counters for what the emitter wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitStats {
    /// `export` lines written
    pub exported: usize,
    /// Leaves skipped because they vanished before the read
    pub skipped: usize,
    /// Exports that redefined a name exported earlier in the run
    pub overridden: usize,
}

/// Writes export statements and warning comments to a sink.
#[derive(Debug)]
pub struct EnvEmitter<W: Write> {
    out: W,
    exported: HashMap<String, String>,
    stats: EmitStats,
}

impl<W: Write> EnvEmitter<W> {
    /// Create an emitter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            exported: HashMap::new(),
            stats: EmitStats::default(),
        }
    }

    /// Write `export NAME='value'`.
    ///
    /// If `name` was already exported in this run, a warning comment goes
    /// out first; the later export wins once the output is sourced.
    ///
    /// # Errors
    ///
    /// Propagates write failures of the sink.
    pub fn export(&mut self, name: &str, value: &str, source_path: &str) -> io::Result<()> {
        if let Some(previous) = self.exported.insert(name.to_string(), source_path.to_string()) {
            warn!(name, path = source_path, previous = %previous, "Environment variable redefined");
            writeln!(
                self.out,
                "# warning, {name} from {source_path} overrides an earlier secret from {previous}"
            )?;
            self.stats.overridden += 1;
        }

        writeln!(self.out, "export {name}={}", shell_escape(value))?;
        self.out.flush()?;
        self.stats.exported += 1;
        Ok(())
    }

    /// Write the warning comment for a leaf that vanished before its read.
    ///
    /// # Errors
    ///
    /// Propagates write failures of the sink.
    pub fn missing(&mut self, path: &str) -> io::Result<()> {
        writeln!(self.out, "# warning, value for secret at {path} not found! skipping...")?;
        self.out.flush()?;
        self.stats.skipped += 1;
        Ok(())
    }

    /// Counters so far.
    #[must_use]
    pub const fn stats(&self) -> EmitStats {
        self.stats
    }

    /// Consume the emitter and return the sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn output(emitter: EnvEmitter<Vec<u8>>) -> String {
        String::from_utf8(emitter.into_inner()).unwrap()
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("db/host"), "DB_HOST");
        assert_eq!(env_var_name("cache"), "CACHE");
        assert_eq!(env_var_name("a/b/c"), "A_B_C");
        assert_eq!(env_var_name("Db_Host"), env_var_name("db/host"));
    }

    #[test]
    fn test_shell_escape_reopens_quote() {
        assert_eq!(shell_escape(""), "''");
        assert_eq!(shell_escape("a'b'c"), r#"'a'"'"'b'"'"'c'"#);
        assert_eq!(shell_escape("$HOME `id`"), "'$HOME `id`'");
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("x")).as_deref(), Some("x"));
        assert_eq!(render_value(&json!(5432)).as_deref(), Some("5432"));
        assert_eq!(render_value(&json!(true)).as_deref(), Some("true"));
        assert_eq!(render_value(&json!({"a": 1})).as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(render_value(&Value::Null), None);
    }

    #[test]
    fn test_export_and_missing() {
        let mut emitter = EnvEmitter::new(Vec::new());
        emitter.export("DB_HOST", "x", "secret/app/db/host").unwrap();
        emitter.missing("secret/app/gone").unwrap();

        assert_eq!(
            emitter.stats(),
            EmitStats { exported: 1, skipped: 1, overridden: 0 }
        );
        assert_eq!(
            output(emitter),
            "export DB_HOST='x'\n# warning, value for secret at secret/app/gone not found! skipping...\n"
        );
    }

    #[test]
    fn test_collision_warns_and_last_wins() {
        let mut emitter = EnvEmitter::new(Vec::new());
        emitter.export("DB_HOST", "first", "secret/app/db/host").unwrap();
        emitter.export("DB_HOST", "second", "secret/app/DB_HOST").unwrap();

        assert_eq!(emitter.stats().overridden, 1);
        let text = output(emitter);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "export DB_HOST='first'");
        assert!(lines[1].starts_with("# warning, DB_HOST from secret/app/DB_HOST overrides"));
        assert_eq!(lines[2], "export DB_HOST='second'");
    }

    /// Undo the quoting the way a POSIX shell would.
    fn shell_unquote(quoted: &str) -> String {
        let mut out = String::new();
        let mut chars = quoted.chars();
        while let Some(c) = chars.next() {
            let close = match c {
                '\'' => '\'',
                '"' => '"',
                other => panic!("unquoted character {other:?}"),
            };
            for inner in chars.by_ref() {
                if inner == close {
                    break;
                }
                out.push(inner);
            }
        }
        out
    }

    proptest! {
        #[test]
        fn prop_escape_round_trips_through_shell_quoting(value in "\\PC{0,32}") {
            prop_assert_eq!(shell_unquote(&shell_escape(&value)), value);
        }

        #[test]
        fn prop_name_has_no_separators(path in "[a-zA-Z0-9_/-]{1,32}") {
            let name = env_var_name(&path);
            prop_assert!(!name.contains('/'));
            prop_assert_eq!(name.chars().count(), path.chars().count());
        }
    }
}
