//! Proptest generators for secret trees.

use proptest::prelude::*;
use std::collections::BTreeMap;

/// A single path segment as Vault key names usually look.
pub fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,6}"
}

/// A relative leaf path of one to four segments.
pub fn relative_path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(segment_strategy(), 1..=4).prop_map(|segments| segments.join("/"))
}

/// Printable values, including quotes and shell metacharacters.
pub fn secret_value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~]{0,24}",
        Just("it's".to_string()),
        Just("''".to_string()),
        Just("$(rm -rf /)".to_string()),
        Just("line1\nline2".to_string()),
    ]
}

/// A well-formed tree: no leaf path is also a directory of another leaf.
///
/// Keys are relative to the walk prefix; values are the leaf `value` field.
pub fn secret_tree_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(relative_path_strategy(), secret_value_strategy(), 0..16)
        .prop_map(prune_directory_leaves)
}

/// Drop every leaf whose path is a directory of another leaf.
#[must_use]
pub fn prune_directory_leaves(tree: BTreeMap<String, String>) -> BTreeMap<String, String> {
    let paths: Vec<String> = tree.keys().cloned().collect();
    tree.into_iter()
        .filter(|(path, _)| {
            let dir = format!("{path}/");
            !paths.iter().any(|other| other.starts_with(&dir))
        })
        .collect()
}
