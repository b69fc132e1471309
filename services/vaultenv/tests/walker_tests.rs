//! Traversal properties against the in-memory store.

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use vaultenv::emitter::{env_var_name, shell_escape};
use vaultenv::{SecretWalker, WalkError};
use vaultenv_test_utils::fixtures::{sample_exports, sample_tree, SAMPLE_PREFIX};
use vaultenv_test_utils::{secret_tree_strategy, InMemoryStore, ListingOrder};

async fn walk(store: &InMemoryStore, prefix: &str) -> (Result<(), WalkError>, Vec<String>) {
    let mut walker = SecretWalker::new(store, Vec::new());
    let result = walker.walk(prefix, "").await;
    let text = String::from_utf8(walker.into_inner()).unwrap();
    (result, text.lines().map(str::to_string).collect())
}

fn expected_exports(tree: &BTreeMap<String, String>) -> BTreeSet<String> {
    tree.iter()
        .map(|(path, value)| format!("export {}={}", env_var_name(path), shell_escape(value)))
        .collect()
}

#[tokio::test]
async fn sample_tree_exports_every_leaf() {
    let store = InMemoryStore::from_tree(SAMPLE_PREFIX, &sample_tree());
    let (result, mut lines) = walk(&store, SAMPLE_PREFIX).await;

    result.unwrap();
    lines.sort();
    assert_eq!(lines, sample_exports());
}

#[tokio::test]
async fn trailing_slash_prefix_is_equivalent() {
    let store = InMemoryStore::from_tree(SAMPLE_PREFIX, &sample_tree());
    let (result, mut lines) = walk(&store, "secret/app/").await;

    result.unwrap();
    lines.sort();
    assert_eq!(lines, sample_exports());
}

#[tokio::test]
async fn vanished_leaf_warns_and_siblings_continue() {
    let store = InMemoryStore::from_tree(SAMPLE_PREFIX, &sample_tree())
        .with_vanished("secret/app/db/host");
    let (result, lines) = walk(&store, SAMPLE_PREFIX).await;

    result.unwrap();
    assert!(lines.contains(&"# warning, value for secret at secret/app/db/host not found! skipping...".to_string()));
    assert!(!lines.iter().any(|line| line.starts_with("export DB_HOST=")));
    assert!(lines.contains(&"export DB_PORT='5432'".to_string()));
    assert!(lines.contains(&"export CACHE='redis://y'".to_string()));
}

#[tokio::test]
async fn list_failure_aborts_and_names_the_path() {
    let store = InMemoryStore::from_tree(SAMPLE_PREFIX, &sample_tree())
        .with_failing_list("secret/app/db");
    let (result, lines) = walk(&store, SAMPLE_PREFIX).await;

    let err = result.unwrap_err();
    assert_eq!(err.failing_path(), Some("secret/app/db"));
    assert!(matches!(err, WalkError::Child { ref path, .. } if path == "secret/app/db"));
    assert!(!lines.iter().any(|line| line.starts_with("export DB_")));
}

#[tokio::test]
async fn read_failure_aborts_remaining_siblings() {
    let store = InMemoryStore::from_tree(SAMPLE_PREFIX, &sample_tree())
        .with_failing_read("secret/app/db/host");
    let (result, lines) = walk(&store, SAMPLE_PREFIX).await;

    let err = result.unwrap_err();
    assert_eq!(err.failing_path(), Some("secret/app/db/host"));
    // Sorted order visits cache, then db/host, so db/port is never reached.
    assert_eq!(lines, vec!["export CACHE='redis://y'".to_string()]);
    assert_eq!(store.visits("secret/app/db/port").await, 0);
}

#[tokio::test]
async fn error_chain_mentions_each_level() {
    let store = InMemoryStore::new()
        .with_value("secret/app/a/b/c", "deep")
        .with_failing_read("secret/app/a/b/c");
    let (result, _) = walk(&store, SAMPLE_PREFIX).await;

    let chain = format!("{:#}", anyhow::Error::from(result.unwrap_err()));
    assert!(chain.starts_with("unable to get secret secret/app/a: unable to get secret secret/app/a/b"));
    assert!(chain.contains("unable to read secret at secret/app/a/b/c"));
}

#[tokio::test]
async fn quotes_are_escaped() {
    let store = InMemoryStore::new().with_value("secret/app/greeting", "it's");
    let (result, lines) = walk(&store, SAMPLE_PREFIX).await;

    result.unwrap();
    assert_eq!(lines, vec![r#"export GREETING='it'"'"'s'"#.to_string()]);
}

#[tokio::test]
async fn missing_prefix_reports_a_warning() {
    let store = InMemoryStore::new();
    let (result, lines) = walk(&store, "secret/none").await;

    result.unwrap();
    assert_eq!(
        lines,
        vec!["# warning, value for secret at secret/none not found! skipping...".to_string()]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every leaf, and only leaves, produces exactly one export line, and
    /// each store path is visited once.
    #[test]
    fn prop_every_leaf_exported_once(tree in secret_tree_strategy()) {
        prop_assume!(!tree.is_empty());
        let names: BTreeSet<String> = tree.keys().map(|path| env_var_name(path)).collect();
        prop_assume!(names.len() == tree.len());

        tokio_test::block_on(async {
            let store = InMemoryStore::from_tree(SAMPLE_PREFIX, &tree);
            let (result, lines) = walk(&store, SAMPLE_PREFIX).await;
            prop_assert!(result.is_ok());

            let exports: Vec<&String> = lines.iter().filter(|l| l.starts_with("export ")).collect();
            prop_assert_eq!(exports.len(), tree.len());
            let exported: BTreeSet<String> = exports.into_iter().cloned().collect();
            prop_assert_eq!(exported, expected_exports(&tree));

            for path in tree.keys() {
                let full = format!("{SAMPLE_PREFIX}/{path}");
                // Each leaf is listed once (to learn it is a leaf) and read once.
                prop_assert_eq!(store.visits(&full).await, 2);
            }
            Ok(())
        })?;
    }

    /// The set of output lines does not depend on listing order.
    #[test]
    fn prop_output_invariant_to_listing_order(tree in secret_tree_strategy(), seed in any::<u64>()) {
        tokio_test::block_on(async {
            let sorted = InMemoryStore::from_tree(SAMPLE_PREFIX, &tree);
            let shuffled = InMemoryStore::from_tree(SAMPLE_PREFIX, &tree)
                .with_order(ListingOrder::Shuffled(seed));
            let reversed = InMemoryStore::from_tree(SAMPLE_PREFIX, &tree)
                .with_order(ListingOrder::Reversed);

            let (a, lines_a) = walk(&sorted, SAMPLE_PREFIX).await;
            let (b, lines_b) = walk(&shuffled, SAMPLE_PREFIX).await;
            let (c, lines_c) = walk(&reversed, SAMPLE_PREFIX).await;
            prop_assert!(a.is_ok() && b.is_ok() && c.is_ok());

            let exports = |lines: Vec<String>| -> BTreeSet<String> {
                lines.into_iter().filter(|l| l.starts_with("export ")).collect()
            };
            let set_a = exports(lines_a);
            prop_assert_eq!(&set_a, &exports(lines_b));
            prop_assert_eq!(&set_a, &exports(lines_c));
            Ok(())
        })?;
    }

    /// A vanished leaf costs exactly its own export and nothing else.
    #[test]
    fn prop_vanished_leaf_only_skips_itself(tree in secret_tree_strategy(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!tree.is_empty());
        let names: BTreeSet<String> = tree.keys().map(|path| env_var_name(path)).collect();
        prop_assume!(names.len() == tree.len());

        let keys: Vec<&String> = tree.keys().collect();
        let gone = keys[pick.index(keys.len())].clone();

        tokio_test::block_on(async {
            let store = InMemoryStore::from_tree(SAMPLE_PREFIX, &tree)
                .with_vanished(&format!("{SAMPLE_PREFIX}/{gone}"));
            let (result, lines) = walk(&store, SAMPLE_PREFIX).await;
            prop_assert!(result.is_ok());

            let mut expected = tree.clone();
            expected.remove(&gone);
            let exported: BTreeSet<String> =
                lines.iter().filter(|l| l.starts_with("export ")).cloned().collect();
            prop_assert_eq!(exported, expected_exports(&expected));

            let warning = format!("# warning, value for secret at {SAMPLE_PREFIX}/{gone} not found! skipping...");
            prop_assert!(lines.contains(&warning));
            Ok(())
        })?;
    }
}
