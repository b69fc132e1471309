//! Joining store paths.
//!
//! Paths are `/`-delimited. Joining drops empty and `.` segments, resolves
//! `..` against the segments before it and strips trailing slashes, so a
//! directory entry such as `db/` joins the same way as `db`.

/// Join two store paths.
///
/// ```
/// use vaultenv::paths::join;
///
/// assert_eq!(join("secret/app", "db/"), "secret/app/db");
/// assert_eq!(join("secret/app/", ""), "secret/app");
/// assert_eq!(join("", "db/host"), "db/host");
/// ```
#[must_use]
pub fn join(base: &str, child: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(child.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Last segment of a path, ignoring trailing slashes.
#[must_use]
pub fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}
