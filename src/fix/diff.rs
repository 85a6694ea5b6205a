//! Unified diffs and change counts for rewrites.

use similar::{ChangeTag, TextDiff};

/// Unified diff between two versions of a resource.
pub fn unified_diff(resource: &str, before: &str, after: &str) -> String {
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", resource), &format!("b/{}", resource))
        .to_string()
}

/// Number of inserted and deleted lines.
pub fn change_counts(before: &str, after: &str) -> (usize, usize) {
    let diff = TextDiff::from_lines(before, after);
    diff.iter_all_changes()
        .fold((0, 0), |(inserted, deleted), change| match change.tag() {
            ChangeTag::Insert => (inserted + 1, deleted),
            ChangeTag::Delete => (inserted, deleted + 1),
            ChangeTag::Equal => (inserted, deleted),
        })
}
