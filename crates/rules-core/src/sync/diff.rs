//! Whole-file diffs shown before a merge overwrites local content
//!
//! Merge does not reconcile content: the remote file replaces the local one.
//! The diff exists so the user can see what was replaced (the old version is
//! also kept in the backup run).

use similar::{ChangeTag, TextDiff};

/// Line counts of a diff as computed by a line-level comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub insertions: usize,
    pub deletions: usize,
}

/// Diff of one conflicting file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: String,
    /// Unified diff text with a single hunk spanning both versions
    pub unified: String,
    pub stats: DiffStats,
}

impl FileDiff {
    /// Diff `old` (local) against `new` (remote).
    ///
    /// Every old line is emitted with `-` and every new line with `+` under
    /// one `@@ -1,N +1,M @@` header. A side with no lines uses `0,0`.
    pub fn whole_file(path: &str, old: &str, new: &str) -> Self {
        let old_lines: Vec<&str> = old.lines().collect();
        let new_lines: Vec<&str> = new.lines().collect();

        let mut unified = format!("--- a/{}\n+++ b/{}\n", path, path);
        unified.push_str(&format!(
            "@@ -{} +{} @@\n",
            range(old_lines.len()),
            range(new_lines.len())
        ));
        for line in &old_lines {
            unified.push('-');
            unified.push_str(line);
            unified.push('\n');
        }
        for line in &new_lines {
            unified.push('+');
            unified.push_str(line);
            unified.push('\n');
        }

        Self {
            path: path.to_string(),
            unified,
            stats: line_stats(old, new),
        }
    }

    /// Whether both sides were identical
    pub fn is_identical(&self) -> bool {
        self.stats == DiffStats::default()
    }
}

fn range(count: usize) -> String {
    if count == 0 {
        "0,0".to_string()
    } else {
        format!("1,{}", count)
    }
}

/// Count changed lines using a minimal line diff
fn line_stats(old: &str, new: &str) -> DiffStats {
    let mut stats = DiffStats::default();
    if old == new {
        return stats;
    }
    for change in TextDiff::from_lines(old, new).iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => stats.insertions += 1,
            ChangeTag::Delete => stats.deletions += 1,
            ChangeTag::Equal => {}
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn whole_file_hunk() {
        let diff = FileDiff::whole_file("a.mdc", "one\ntwo\n", "one\nthree\nfour\n");

        assert_eq!(
            diff.unified,
            "--- a/a.mdc\n+++ b/a.mdc\n@@ -1,2 +1,3 @@\n-one\n-two\n+one\n+three\n+four\n"
        );
        assert_eq!(
            diff.stats,
            DiffStats {
                insertions: 2,
                deletions: 1
            }
        );
    }

    #[test]
    fn empty_side_uses_zero_range() {
        let diff = FileDiff::whole_file("new.mdc", "", "x\n");

        assert!(diff.unified.contains("@@ -0,0 +1,1 @@"));
        assert_eq!(diff.stats.insertions, 1);
        assert_eq!(diff.stats.deletions, 0);
    }

    #[test]
    fn identical_content_has_no_stats() {
        let diff = FileDiff::whole_file("a.mdc", "same\n", "same\n");
        assert!(diff.is_identical());
    }
}
