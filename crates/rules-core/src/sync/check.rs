//! Classification of remote files against the version ledger
//!
//! Each file of a remote collection is classified as [`FileStatus::New`],
//! [`FileStatus::Diverged`] or [`FileStatus::Unchanged`]. The conflict set is
//! every diverged path plus every new path that is already occupied on disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::FileVersion;

/// Sync status of one remote file relative to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    /// No ledger entry exists for the path
    New,
    /// The digest differs from the ledger, or the remote copy is newer
    Diverged,
    /// Same digest and the remote copy is not newer
    Unchanged,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::New => "new",
            Self::Diverged => "diverged",
            Self::Unchanged => "unchanged",
        };
        f.write_str(label)
    }
}

/// How an untracked local file at a remote path is judged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Any existing file at the path is a conflict
    #[default]
    Path,
    /// Only an existing file whose digest differs from the remote is a conflict
    Content,
}

impl std::fmt::Display for Strictness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Path => "path",
            Self::Content => "content",
        };
        f.write_str(label)
    }
}

/// Classify one remote file.
///
/// A remote file without a modification time is never considered newer.
pub fn classify(
    remote_digest: &str,
    remote_modified: Option<DateTime<Utc>>,
    entry: Option<&FileVersion>,
) -> FileStatus {
    let Some(entry) = entry else {
        return FileStatus::New;
    };
    let newer = remote_modified.is_some_and(|modified| modified > entry.last_modified);
    if entry.digest != remote_digest || newer {
        FileStatus::Diverged
    } else {
        FileStatus::Unchanged
    }
}

/// Classification of one remote file, with its local occupancy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileClassification {
    pub path: String,
    pub status: FileStatus,
    /// A file currently exists at the path
    pub occupied: bool,
    /// The path belongs to the conflict set
    pub conflict: bool,
    pub remote_digest: String,
    /// Digest of the file on disk, when occupied
    pub local_digest: Option<String>,
}

impl FileClassification {
    /// Whether the file on disk already holds the remote content
    pub fn matches_disk(&self) -> bool {
        self.local_digest.as_deref() == Some(self.remote_digest.as_str())
    }
}

/// Classification of a whole remote collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    files: Vec<FileClassification>,
}

impl SyncPlan {
    pub fn new(files: Vec<FileClassification>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[FileClassification] {
        &self.files
    }

    pub fn get(&self, path: &str) -> Option<&FileClassification> {
        self.files.iter().find(|file| file.path == path)
    }

    /// Sorted paths of the conflict set
    pub fn conflicts(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .files
            .iter()
            .filter(|file| file.conflict)
            .map(|file| file.path.clone())
            .collect();
        paths.sort();
        paths
    }

    pub fn has_conflicts(&self) -> bool {
        self.files.iter().any(|file| file.conflict)
    }

    /// Paths with the given status, in collection order
    pub fn with_status(&self, status: FileStatus) -> Vec<&str> {
        self.files
            .iter()
            .filter(|file| file.status == status)
            .map(|file| file.path.as_str())
            .collect()
    }
}

/// Whether a classified file belongs to the conflict set
pub(crate) fn is_conflict(
    status: FileStatus,
    occupied: bool,
    matches_disk: bool,
    strictness: Strictness,
) -> bool {
    match status {
        FileStatus::Diverged => true,
        FileStatus::New if occupied => match strictness {
            Strictness::Path => true,
            Strictness::Content => !matches_disk,
        },
        FileStatus::New | FileStatus::Unchanged => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    #[case(Strictness::Path)]
    #[case(Strictness::Content)]
    fn strictness_displays_as_configured(#[case] strictness: Strictness) {
        let toml = format!("value = \"{}\"", strictness);
        #[derive(Deserialize)]
        struct Wrapper {
            value: Strictness,
        }
        let parsed: Wrapper = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.value, strictness);
    }

    #[test]
    fn absent_entry_is_new() {
        assert_eq!(classify("sha256:aa", None, None), FileStatus::New);
    }

    #[rstest]
    #[case("sha256:aa", 0, FileStatus::Unchanged)]
    #[case("sha256:bb", 0, FileStatus::Diverged)]
    #[case("sha256:aa", 60, FileStatus::Diverged)]
    #[case("sha256:aa", -60, FileStatus::Unchanged)]
    #[case("sha256:bb", -60, FileStatus::Diverged)]
    fn classification(#[case] remote: &str, #[case] offset_secs: i64, #[case] expected: FileStatus) {
        let recorded = Utc::now();
        let entry = FileVersion::new(recorded, "sha256:aa");

        let status = classify(remote, Some(recorded + Duration::seconds(offset_secs)), Some(&entry));

        assert_eq!(status, expected);
    }

    #[test]
    fn unknown_remote_time_is_not_newer() {
        let entry = FileVersion::new(Utc::now(), "sha256:aa");
        assert_eq!(classify("sha256:aa", None, Some(&entry)), FileStatus::Unchanged);
    }

    #[rstest]
    #[case(FileStatus::Diverged, false, false, Strictness::Path, true)]
    #[case(FileStatus::New, true, true, Strictness::Path, true)]
    #[case(FileStatus::New, true, true, Strictness::Content, false)]
    #[case(FileStatus::New, true, false, Strictness::Content, true)]
    #[case(FileStatus::New, false, false, Strictness::Path, false)]
    #[case(FileStatus::Unchanged, true, false, Strictness::Path, false)]
    fn conflict_membership(
        #[case] status: FileStatus,
        #[case] occupied: bool,
        #[case] matches_disk: bool,
        #[case] strictness: Strictness,
        #[case] expected: bool,
    ) {
        assert_eq!(is_conflict(status, occupied, matches_disk, strictness), expected);
    }

    #[test]
    fn conflicts_are_sorted() {
        let file = |path: &str, conflict: bool| FileClassification {
            path: path.to_string(),
            status: FileStatus::Diverged,
            occupied: true,
            conflict,
            remote_digest: String::new(),
            local_digest: None,
        };
        let plan = SyncPlan::new(vec![file("z.mdc", true), file("b.mdc", false), file("a.mdc", true)]);

        assert_eq!(plan.conflicts(), vec!["a.mdc", "z.mdc"]);
        assert!(plan.has_conflicts());
    }
}
