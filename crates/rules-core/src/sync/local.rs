//! Snapshot of the rule files currently on disk

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rules_fs::{NormalizedPath, RulesPath, compute_checksum};

use crate::rules::RuleCollection;
use crate::{Error, Result};

/// Modification time and digest of one local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub modified: DateTime<Utc>,
    pub digest: String,
}

/// Every rule file under a rules directory
#[derive(Debug, Clone)]
pub struct LocalSnapshot {
    pub collection: RuleCollection,
    pub files: BTreeMap<String, LocalFile>,
}

impl LocalSnapshot {
    /// Walk `rules_dir` recursively and read every rule file.
    ///
    /// The ledger sidecar, the backup tree and hidden entries are skipped.
    /// Files that are not valid UTF-8 are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RulesDirNotFound`] when `rules_dir` is not a directory.
    pub fn scan(rules_dir: &NormalizedPath, name: &str) -> Result<Self> {
        if !rules_dir.is_dir() {
            return Err(Error::RulesDirNotFound {
                path: rules_dir.to_native(),
            });
        }

        let mut snapshot = Self {
            collection: RuleCollection::new(name, ""),
            files: BTreeMap::new(),
        };
        snapshot.walk(&rules_dir.to_native(), "")?;

        tracing::debug!(dir = %rules_dir, files = snapshot.files.len(), "Scanned local rules");
        Ok(snapshot)
    }

    fn walk(&mut self, dir: &Path, prefix: &str) -> Result<()> {
        let mut entries = fs::read_dir(dir)
            .map_err(|e| rules_fs::Error::io(dir, e))?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| rules_fs::Error::io(dir, e))?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(path = ?entry.path(), "Skipping file with non-UTF-8 name");
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            let relative = if prefix.is_empty() {
                file_name.clone()
            } else {
                format!("{}/{}", prefix, file_name)
            };
            if RulesPath::is_reserved(&relative) {
                continue;
            }

            let path = entry.path();
            let metadata = fs::metadata(&path).map_err(|e| rules_fs::Error::io(&path, e))?;
            if metadata.is_dir() {
                self.walk(&path, &relative)?;
                continue;
            }
            if !metadata.is_file() {
                continue;
            }

            let bytes = fs::read(&path).map_err(|e| rules_fs::Error::io(&path, e))?;
            let digest = compute_checksum(&bytes);
            let content = match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(_) => {
                    tracing::warn!(path = %relative, "Skipping non-UTF-8 rule file");
                    continue;
                }
            };
            let modified: DateTime<Utc> = metadata
                .modified()
                .map_err(|e| rules_fs::Error::io(&path, e))?
                .into();

            self.collection.add_file(file_name, content, &relative);
            self.files.insert(relative, LocalFile { modified, digest });
        }
        Ok(())
    }

    /// Per-file modification times, as carried in the transport manifest
    pub fn modified_times(&self) -> BTreeMap<String, DateTime<Utc>> {
        self.files
            .iter()
            .map(|(path, file)| (path.clone(), file.modified))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scan_skips_ledger_backups_and_hidden() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("lang")).unwrap();
        fs::create_dir_all(root.join(".backups/run")).unwrap();
        fs::write(root.join("a.mdc"), "alpha").unwrap();
        fs::write(root.join("lang/rust.mdc"), "rust").unwrap();
        fs::write(root.join("version.json"), "{}").unwrap();
        fs::write(root.join(".backups/run/a.mdc"), "old").unwrap();
        fs::write(root.join(".DS_Store"), "junk").unwrap();

        let snapshot = LocalSnapshot::scan(&NormalizedPath::new(root), "team").unwrap();

        let paths: Vec<&str> = snapshot.collection.paths().collect();
        assert_eq!(paths, vec!["a.mdc", "lang/rust.mdc"]);
        assert_eq!(snapshot.collection.get_file("lang/rust.mdc").unwrap().name, "rust.mdc");
        assert_eq!(
            snapshot.files["a.mdc"].digest,
            rules_fs::compute_content_checksum("alpha")
        );
    }

    #[test]
    fn scan_keeps_empty_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("empty.mdc"), "").unwrap();

        let snapshot = LocalSnapshot::scan(&NormalizedPath::new(temp.path()), "t").unwrap();

        assert_eq!(snapshot.collection.get_file("empty.mdc").unwrap().content, "");
    }

    #[test]
    fn scan_skips_binary_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("blob.bin"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(temp.path().join("a.mdc"), "a").unwrap();

        let snapshot = LocalSnapshot::scan(&NormalizedPath::new(temp.path()), "t").unwrap();

        assert_eq!(snapshot.files.len(), 1);
    }

    #[test]
    fn missing_dir_is_error() {
        let temp = TempDir::new().unwrap();
        let result = LocalSnapshot::scan(&NormalizedPath::new(temp.path().join("nope")), "t");
        assert!(matches!(result, Err(Error::RulesDirNotFound { .. })));
    }
}
