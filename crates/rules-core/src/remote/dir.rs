//! Directory-backed blob store
//!
//! Each blob set is a JSON file `<root>/<id>.json`. Useful for offline use,
//! sharing through a synced folder, and end-to-end tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use rules_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

use super::{BlobSet, BlobSetSummary, BlobStore, describe, template_name};
use crate::{Error, Result};

#[derive(Debug, Serialize, Deserialize)]
struct StoredBlobSet {
    description: String,
    files: BTreeMap<String, String>,
}

/// Blob store keeping one JSON file per blob set
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn set_path(&self, id: &str) -> Result<NormalizedPath> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(Error::remote(format!("invalid blob set id '{}'", id)));
        }
        Ok(NormalizedPath::new(self.root.join(format!("{}.json", id))))
    }

    fn write(&self, id: &str, name: &str, files: &BTreeMap<String, String>) -> Result<()> {
        if let Some((file, _)) = files.iter().find(|(_, content)| content.is_empty()) {
            return Err(Error::remote(format!("file '{}' has empty content", file)));
        }
        let stored = StoredBlobSet {
            description: describe(name),
            files: files.clone(),
        };
        let content = serde_json::to_vec_pretty(&stored)?;
        io::write_atomic(&self.set_path(id)?, &content)?;
        Ok(())
    }

    fn read(&self, id: &str) -> Result<StoredBlobSet> {
        let path = self.set_path(id)?;
        let raw = match io::read_text(&path) {
            Ok(raw) => raw,
            Err(e) if e.is_not_found() => {
                return Err(Error::remote(format!("blob set '{}' not found", id)));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw).map_err(|e| Error::format(path.as_str(), e.to_string()))
    }

    fn new_id(&self) -> String {
        let base = format!("{:x}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        let mut id = base.clone();
        let mut counter = 1;
        while self.root.join(format!("{}.json", id)).exists() {
            id = format!("{}-{}", base, counter);
            counter += 1;
        }
        id
    }
}

impl BlobStore for DirBlobStore {
    fn list(&self) -> Result<Vec<BlobSetSummary>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.read(id) {
                Ok(stored) => {
                    if let Some(name) = template_name(&stored.description) {
                        summaries.push(BlobSetSummary {
                            id: id.to_string(),
                            name: name.to_string(),
                        });
                    }
                }
                Err(e) => tracing::warn!(?path, error = %e, "Skipping unreadable blob set"),
            }
        }

        summaries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }

    fn create(&self, name: &str, files: &BTreeMap<String, String>) -> Result<String> {
        fs::create_dir_all(&self.root)?;
        let id = self.new_id();
        self.write(&id, name, files)?;
        tracing::debug!(id, name, "Created blob set");
        Ok(id)
    }

    fn get(&self, id: &str) -> Result<BlobSet> {
        let stored = self.read(id)?;
        Ok(BlobSet {
            description: stored.description,
            files: stored.files,
        })
    }

    fn delete(&self, id: &str) -> Result<()> {
        let path = self.set_path(id)?;
        match fs::remove_file(path.to_native()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::remote(format!("blob set '{}' not found", id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Atomic in-place update through write-then-rename
    fn replace(&self, id: &str, name: &str, files: &BTreeMap<String, String>) -> Result<String> {
        self.read(id)?;
        self.write(id, name, files)?;
        Ok(id.to_string())
    }
}
