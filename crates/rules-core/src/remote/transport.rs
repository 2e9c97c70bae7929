//! Blob-set encoding of rule collections
//!
//! A collection travels as one blob per rule (key = relative path) plus a
//! manifest blob. Stores reject empty values, so zero-length rules are
//! uploaded as [`EMPTY_PLACEHOLDER`] and flagged in the manifest; decoding
//! turns flagged placeholders back into empty content before any digest is
//! computed. The manifest also carries each file's modification time, which
//! the sync engine uses to detect remotely newer files.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rules_fs::{RulesPath, validate_relative_path};
use serde::{Deserialize, Serialize};

use super::{BlobSet, template_name};
use crate::rules::RuleCollection;
use crate::{Error, Result};

/// Substitute content for zero-length files
pub const EMPTY_PLACEHOLDER: &str = " ";

/// Blob name of the manifest record
pub const MANIFEST_FILE: &str = ".cursorrules-manifest.json";

const MANIFEST_FORMAT: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    format: u32,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    files: BTreeMap<String, ManifestEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ManifestEntry {
    digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    empty: bool,
}

/// A collection downloaded from the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCollection {
    pub collection: RuleCollection,
    /// Last-modified times reported by the pushing side
    pub modified: BTreeMap<String, DateTime<Utc>>,
}

impl RemoteCollection {
    /// Wrap a collection with no modification times
    pub fn new(collection: RuleCollection) -> Self {
        Self {
            collection,
            modified: BTreeMap::new(),
        }
    }

    pub fn with_modified(mut self, path: &str, modified: DateTime<Utc>) -> Self {
        self.modified.insert(path.to_string(), modified);
        self
    }

    /// Remote last-modified time of a file, if known
    pub fn modified(&self, path: &str) -> Option<DateTime<Utc>> {
        self.modified.get(path).copied()
    }
}

/// Encode a collection into blob-set files.
///
/// # Errors
///
/// Returns a `Format` error if a rule path collides with the manifest name.
pub fn encode(
    collection: &RuleCollection,
    modified: &BTreeMap<String, DateTime<Utc>>,
) -> Result<BTreeMap<String, String>> {
    let mut files = BTreeMap::new();
    let mut entries = BTreeMap::new();

    for rule in collection.iter() {
        if rule.path == MANIFEST_FILE {
            return Err(Error::format(
                &rule.path,
                "rule path collides with the reserved manifest name",
            ));
        }

        let content = if rule.is_empty() {
            EMPTY_PLACEHOLDER.to_string()
        } else {
            rule.content.clone()
        };
        files.insert(rule.path.clone(), content);
        entries.insert(
            rule.path.clone(),
            ManifestEntry {
                digest: rule.digest(),
                modified: modified.get(&rule.path).copied(),
                empty: rule.is_empty(),
            },
        );
    }

    let manifest = Manifest {
        format: MANIFEST_FORMAT,
        name: collection.name().to_string(),
        description: collection.description().to_string(),
        files: entries,
    };
    files.insert(MANIFEST_FILE.to_string(), serde_json::to_string_pretty(&manifest)?);

    Ok(files)
}

/// Decode a fetched blob set into a collection.
///
/// Every key is validated as a safe relative path. Blob sets without a
/// manifest (created by older versions of the tool) are accepted; in that
/// case a lone placeholder is read as empty content.
///
/// # Errors
///
/// Returns a `Format` error for a malformed manifest, a manifest that lists
/// files absent from the blob set, or unsafe or reserved paths.
pub fn decode(blob: &BlobSet, fallback_name: &str) -> Result<RemoteCollection> {
    let manifest = match blob.files.get(MANIFEST_FILE) {
        Some(raw) => Some(
            serde_json::from_str::<Manifest>(raw)
                .map_err(|e| Error::format(MANIFEST_FILE, e.to_string()))?,
        ),
        None => {
            tracing::warn!("Remote template has no manifest; treating it as a legacy upload");
            None
        }
    };

    let name = manifest
        .as_ref()
        .map(|m| m.name.clone())
        .filter(|n| !n.is_empty())
        .or_else(|| template_name(&blob.description).map(str::to_string))
        .unwrap_or_else(|| fallback_name.to_string());
    let description = manifest
        .as_ref()
        .map(|m| m.description.clone())
        .unwrap_or_default();

    let mut collection = RuleCollection::new(name, description);
    let mut modified = BTreeMap::new();

    for (key, content) in &blob.files {
        if key == MANIFEST_FILE {
            continue;
        }
        let path = validate_relative_path(key).map_err(|e| Error::format(key, e.to_string()))?;
        if RulesPath::is_reserved(&path) {
            return Err(Error::format(key, "path is reserved for the version ledger or backups"));
        }

        let entry = manifest.as_ref().and_then(|m| m.files.get(key));
        let is_placeholder = content == EMPTY_PLACEHOLDER;
        let content = match entry {
            Some(entry) if entry.empty && is_placeholder => "",
            Some(_) => content.as_str(),
            None if manifest.is_none() && is_placeholder => "",
            None => content.as_str(),
        };

        if let Some(time) = entry.and_then(|e| e.modified) {
            modified.insert(path.clone(), time);
        }
        let file_name = path.rsplit('/').next().unwrap_or(&path).to_string();
        collection.add_file(file_name, content, &path);
    }

    if let Some(manifest) = &manifest
        && let Some(missing) = manifest.files.keys().find(|k| !blob.files.contains_key(*k))
    {
        return Err(Error::format(
            MANIFEST_FILE,
            format!("manifest lists '{}' but the blob set does not contain it", missing),
        ));
    }

    Ok(RemoteCollection {
        collection,
        modified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> RuleCollection {
        let mut collection = RuleCollection::new("team", "Team rules");
        collection.add_file("a.mdc", "alpha", "a.mdc");
        collection.add_file("empty.mdc", "", "empty.mdc");
        collection.add_file("rust.mdc", "fn main() {}\n", "lang/rust.mdc");
        collection
    }

    fn as_blob(files: BTreeMap<String, String>) -> BlobSet {
        BlobSet {
            description: super::super::describe("team"),
            files,
        }
    }

    #[test]
    fn encode_substitutes_placeholder_for_empty() {
        let files = encode(&sample(), &BTreeMap::new()).unwrap();

        assert_eq!(files.get("empty.mdc").map(String::as_str), Some(EMPTY_PLACEHOLDER));
        assert!(files.values().all(|content| !content.is_empty()));
        assert!(files.contains_key(MANIFEST_FILE));
    }

    #[test]
    fn round_trip_is_lossless() {
        let collection = sample();
        let now = Utc::now();
        let mut modified = BTreeMap::new();
        modified.insert("a.mdc".to_string(), now);

        let decoded = decode(&as_blob(encode(&collection, &modified).unwrap()), "x").unwrap();

        assert_eq!(decoded.collection, collection);
        assert_eq!(decoded.modified("a.mdc"), Some(now));
        assert_eq!(decoded.modified("lang/rust.mdc"), None);
    }

    #[test]
    fn round_trip_empty_collection() {
        let collection = RuleCollection::new("empty", "");
        let decoded = decode(&as_blob(encode(&collection, &BTreeMap::new()).unwrap()), "x").unwrap();
        assert_eq!(decoded.collection, collection);
    }

    #[test]
    fn real_single_space_content_survives() {
        let mut collection = RuleCollection::new("team", "");
        collection.add_file("space.mdc", " ", "space.mdc");

        let decoded = decode(&as_blob(encode(&collection, &BTreeMap::new()).unwrap()), "x").unwrap();

        assert_eq!(decoded.collection.get_file("space.mdc").unwrap().content, " ");
    }

    #[test]
    fn legacy_blob_without_manifest() {
        let mut files = BTreeMap::new();
        files.insert("a.mdc".to_string(), "alpha".to_string());
        files.insert("blank.mdc".to_string(), " ".to_string());

        let decoded = decode(&as_blob(files), "fallback").unwrap();

        assert_eq!(decoded.collection.name(), "team");
        assert_eq!(decoded.collection.get_file("blank.mdc").unwrap().content, "");
        assert!(decoded.modified.is_empty());
    }

    #[test]
    fn rejects_escaping_paths() {
        let mut files = BTreeMap::new();
        files.insert("../evil.mdc".to_string(), "x".to_string());

        assert!(matches!(decode(&as_blob(files), "t"), Err(Error::Format { .. })));
    }

    #[test]
    fn rejects_reserved_paths() {
        let mut files = BTreeMap::new();
        files.insert("version.json".to_string(), "{}".to_string());

        assert!(matches!(decode(&as_blob(files), "t"), Err(Error::Format { .. })));
    }

    #[test]
    fn rejects_manifest_listing_missing_file() {
        let mut files = encode(&sample(), &BTreeMap::new()).unwrap();
        files.remove("a.mdc");

        assert!(matches!(decode(&as_blob(files), "t"), Err(Error::Format { .. })));
    }

    #[test]
    fn rejects_malformed_manifest() {
        let mut files = BTreeMap::new();
        files.insert(MANIFEST_FILE.to_string(), "not json".to_string());

        assert!(matches!(decode(&as_blob(files), "t"), Err(Error::Format { .. })));
    }
}
