//! Version ledger
//!
//! The ledger records, for every synchronized rule, the digest and local
//! modification time it had at the last sync. It is persisted as a JSON
//! sidecar (`version.json`) inside the rules directory and is the baseline
//! the sync engine compares remote collections against.
//!
//! The ledger is a plain value: the engine takes it, returns an updated copy,
//! and the caller decides when to [`save`](VersionLedger::save) it.

mod entry;

pub use entry::FileVersion;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rules_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Ledger format version written into new ledgers
pub const LEDGER_FORMAT_VERSION: &str = "1.0";

/// Per-directory record of synchronized file versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionLedger {
    /// Name of the template last synchronized into this directory
    template_name: String,
    /// Ledger format version for forward compatibility
    version: String,
    /// Version entries keyed by relative path
    #[serde(default)]
    files: BTreeMap<String, FileVersion>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VersionLedger {
    /// Create a new empty ledger
    pub fn new(template_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            template_name: template_name.into(),
            version: LEDGER_FORMAT_VERSION.to_string(),
            files: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn set_template_name(&mut self, name: impl Into<String>) {
        self.template_name = name.into();
        self.touch();
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Insert a fresh entry, replacing any previous one for `path`.
    pub fn add_file(&mut self, path: &str, last_modified: DateTime<Utc>, digest: impl Into<String>) {
        self.files
            .insert(path.to_string(), FileVersion::new(last_modified, digest));
        self.touch();
    }

    /// Update an existing entry in place.
    ///
    /// Silently does nothing when `path` has no entry; use
    /// [`add_file`](Self::add_file) or [`record_file`](Self::record_file)
    /// for unseen paths.
    pub fn update_file(&mut self, path: &str, last_modified: DateTime<Utc>, digest: impl Into<String>) {
        let Some(entry) = self.files.get_mut(path) else {
            return;
        };
        entry.last_modified = last_modified;
        entry.digest = digest.into();
        entry.last_synced = Utc::now();
        self.touch();
    }

    /// Update the entry for `path`, adding it first if it is absent.
    pub fn record_file(&mut self, path: &str, last_modified: DateTime<Utc>, digest: impl Into<String>) {
        if self.files.contains_key(path) {
            self.update_file(path, last_modified, digest);
        } else {
            self.add_file(path, last_modified, digest);
        }
    }

    pub fn get_file(&self, path: &str) -> Option<&FileVersion> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Iterate entries in path order
    pub fn files(&self) -> impl Iterator<Item = (&str, &FileVersion)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Bump `updated_at`, never moving it backwards
    fn touch(&mut self) {
        let now = Utc::now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    /// Serialize to the persisted JSON record
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from the persisted JSON record
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|e| Error::format("version ledger", e.to_string()))
    }

    /// Load a ledger from its sidecar file.
    ///
    /// A missing file yields a fresh empty ledger named `template_name`.
    ///
    /// # Errors
    ///
    /// Returns a `Format` error if the file exists but cannot be parsed.
    pub fn load(path: &NormalizedPath, template_name: &str) -> Result<Self> {
        match ConfigStore::new().load_optional::<Self>(path) {
            Ok(Some(ledger)) => {
                tracing::debug!(%path, entries = ledger.len(), "Loaded version ledger");
                Ok(ledger)
            }
            Ok(None) => {
                tracing::debug!(%path, "No version ledger found, starting fresh");
                Ok(Self::new(template_name))
            }
            Err(rules_fs::Error::ConfigParse { message, .. }) => {
                Err(Error::format(path.as_str(), message))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the ledger atomically to its sidecar file
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        tracing::debug!(%path, entries = self.len(), "Saved version ledger");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn ledger_new_has_format_version() {
        let ledger = VersionLedger::new("team");
        assert_eq!(ledger.version(), "1.0");
        assert_eq!(ledger.template_name(), "team");
        assert!(ledger.is_empty());
    }

    #[test]
    fn add_file_sets_last_synced_and_bumps_updated() {
        let mut ledger = VersionLedger::new("team");
        let before = ledger.updated_at();
        let modified = Utc::now() - Duration::hours(1);

        ledger.add_file("a.mdc", modified, "sha256:aa");

        let entry = ledger.get_file("a.mdc").unwrap();
        assert_eq!(entry.last_modified, modified);
        assert_eq!(entry.digest, "sha256:aa");
        assert!(entry.last_synced >= modified);
        assert!(ledger.updated_at() >= before);
    }

    #[test]
    fn update_file_absent_is_silent_noop() {
        let mut ledger = VersionLedger::new("team");
        let before = ledger.clone();

        ledger.update_file("missing.mdc", Utc::now(), "sha256:bb");

        assert_eq!(ledger, before);
    }

    #[test]
    fn update_file_mutates_existing_entry() {
        let mut ledger = VersionLedger::new("team");
        let t0 = Utc::now() - Duration::days(1);
        ledger.add_file("a.mdc", t0, "sha256:old");

        let t1 = Utc::now();
        ledger.update_file("a.mdc", t1, "sha256:new");

        let entry = ledger.get_file("a.mdc").unwrap();
        assert_eq!(entry.digest, "sha256:new");
        assert_eq!(entry.last_modified, t1);
    }

    #[test]
    fn record_file_adds_or_updates() {
        let mut ledger = VersionLedger::new("team");
        ledger.record_file("a.mdc", Utc::now(), "sha256:1");
        ledger.record_file("a.mdc", Utc::now(), "sha256:2");

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get_file("a.mdc").unwrap().digest, "sha256:2");
    }

    #[test]
    fn updated_at_is_monotonic() {
        let mut ledger = VersionLedger::new("team");
        let mut last = ledger.updated_at();
        for i in 0..20 {
            ledger.record_file(&format!("{i}.mdc"), Utc::now(), "sha256:x");
            assert!(ledger.updated_at() >= last);
            last = ledger.updated_at();
        }
    }

    #[test]
    fn ledger_json_round_trip() {
        let mut ledger = VersionLedger::new("team");
        ledger.add_file("lang/rust.mdc", Utc::now(), "sha256:cc");

        let back = VersionLedger::from_json(&ledger.to_json().unwrap()).unwrap();

        assert_eq!(back, ledger);
    }
}
