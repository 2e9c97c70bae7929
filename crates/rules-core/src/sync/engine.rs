//! SyncEngine implementation
//!
//! The SyncEngine reconciles a downloaded collection with the rules
//! directory, using the version ledger as the baseline. It never persists the
//! ledger on its own inside [`SyncEngine::apply`]: the ledger goes in by value
//! and the updated copy comes back in the [`SyncOutcome`].

use std::fs;

use chrono::{DateTime, Utc};
use rules_fs::{NormalizedPath, RulesPath, compute_file_checksum, io};

use crate::backup::{BackupManager, BackupRecord};
use crate::ledger::VersionLedger;
use crate::remote::RemoteCollection;
use crate::rules::Rule;
use crate::{Error, Result};

use super::check::{FileClassification, FileStatus, Strictness, SyncPlan, classify, is_conflict};
use super::diff::FileDiff;
use super::local::LocalSnapshot;

/// What to do with a non-empty conflict set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// Report the conflicts and write nothing
    #[default]
    Abort,
    /// Overwrite every file, backing up existing ones
    Force,
    /// Same writes as [`Policy::Force`], after producing a whole-file diff
    /// for each conflicting path. Content is not reconciled.
    Merge,
}

/// Options for a sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub policy: Policy,
    pub strictness: Strictness,
}

/// What a sync run did
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Classification the run acted on
    pub plan: SyncPlan,
    /// Paths written to disk
    pub written: Vec<String>,
    /// Paths left untouched
    pub skipped: Vec<String>,
    /// Untracked local files already holding the remote content, recorded in
    /// the ledger without rewriting
    pub adopted: Vec<String>,
    /// Backup run holding the files that were overwritten
    pub backup: Option<BackupRecord>,
    /// Diffs of conflicting paths (merge only)
    pub diffs: Vec<FileDiff>,
}

impl SyncReport {
    /// Whether the run changed nothing on disk
    pub fn is_noop(&self) -> bool {
        self.written.is_empty() && self.adopted.is_empty()
    }
}

/// Result of applying a remote collection
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// The ledger with every written file recorded
    pub ledger: VersionLedger,
    pub report: SyncReport,
}

/// Engine for synchronizing one rules directory
///
/// - **plan**: classify a remote collection against the ledger
/// - **apply**: write files according to the policy, returning the new ledger
/// - **pull**: load, apply and persist in one step
/// - **record_push**: record an uploaded snapshot in the ledger
#[derive(Debug, Clone)]
pub struct SyncEngine {
    rules_dir: NormalizedPath,
    options: SyncOptions,
    backups: BackupManager,
}

impl SyncEngine {
    pub fn new(rules_dir: NormalizedPath, options: SyncOptions) -> Self {
        let backups = BackupManager::new(rules_dir.clone());
        Self {
            rules_dir,
            options,
            backups,
        }
    }

    pub fn rules_dir(&self) -> &NormalizedPath {
        &self.rules_dir
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Get the path to the ledger sidecar
    pub fn ledger_path(&self) -> NormalizedPath {
        self.rules_dir.join(RulesPath::LedgerFile.as_str())
    }

    /// Load the ledger from disk, or create an empty one if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns a `Format` error if the ledger file exists but cannot be parsed.
    pub fn load_ledger(&self, template_name: &str) -> Result<VersionLedger> {
        VersionLedger::load(&self.ledger_path(), template_name)
    }

    /// Save the ledger to disk
    pub fn save_ledger(&self, ledger: &VersionLedger) -> Result<()> {
        ledger.save(&self.ledger_path())
    }

    /// Classify every file of `remote` against `ledger` and the disk
    pub fn plan(&self, remote: &RemoteCollection, ledger: &VersionLedger) -> Result<SyncPlan> {
        let mut files = Vec::with_capacity(remote.collection.len());

        for rule in remote.collection.iter() {
            let remote_digest = rule.digest();
            let status = classify(
                &remote_digest,
                remote.modified(&rule.path),
                ledger.get_file(&rule.path),
            );

            let target = self.rules_dir.join(&rule.path);
            let occupied = target.exists();
            let local_digest = if target.is_file() {
                Some(compute_file_checksum(&target.to_native())?)
            } else {
                None
            };
            let matches_disk = local_digest.as_deref() == Some(remote_digest.as_str());
            let conflict = is_conflict(status, occupied, matches_disk, self.options.strictness);

            tracing::debug!(path = %rule.path, %status, occupied, conflict, "Classified remote file");
            files.push(FileClassification {
                path: rule.path.clone(),
                status,
                occupied,
                conflict,
                remote_digest,
                local_digest,
            });
        }

        Ok(SyncPlan::new(files))
    }

    /// Apply `remote` to the rules directory under the configured policy.
    ///
    /// Takes the ledger by value and returns it updated with every written
    /// file. The caller persists it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] with the sorted conflicting paths when the
    /// policy is [`Policy::Abort`] and the conflict set is non-empty; nothing
    /// is written in that case. I/O failures part-way leave already written
    /// files in place.
    pub fn apply(&self, remote: &RemoteCollection, mut ledger: VersionLedger) -> Result<SyncOutcome> {
        let plan = self.plan(remote, &ledger)?;

        if self.options.policy == Policy::Abort && plan.has_conflicts() {
            let paths = plan.conflicts();
            tracing::warn!(count = paths.len(), "Conflicts detected, aborting without writes");
            return Err(Error::Conflict { paths });
        }

        let mut report = SyncReport::default();

        if self.options.policy == Policy::Merge {
            for file in plan.files().iter().filter(|file| file.conflict) {
                if let Some(rule) = remote.collection.get_file(&file.path) {
                    let local = self.read_local(&file.path)?;
                    report.diffs.push(FileDiff::whole_file(&file.path, &local, &rule.content));
                }
            }
        }

        if ledger.template_name() != remote.collection.name() {
            ledger.set_template_name(remote.collection.name());
        }

        let mut run = self.backups.begin_run();
        for file in plan.files() {
            let Some(rule) = remote.collection.get_file(&file.path) else {
                continue;
            };

            match self.options.policy {
                Policy::Force | Policy::Merge => {}
                Policy::Abort => match file.status {
                    FileStatus::New if file.occupied && file.matches_disk() => {
                        let modified = self.modified_time(&file.path)?;
                        let recorded = synced_time(modified, remote.modified(&file.path));
                        ledger.record_file(&file.path, recorded, rule.digest());
                        tracing::debug!(path = %file.path, "Adopted identical local file");
                        report.adopted.push(file.path.clone());
                        continue;
                    }
                    FileStatus::Unchanged if file.occupied => {
                        report.skipped.push(file.path.clone());
                        continue;
                    }
                    _ => {}
                },
            }

            if file.occupied {
                run.backup_file(&file.path)?;
            }
            let modified = self.write_rule(rule)?;
            let recorded = synced_time(modified, remote.modified(&file.path));
            ledger.record_file(&file.path, recorded, rule.digest());
            report.written.push(file.path.clone());
        }

        report.backup = run.finish();
        report.plan = plan;

        tracing::info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            backed_up = report.backup.as_ref().map_or(0, |b| b.metadata.files.len()),
            "Sync applied"
        );
        Ok(SyncOutcome { ledger, report })
    }

    /// Load the ledger, apply `remote` and persist the result once.
    pub fn pull(&self, remote: &RemoteCollection) -> Result<SyncOutcome> {
        fs::create_dir_all(self.rules_dir.to_native())
            .map_err(|e| rules_fs::Error::io(self.rules_dir.to_native(), e))?;

        let ledger = self.load_ledger(remote.collection.name())?;
        let outcome = self.apply(remote, ledger)?;
        self.save_ledger(&outcome.ledger)?;
        Ok(outcome)
    }

    /// Classify `remote` against the persisted ledger without writing
    pub fn status(&self, remote: &RemoteCollection) -> Result<SyncPlan> {
        let ledger = self.load_ledger(remote.collection.name())?;
        self.plan(remote, &ledger)
    }

    /// Record an uploaded snapshot so pulling the same content back is
    /// `Unchanged`. Persists and returns the ledger.
    pub fn record_push(&self, snapshot: &LocalSnapshot) -> Result<VersionLedger> {
        let name = snapshot.collection.name();
        let mut ledger = self.load_ledger(name)?;
        if ledger.template_name() != name {
            ledger.set_template_name(name);
        }
        for (path, file) in &snapshot.files {
            ledger.record_file(path, file.modified, file.digest.clone());
        }
        self.save_ledger(&ledger)?;
        Ok(ledger)
    }

    fn read_local(&self, relative: &str) -> Result<String> {
        let path = self.rules_dir.join(relative);
        if !path.is_file() {
            return Ok(String::new());
        }
        let bytes = io::read_bytes(&path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write one rule and return the file's resulting modification time
    fn write_rule(&self, rule: &Rule) -> Result<DateTime<Utc>> {
        let path = self.rules_dir.join(&rule.path);
        io::write_text(&path, &rule.content)?;
        tracing::info!(%path, "Wrote rule file");
        self.modified_time(&rule.path)
    }

    fn modified_time(&self, relative: &str) -> Result<DateTime<Utc>> {
        let path = self.rules_dir.join(relative).to_native();
        let modified = fs::metadata(&path)
            .and_then(|metadata| metadata.modified())
            .map_err(|e| rules_fs::Error::io(&path, e))?;
        Ok(modified.into())
    }
}

/// Modification time recorded for a synced file.
///
/// Never earlier than the remote's own time, so a remote clock running ahead
/// of ours does not make the same content look newer on the next pull.
fn synced_time(written: DateTime<Utc>, remote: Option<DateTime<Utc>>) -> DateTime<Utc> {
    remote.map_or(written, |remote| remote.max(written))
}
