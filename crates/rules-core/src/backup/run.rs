//! Backup run implementation
//!
//! Handles moving files aside before an overwrite, listing runs and restoring
//! a run's files.

use std::fs;

use chrono::{DateTime, Utc};
use rules_fs::{ConfigStore, NormalizedPath, RulesPath, io, validate_relative_path};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Metadata persisted into each backup run directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// Run identifier (also the directory name)
    pub run_id: String,
    /// When the run started
    pub created: DateTime<Utc>,
    /// Relative paths of the files moved into this run
    pub files: Vec<String>,
}

/// Information about a stored backup run
#[derive(Debug, Clone)]
pub struct BackupRecord {
    /// Path to the run directory
    pub path: NormalizedPath,
    pub metadata: BackupMetadata,
}

/// Manages backup runs for one rules directory
#[derive(Debug, Clone)]
pub struct BackupManager {
    /// The rules directory files are backed up from and restored into
    rules_dir: NormalizedPath,
    /// `<rules_dir>/.backups`
    backups_dir: NormalizedPath,
}

impl BackupManager {
    pub fn new(rules_dir: NormalizedPath) -> Self {
        let backups_dir = rules_dir.join(RulesPath::BackupDir.as_str());
        Self {
            rules_dir,
            backups_dir,
        }
    }

    pub fn backups_dir(&self) -> &NormalizedPath {
        &self.backups_dir
    }

    fn run_dir(&self, run_id: &str) -> NormalizedPath {
        self.backups_dir.join(run_id)
    }

    fn metadata_path(&self, run_id: &str) -> NormalizedPath {
        self.run_dir(run_id).join(RulesPath::BackupMetadata.as_str())
    }

    /// Reject run ids that are not a single plain path component
    fn validate_run_id(run_id: &str) -> Result<()> {
        match validate_relative_path(run_id) {
            Ok(id) if !id.contains('/') => Ok(()),
            _ => Err(Error::Backup {
                message: format!("Invalid backup run id: {}", run_id),
            }),
        }
    }

    /// Start a new backup run with a unique identifier.
    ///
    /// Nothing is created on disk until the first file is backed up.
    pub fn begin_run(&self) -> BackupRun {
        let created = Utc::now();
        let base = created.format("%Y%m%dT%H%M%S%.3fZ").to_string();
        let mut run_id = base.clone();
        let mut counter = 1;
        while self.run_dir(&run_id).exists() {
            run_id = format!("{}-{}", base, counter);
            counter += 1;
        }

        BackupRun {
            dir: self.run_dir(&run_id),
            rules_dir: self.rules_dir.clone(),
            metadata: BackupMetadata {
                run_id,
                created,
                files: Vec::new(),
            },
        }
    }

    /// Get a backup run by id
    pub fn get_backup(&self, run_id: &str) -> Result<Option<BackupRecord>> {
        Self::validate_run_id(run_id)?;
        let metadata: Option<BackupMetadata> =
            ConfigStore::new().load_optional(&self.metadata_path(run_id))?;

        Ok(metadata.map(|metadata| BackupRecord {
            path: self.run_dir(run_id),
            metadata,
        }))
    }

    /// List all backup runs, oldest first
    pub fn list_backups(&self) -> Result<Vec<BackupRecord>> {
        if !self.backups_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(self.backups_dir.to_native())? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir()
                && let Some(run_id) = path.file_name().and_then(|n| n.to_str())
                && let Ok(Some(backup)) = self.get_backup(run_id)
            {
                backups.push(backup);
            }
        }

        backups.sort_by(|a, b| a.metadata.run_id.cmp(&b.metadata.run_id));
        Ok(backups)
    }

    /// Copy a run's files back into the rules directory.
    ///
    /// The backup itself is left in place.
    ///
    /// # Returns
    /// Relative paths of the restored files
    pub fn restore_backup(&self, run_id: &str) -> Result<Vec<String>> {
        let backup = self.get_backup(run_id)?.ok_or_else(|| Error::Backup {
            message: format!("No backup found with id: {}", run_id),
        })?;

        let mut restored = Vec::new();
        for file in &backup.metadata.files {
            let relative = validate_relative_path(file).map_err(|e| Error::Backup {
                message: format!("Refusing to restore {}: {}", file, e),
            })?;

            let source = backup.path.join(&relative);
            let dest = self.rules_dir.join(&relative);

            if !source.is_file() {
                tracing::warn!(%source, "Backup file missing, skipping");
                continue;
            }

            if let Some(parent) = dest.to_native().parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(source.to_native(), dest.to_native())?;
            tracing::info!(%dest, run_id, "Restored file from backup");
            restored.push(relative);
        }

        Ok(restored)
    }
}

/// One backup run in progress
#[derive(Debug)]
pub struct BackupRun {
    dir: NormalizedPath,
    rules_dir: NormalizedPath,
    metadata: BackupMetadata,
}

impl BackupRun {
    pub fn id(&self) -> &str {
        &self.metadata.run_id
    }

    pub fn dir(&self) -> &NormalizedPath {
        &self.dir
    }

    /// Relative paths moved so far
    pub fn moved(&self) -> &[String] {
        &self.metadata.files
    }

    /// Move the file at `relative` (inside the rules directory) into this
    /// run's directory.
    ///
    /// Returns the backup location, or `None` when there was no file to back
    /// up (including when its parent directory does not exist). Metadata is
    /// rewritten after every move so the run stays discoverable even if the
    /// sync fails part-way.
    pub fn backup_file(&mut self, relative: &str) -> Result<Option<NormalizedPath>> {
        let source = self.rules_dir.join(relative);
        if !source.is_file() {
            return Ok(None);
        }

        let dest = self.dir.join(relative);
        io::move_file(&source, &dest)?;
        tracing::info!(%source, %dest, "Backed up existing file");

        self.metadata.files.push(relative.to_string());
        ConfigStore::new().save(
            &self.dir.join(RulesPath::BackupMetadata.as_str()),
            &self.metadata,
        )?;

        Ok(Some(dest))
    }

    /// Finish the run, returning its record if anything was backed up
    pub fn finish(self) -> Option<BackupRecord> {
        if self.metadata.files.is_empty() {
            return None;
        }
        Some(BackupRecord {
            path: self.dir,
            metadata: self.metadata,
        })
    }
}
