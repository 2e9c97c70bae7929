//! Backup and restore of overwritten rule files
//!
//! Before the sync engine overwrites a file it moves the existing copy into
//! `<rules_dir>/.backups/<run-id>/<relative_path>`. Each run gets its own
//! directory, so backups never collide, and a `metadata.toml` listing the
//! moved files. Successful syncs never delete backups; restoring is a manual
//! step (`cursorrules restore <run-id>`).

mod run;

pub use run::{BackupManager, BackupMetadata, BackupRecord, BackupRun};
