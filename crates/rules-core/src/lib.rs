//! Core orchestration layer for rules-sync
//!
//! This crate sits between the filesystem primitives in `rules-fs` and the
//! `cursorrules` CLI, implementing:
//!
//! - **Rules model**: named collections of rule files keyed by relative path
//! - **Version ledger**: per-directory record of synchronized digests and
//!   modification times
//! - **SyncEngine**: classification of remote collections and conflict
//!   handling under the abort, force and merge policies
//! - **Backups**: per-run backups of overwritten files, with restore
//! - **Remote stores**: the [`BlobStore`] trait, the blob-set transport
//!   encoding and the gist, directory and in-memory stores
//! - **Configuration**: layered settings and credential storage
//!
//! # Architecture
//!
//! ```text
//!                  cursorrules CLI
//!                        |
//!                   rules-core
//!            +-------+---+---+--------+
//!            |       |       |        |
//!          sync   ledger   remote   config
//!            |       |       |        |
//!            +-------+---+---+--------+
//!                        |
//!                    rules-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use rules_core::{MemoryBlobStore, SyncEngine, SyncOptions, decode};
//!
//! let blob = store.get(&summary.id)?;
//! let remote = decode(&blob, &summary.name)?;
//! let engine = SyncEngine::new(rules_dir, SyncOptions::default());
//! let outcome = engine.pull(&remote)?;
//! ```

pub mod backup;
pub mod config;
pub mod error;
pub mod ledger;
pub mod remote;
pub mod rules;
pub mod sync;

pub use backup::{BackupManager, BackupMetadata, BackupRecord, BackupRun};
pub use config::{Backend, CredentialStore, EnvOverrides, RemoteSettings, Settings, config_root};
pub use error::{Error, ErrorKind, Result};
pub use ledger::{FileVersion, VersionLedger};
pub use remote::{
    BlobSet, BlobSetSummary, BlobStore, DirBlobStore, GistStore, MemoryBlobStore, PushOutcome,
    RemoteCollection, decode, encode, fetch_template, open_store, push_template,
};
pub use rules::{Rule, RuleCollection};
pub use sync::{
    DiffStats, FileClassification, FileDiff, FileStatus, LocalFile, LocalSnapshot, Policy,
    Strictness, SyncEngine, SyncOptions, SyncOutcome, SyncPlan, SyncReport, classify,
};
