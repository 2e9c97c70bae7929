//! SyncEngine for reconciling remote collections with the rules directory
//!
//! This module provides:
//! - **check**: classify remote files against the version ledger
//! - **engine**: apply a collection under a conflict policy
//! - **diff**: whole-file diffs for the merge policy
//! - **local**: snapshot of the rule files on disk for uploads

mod check;
mod diff;
mod engine;
mod local;

pub use check::{FileClassification, FileStatus, Strictness, SyncPlan, classify};
pub use diff::{DiffStats, FileDiff};
pub use engine::{Policy, SyncEngine, SyncOptions, SyncOutcome, SyncReport};
pub use local::{LocalFile, LocalSnapshot};
