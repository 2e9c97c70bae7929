//! Filesystem primitives for rules-sync
//!
//! Provides normalized path handling, content checksums, atomic I/O and a
//! format-agnostic config store used by the higher layers.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{compute_checksum, compute_content_checksum, compute_file_checksum};
pub use config::ConfigStore;
pub use constants::RulesPath;
pub use error::{Error, Result};
pub use path::{NormalizedPath, validate_relative_path};
