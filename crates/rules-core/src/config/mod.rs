//! Settings and credentials
//!
//! Per-user configuration lives in `~/.cursorrules/` (overridable through
//! `CURSORRULES_HOME`):
//!
//! - `config.toml`: [`Settings`] (rules directory, conflict strictness,
//!   remote backend)
//! - `credentials.json`: the remote access token ([`CredentialStore`])
//!
//! Settings are resolved in layers, later layers overriding earlier ones:
//! built-in defaults, then `config.toml`, then environment variables. CLI
//! flags are applied on top by the caller.

mod credentials;
mod settings;

pub use credentials::CredentialStore;
pub use settings::{Backend, EnvOverrides, RemoteSettings, Settings};

use std::path::PathBuf;

use rules_fs::RulesPath;

use crate::{Error, Result};

/// Environment variable overriding the configuration directory
pub const HOME_ENV: &str = "CURSORRULES_HOME";

/// Resolve the per-user configuration directory.
///
/// Uses `CURSORRULES_HOME` when set, otherwise `~/.cursorrules`.
pub fn config_root() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(RulesPath::ConfigDir.as_str()))
        .ok_or_else(|| Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "could not determine the home directory",
        )))
}
