//! Layered settings resolution

use std::path::{Path, PathBuf};

use rules_fs::{ConfigStore, NormalizedPath, RulesPath};
use serde::{Deserialize, Serialize};

use crate::remote::DEFAULT_API_URL;
use crate::sync::Strictness;
use crate::{Error, Result};

/// Which blob store backs the remote side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Private GitHub gists
    #[default]
    Gist,
    /// JSON files in a local directory
    Dir,
}

/// `[remote]` section of `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub backend: Backend,
    /// Base URL of the GitHub REST API
    pub api_url: String,
    /// Root directory for the `dir` backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            backend: Backend::Gist,
            api_url: DEFAULT_API_URL.to_string(),
            store_dir: None,
        }
    }
}

/// Effective settings after merging defaults, `config.toml` and environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rules directory; relative paths resolve against the working directory.
    /// Defaults to `.cursor/rules`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_dir: Option<PathBuf>,
    /// How a not-yet-tracked local file at a remote path is treated
    pub strictness: Strictness,
    pub remote: RemoteSettings,
}

/// Environment-variable layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// `CURSORRULES_STORE_DIR`: selects the directory backend at this path
    pub store_dir: Option<PathBuf>,
    /// `CURSORRULES_API_URL`
    pub api_url: Option<String>,
    /// `CURSORRULES_RULES_DIR`
    pub rules_dir: Option<PathBuf>,
}

impl EnvOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            store_dir: var("CURSORRULES_STORE_DIR").map(PathBuf::from),
            api_url: var("CURSORRULES_API_URL"),
            rules_dir: var("CURSORRULES_RULES_DIR").map(PathBuf::from),
        }
    }
}

impl Settings {
    /// Path of `config.toml` inside `config_root`
    pub fn path(config_root: &Path) -> NormalizedPath {
        NormalizedPath::new(config_root.join(RulesPath::SettingsFile.as_str()))
    }

    /// Load `config.toml`, falling back to defaults when it is missing.
    ///
    /// # Errors
    ///
    /// Returns a `Format` error when the file exists but is not valid.
    pub fn load(config_root: &Path) -> Result<Self> {
        let path = Self::path(config_root);
        match ConfigStore::new().load_optional::<Self>(&path) {
            Ok(Some(settings)) => {
                tracing::debug!(%path, "Loaded settings");
                Ok(settings)
            }
            Ok(None) => {
                tracing::debug!(%path, "No settings file, using defaults");
                Ok(Self::default())
            }
            Err(rules_fs::Error::ConfigParse { message, .. }) => {
                Err(Error::format(path.as_str(), message))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve all layers: defaults, `config.toml`, then the environment
    pub fn resolve(config_root: &Path, env: &EnvOverrides) -> Result<Self> {
        let mut settings = Self::load(config_root)?;
        settings.apply_env(env);
        Ok(settings)
    }

    /// Apply environment overrides on top of the loaded settings
    pub fn apply_env(&mut self, env: &EnvOverrides) {
        if let Some(dir) = &env.store_dir {
            self.remote.backend = Backend::Dir;
            self.remote.store_dir = Some(dir.clone());
        }
        if let Some(url) = &env.api_url {
            self.remote.api_url = url.clone();
        }
        if let Some(dir) = &env.rules_dir {
            self.rules_dir = Some(dir.clone());
        }
    }

    /// Persist the settings to `config.toml`
    pub fn save(&self, config_root: &Path) -> Result<()> {
        ConfigStore::new().save(&Self::path(config_root), self)?;
        Ok(())
    }

    /// Resolve the rules directory against `cwd`
    pub fn rules_dir(&self, cwd: &Path) -> NormalizedPath {
        let dir = self
            .rules_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(RulesPath::RulesDir.as_str()));
        NormalizedPath::new(cwd.join(dir))
    }
}
