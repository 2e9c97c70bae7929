//! Remote access token storage

use std::path::Path;

use rules_fs::{ConfigStore, NormalizedPath, RulesPath};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable taking precedence over the stored token
pub const TOKEN_ENV: &str = "CURSORRULES_TOKEN";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    github_token: Option<String>,
}

/// Reads and writes the access token in `credentials.json`
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: NormalizedPath,
    use_env: bool,
}

impl CredentialStore {
    /// Credential store inside the configuration directory
    pub fn new(config_root: &Path) -> Self {
        Self::at(config_root.join(RulesPath::CredentialsFile.as_str()))
    }

    /// Credential store at an explicit file path
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: NormalizedPath::new(path),
            use_env: true,
        }
    }

    /// Ignore `CURSORRULES_TOKEN`, reading only the stored file
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// Resolve the access token.
    ///
    /// `CURSORRULES_TOKEN` wins over the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingToken`] when neither source holds a non-blank
    /// token, or a `Format` error when the credentials file is corrupt.
    pub fn get_token(&self) -> Result<String> {
        if self.use_env
            && let Ok(token) = std::env::var(TOKEN_ENV)
            && !token.trim().is_empty()
        {
            tracing::debug!("Using access token from {}", TOKEN_ENV);
            return Ok(token.trim().to_string());
        }

        self.stored_token()?.ok_or(Error::MissingToken)
    }

    /// The token in `credentials.json`, if any
    pub fn stored_token(&self) -> Result<Option<String>> {
        let credentials = match ConfigStore::new().load_optional::<Credentials>(&self.path) {
            Ok(credentials) => credentials.unwrap_or_default(),
            Err(rules_fs::Error::ConfigParse { message, .. }) => {
                return Err(Error::format(self.path.as_str(), message));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(credentials
            .github_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    /// Store a token, readable only by the current user.
    ///
    /// # Errors
    ///
    /// Rejects blank tokens with a `Format` error.
    pub fn save_token(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::format(self.path.as_str(), "access token must not be empty"));
        }

        let credentials = Credentials {
            github_token: Some(token.to_string()),
        };
        ConfigStore::new().save_private(&self.path, &credentials)?;

        tracing::info!(path = %self.path, "Saved access token");
        Ok(())
    }
}
