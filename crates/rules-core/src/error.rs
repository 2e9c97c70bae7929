//! Error types for rules-core

use std::path::PathBuf;

/// Result type for rules-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rules-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote store is unreachable, rejected the request, or lacks the
    /// named collection
    #[error("Remote error: {message}")]
    Remote { message: String },

    /// No credential is configured for the remote store
    #[error("No access token configured. Run 'cursorrules auth' to set one")]
    MissingToken,

    /// The named collection does not exist remotely
    #[error("Template '{name}' not found")]
    TemplateNotFound { name: String },

    /// The conflict set was non-empty under the abort policy
    #[error("Conflicts detected in {} file(s): {}", paths.len(), paths.join(", "))]
    Conflict { paths: Vec<String> },

    /// A persisted or transported record failed to parse
    #[error("Invalid record at {location}: {message}")]
    Format { location: String, message: String },

    /// A backup run could not be found or restored
    #[error("Backup error: {message}")]
    Backup { message: String },

    /// The rules directory does not exist
    #[error("Rules directory not found at {path}")]
    RulesDirNotFound { path: PathBuf },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from rules-fs
    #[error(transparent)]
    Fs(#[from] rules_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    /// HTTP transport error talking to the remote store
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    pub fn format(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Coarse category used by the CLI when reporting failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Remote { .. } | Self::MissingToken | Self::TemplateNotFound { .. } | Self::Http(_) => {
                ErrorKind::Remote
            }
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Format { .. } | Self::Json(_) | Self::TomlDe(_) | Self::TomlSer(_) => ErrorKind::Format,
            Self::Fs(rules_fs::Error::ConfigParse { .. })
            | Self::Fs(rules_fs::Error::ConfigSerialize { .. })
            | Self::Fs(rules_fs::Error::InvalidPath { .. }) => ErrorKind::Format,
            Self::Fs(_) | Self::Io(_) | Self::Backup { .. } | Self::RulesDirNotFound { .. } => ErrorKind::Io,
        }
    }
}

/// The four failure categories surfaced to the invoking command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Remote,
    Conflict,
    Format,
}
