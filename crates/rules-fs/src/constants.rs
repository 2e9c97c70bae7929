//! Constants and enums for well-known rules-sync paths.

use std::path::Path;

/// Well-known file and directory names used by rules-sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesPath {
    /// The rules directory, relative to the project root
    RulesDir,
    /// The version ledger sidecar inside the rules directory
    LedgerFile,
    /// The backup root inside the rules directory
    BackupDir,
    /// Metadata file written into every backup run directory
    BackupMetadata,
    /// The per-user configuration directory, relative to the home directory
    ConfigDir,
    /// Settings file inside the configuration directory
    SettingsFile,
    /// Credential record inside the configuration directory
    CredentialsFile,
}

impl RulesPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RulesDir => ".cursor/rules",
            Self::LedgerFile => "version.json",
            Self::BackupDir => ".backups",
            Self::BackupMetadata => "metadata.toml",
            Self::ConfigDir => ".cursorrules",
            Self::SettingsFile => "config.toml",
            Self::CredentialsFile => "credentials.json",
        }
    }

    /// Whether a relative path inside the rules directory is owned by the
    /// tool itself (ledger or backups) rather than being a rule.
    pub fn is_reserved(relative: &str) -> bool {
        relative == Self::LedgerFile.as_str()
            || relative == Self::BackupDir.as_str()
            || relative.starts_with(&format!("{}/", Self::BackupDir.as_str()))
    }
}

impl AsRef<Path> for RulesPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for RulesPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for RulesPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_paths() {
        assert!(RulesPath::is_reserved("version.json"));
        assert!(RulesPath::is_reserved(".backups"));
        assert!(RulesPath::is_reserved(".backups/20260101T000000Z/a.mdc"));
        assert!(!RulesPath::is_reserved("nested/version.json"));
        assert!(!RulesPath::is_reserved(".backupsfoo/a.mdc"));
        assert!(!RulesPath::is_reserved("a.mdc"));
    }
}
