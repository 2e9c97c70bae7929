//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Rule keys, ledger keys and blob names are all stored in this form so that a
/// collection pushed from Windows matches the same collection pulled on Unix.
/// Conversion to a platform-native path happens only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let normalized = path_str.replace('\\', "/");
        Self { inner: normalized }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        if self.inner.is_empty() {
            return Self {
                inner: segment_normalized,
            };
        }
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self { inner: joined }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Express this path relative to `base`.
    ///
    /// Returns `None` when this path does not live under `base`.
    pub fn strip_prefix(&self, base: &NormalizedPath) -> Option<String> {
        let base = base.inner.trim_end_matches('/');
        let rest = self.inner.strip_prefix(base)?;
        let rest = rest.strip_prefix('/')?;
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }
}

/// Validate a relative path received from outside (remote keys, backup
/// metadata) before it is joined onto a local directory.
///
/// Accepts forward- or back-slash separated paths. Rejects empty paths,
/// absolute paths, drive prefixes and any `.` or `..` component, so that the
/// joined result always stays inside the base directory.
pub fn validate_relative_path(path: &str) -> Result<String> {
    let invalid = |reason: &str| Error::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let normalized = path.replace('\\', "/");
    if normalized.is_empty() {
        return Err(invalid("path is empty"));
    }
    if normalized.starts_with('/') {
        return Err(invalid("path is absolute"));
    }
    if normalized.len() >= 2 && normalized.as_bytes()[1] == b':' {
        return Err(invalid("path has a drive prefix"));
    }
    for component in normalized.split('/') {
        match component {
            "" => return Err(invalid("path contains an empty component")),
            "." | ".." => return Err(invalid("path contains a relative component")),
            _ => {}
        }
    }

    Ok(normalized)
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_prefix_yields_relative_key() {
        let base = NormalizedPath::new("/home/u/.cursor/rules");
        let file = base.join("lang/rust.mdc");
        assert_eq!(file.strip_prefix(&base).as_deref(), Some("lang/rust.mdc"));
    }

    #[test]
    fn strip_prefix_rejects_sibling() {
        let base = NormalizedPath::new("/a/rules");
        let other = NormalizedPath::new("/a/rules-other/x.mdc");
        assert_eq!(other.strip_prefix(&base), None);
        assert_eq!(base.strip_prefix(&base), None);
    }

    #[test]
    fn validate_accepts_nested_and_backslashes() {
        assert_eq!(validate_relative_path("a/b.mdc").unwrap(), "a/b.mdc");
        assert_eq!(validate_relative_path("a\\b.mdc").unwrap(), "a/b.mdc");
    }

    #[test]
    fn validate_rejects_escapes() {
        for bad in ["", "/etc/passwd", "../x", "a/../../x", "a//b", "./a", "C:/x"] {
            assert!(validate_relative_path(bad).is_err(), "accepted {bad:?}");
        }
    }
}
