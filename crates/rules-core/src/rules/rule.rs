//! A single tracked rule file

use rules_fs::compute_content_checksum;
use serde::{Deserialize, Serialize};

/// One rule file
///
/// `path` is the file's location relative to the rules directory, using
/// forward slashes. It is the unique key inside a [`RuleCollection`]. The
/// content is authoritative byte for byte.
///
/// [`RuleCollection`]: super::RuleCollection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Display name, normally the file name
    pub name: String,
    /// Relative path inside the rules directory
    pub path: String,
    /// Full file content
    pub content: String,
}

impl Rule {
    pub fn new(name: impl Into<String>, content: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: content.into(),
        }
    }

    /// Content fingerprint in the canonical `sha256:<hex>` form
    pub fn digest(&self) -> String {
        compute_content_checksum(&self.content)
    }

    /// Whether the file has zero-length content
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
