//! Per-file version entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version metadata recorded for one synchronized file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVersion {
    /// Local modification time of the file when it was last recorded
    pub last_modified: DateTime<Utc>,
    /// When the file was last written or uploaded by a sync
    pub last_synced: DateTime<Utc>,
    /// Content fingerprint (`sha256:<hex>`)
    pub digest: String,
}

impl FileVersion {
    pub fn new(last_modified: DateTime<Utc>, digest: impl Into<String>) -> Self {
        Self {
            last_modified,
            last_synced: Utc::now(),
            digest: digest.into(),
        }
    }
}
