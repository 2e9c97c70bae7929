//! Remote blob storage
//!
//! Templates are stored remotely as opaque blob sets: a description plus a
//! flat map of file names to string content. The [`BlobStore`] trait is the
//! only interface the rest of the crate uses. Implementations:
//!
//! - [`GistStore`]: private GitHub gists
//! - [`DirBlobStore`]: one JSON file per blob set in a local directory
//! - [`MemoryBlobStore`]: in-process store for tests
//!
//! Blob sets belonging to this tool are tagged by a fixed description prefix
//! followed by the template name.

mod dir;
mod gist;
mod memory;
mod template;
mod transport;

pub use dir::DirBlobStore;
pub use gist::{DEFAULT_API_URL, GistStore};
pub use memory::MemoryBlobStore;
pub use template::{PushOutcome, fetch_template, push_template};
pub use transport::{EMPTY_PLACEHOLDER, MANIFEST_FILE, RemoteCollection, decode, encode};

use std::collections::BTreeMap;

use crate::Result;
use crate::config::{Backend, CredentialStore, Settings};

/// Description prefix marking blob sets owned by this tool
pub const DESCRIPTION_TAG: &str = "[cursorrules] ";

/// Build the blob-set description for a template name.
///
/// Surrounding whitespace is dropped, matching [`template_name`].
pub fn describe(name: &str) -> String {
    format!("{}{}", DESCRIPTION_TAG, name.trim())
}

/// Extract the template name from a blob-set description.
///
/// Returns `None` for blob sets not created by this tool.
pub fn template_name(description: &str) -> Option<&str> {
    description
        .strip_prefix(DESCRIPTION_TAG)
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// A blob set listed by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobSetSummary {
    pub id: String,
    pub name: String,
}

/// A fetched blob set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobSet {
    pub description: String,
    pub files: BTreeMap<String, String>,
}

/// Remote key/value blob storage
///
/// Stores reject empty file content; callers substitute a placeholder (see
/// [`encode`]).
pub trait BlobStore {
    /// List every blob set tagged as belonging to this tool
    fn list(&self) -> Result<Vec<BlobSetSummary>>;

    /// Create a new blob set, returning its id
    fn create(&self, name: &str, files: &BTreeMap<String, String>) -> Result<String>;

    /// Fetch a blob set by id
    fn get(&self, id: &str) -> Result<BlobSet>;

    /// Delete a blob set by id
    fn delete(&self, id: &str) -> Result<()>;

    /// Replace the content of an existing blob set, returning the id of the
    /// resulting set.
    ///
    /// The default deletes then recreates, which is not atomic: a failure
    /// between the two calls leaves the template absent. Stores with an
    /// atomic update primitive override this.
    fn replace(&self, id: &str, name: &str, files: &BTreeMap<String, String>) -> Result<String> {
        self.delete(id)?;
        self.create(name, files)
    }

    /// Find a blob set by template name, ignoring surrounding whitespace
    fn find(&self, name: &str) -> Result<Option<BlobSetSummary>> {
        let name = name.trim();
        Ok(self.list()?.into_iter().find(|summary| summary.name == name))
    }
}

/// Open the blob store selected by the settings.
///
/// The directory backend needs no credential; the gist backend requires a
/// token.
pub fn open_store(settings: &Settings, credentials: &CredentialStore) -> Result<Box<dyn BlobStore>> {
    match settings.remote.backend {
        Backend::Dir => {
            let dir = settings.remote.store_dir.clone().ok_or_else(|| {
                crate::Error::remote("The 'dir' backend requires remote.store_dir to be set")
            })?;
            tracing::debug!(?dir, "Using directory blob store");
            Ok(Box::new(DirBlobStore::new(dir)))
        }
        Backend::Gist => {
            let token = credentials.get_token()?;
            tracing::debug!(api_url = %settings.remote.api_url, "Using gist blob store");
            Ok(Box::new(GistStore::new(&settings.remote.api_url, &token)?))
        }
    }
}
