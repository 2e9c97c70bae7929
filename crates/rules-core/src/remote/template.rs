//! Template-level operations on top of a blob store

use super::{BlobStore, RemoteCollection, decode, encode};
use crate::sync::LocalSnapshot;
use crate::{Error, Result};

/// What a push did to the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// No template with this name existed
    Created { id: String },
    /// An existing template was replaced
    Updated { id: String },
    /// The remote already held identical content; nothing was written
    UpToDate { id: String },
}

impl PushOutcome {
    pub fn id(&self) -> &str {
        match self {
            Self::Created { id } | Self::Updated { id } | Self::UpToDate { id } => id,
        }
    }
}

/// Download and decode the template called `name`.
///
/// # Errors
///
/// Returns [`Error::TemplateNotFound`] when no blob set carries that name.
pub fn fetch_template(store: &dyn BlobStore, name: &str) -> Result<RemoteCollection> {
    let summary = store.find(name)?.ok_or_else(|| Error::TemplateNotFound {
        name: name.to_string(),
    })?;
    let blob = store.get(&summary.id)?;
    let remote = decode(&blob, &summary.name)?;
    tracing::debug!(name, id = %summary.id, files = remote.collection.len(), "Fetched template");
    Ok(remote)
}

/// Upload a local snapshot, replacing any template with the same name.
///
/// Skips the upload when the remote content already matches byte for byte.
pub fn push_template(store: &dyn BlobStore, snapshot: &LocalSnapshot) -> Result<PushOutcome> {
    let name = snapshot.collection.name();
    let files = encode(&snapshot.collection, &snapshot.modified_times())?;

    let Some(existing) = store.find(name)? else {
        let id = store.create(name, &files)?;
        return Ok(PushOutcome::Created { id });
    };

    match store.get(&existing.id).and_then(|blob| decode(&blob, name)) {
        Ok(remote) if remote.collection.same_content(&snapshot.collection) => {
            tracing::info!(name, id = %existing.id, "Remote template is up to date");
            return Ok(PushOutcome::UpToDate { id: existing.id });
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(name, error = %e, "Existing remote template is unreadable, replacing it");
        }
    }

    let id = store.replace(&existing.id, name, &files)?;
    Ok(PushOutcome::Updated { id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryBlobStore;
    use rules_fs::NormalizedPath;
    use std::fs;
    use tempfile::TempDir;

    fn snapshot(temp: &TempDir, files: &[(&str, &str)]) -> LocalSnapshot {
        for (path, content) in files {
            fs::write(temp.path().join(path), content).unwrap();
        }
        LocalSnapshot::scan(&NormalizedPath::new(temp.path()), "team").unwrap()
    }

    #[test]
    fn push_creates_then_reports_up_to_date() {
        let temp = TempDir::new().unwrap();
        let store = MemoryBlobStore::new();
        let local = snapshot(&temp, &[("a.mdc", "alpha")]);

        let first = push_template(&store, &local).unwrap();
        let second = push_template(&store, &local).unwrap();

        assert!(matches!(first, PushOutcome::Created { .. }));
        assert_eq!(second, PushOutcome::UpToDate { id: first.id().to_string() });
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn push_replaces_changed_template() {
        let temp = TempDir::new().unwrap();
        let store = MemoryBlobStore::new();
        push_template(&store, &snapshot(&temp, &[("a.mdc", "alpha")])).unwrap();

        let outcome = push_template(&store, &snapshot(&temp, &[("a.mdc", "beta")])).unwrap();

        assert!(matches!(outcome, PushOutcome::Updated { .. }));
        assert_eq!(store.len(), 1);
        let fetched = fetch_template(&store, "team").unwrap();
        assert_eq!(fetched.collection.get_file("a.mdc").unwrap().content, "beta");
    }

    #[test]
    fn fetch_unknown_template() {
        let store = MemoryBlobStore::new();
        assert!(matches!(
            fetch_template(&store, "nope"),
            Err(Error::TemplateNotFound { .. })
        ));
    }
}
