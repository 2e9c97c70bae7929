//! In-process blob store

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{BlobSet, BlobSetSummary, BlobStore, describe, template_name};
use crate::{Error, Result};

/// Blob store held entirely in memory
///
/// Enforces the same "no empty values" rule as the real stores so that tests
/// exercise the placeholder substitution.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    sets: RefCell<BTreeMap<String, BlobSet>>,
    next_id: RefCell<u64>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blob sets currently stored
    pub fn len(&self) -> usize {
        self.sets.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.borrow().is_empty()
    }

    /// Insert a raw blob set, bypassing validation
    pub fn insert_raw(&self, description: &str, files: BTreeMap<String, String>) -> String {
        let id = self.allocate_id();
        self.sets.borrow_mut().insert(
            id.clone(),
            BlobSet {
                description: description.to_string(),
                files,
            },
        );
        id
    }

    fn allocate_id(&self) -> String {
        let mut next = self.next_id.borrow_mut();
        *next += 1;
        format!("mem-{}", *next)
    }
}

fn reject_empty(files: &BTreeMap<String, String>) -> Result<()> {
    match files.iter().find(|(_, content)| content.is_empty()) {
        Some((name, _)) => Err(Error::remote(format!("file '{}' has empty content", name))),
        None => Ok(()),
    }
}

impl BlobStore for MemoryBlobStore {
    fn list(&self) -> Result<Vec<BlobSetSummary>> {
        Ok(self
            .sets
            .borrow()
            .iter()
            .filter_map(|(id, set)| {
                template_name(&set.description).map(|name| BlobSetSummary {
                    id: id.clone(),
                    name: name.to_string(),
                })
            })
            .collect())
    }

    fn create(&self, name: &str, files: &BTreeMap<String, String>) -> Result<String> {
        reject_empty(files)?;
        Ok(self.insert_raw(&describe(name), files.clone()))
    }

    fn get(&self, id: &str) -> Result<BlobSet> {
        self.sets
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::remote(format!("blob set '{}' not found", id)))
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.sets
            .borrow_mut()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::remote(format!("blob set '{}' not found", id)))
    }
}
