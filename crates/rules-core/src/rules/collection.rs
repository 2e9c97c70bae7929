//! Named collection of rule files

use std::collections::BTreeMap;

use rules_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

use super::rule::Rule;
use crate::{Error, Result};

/// A named collection of rules ("template")
///
/// Rules are keyed by their relative path. The key of every entry always
/// equals the contained rule's `path`; all mutation goes through
/// [`add_file`](Self::add_file) and deserialization re-checks the invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCollection")]
pub struct RuleCollection {
    name: String,
    description: String,
    files: BTreeMap<String, Rule>,
}

/// Unchecked wire shape, validated into a [`RuleCollection`]
#[derive(Deserialize)]
struct RawCollection {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    files: BTreeMap<String, Rule>,
}

impl TryFrom<RawCollection> for RuleCollection {
    type Error = String;

    fn try_from(raw: RawCollection) -> std::result::Result<Self, Self::Error> {
        for (key, rule) in &raw.files {
            if key != &rule.path {
                return Err(format!(
                    "file key '{}' does not match rule path '{}'",
                    key, rule.path
                ));
            }
        }
        Ok(Self {
            name: raw.name,
            description: raw.description,
            files: raw.files,
        })
    }
}

impl RuleCollection {
    /// Create a new empty collection
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Insert or replace the rule stored under `path`.
    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<String>, path: &str) {
        let key = NormalizedPath::new(path).as_str().to_string();
        self.files
            .insert(key.clone(), Rule::new(name, content, key));
    }

    /// Look up a rule by relative path
    pub fn get_file(&self, path: &str) -> Option<&Rule> {
        self.files.get(path)
    }

    /// Remove a rule if present
    pub fn remove_file(&mut self, path: &str) -> Option<Rule> {
        self.files.remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate rules in path order
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.files.values()
    }

    /// Relative paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Whether both collections hold the same paths with identical content.
    ///
    /// Name, description and display names are ignored.
    pub fn same_content(&self, other: &RuleCollection) -> bool {
        self.files.len() == other.files.len()
            && self
                .files
                .iter()
                .all(|(path, rule)| other.get_file(path).is_some_and(|o| o.content == rule.content))
    }

    /// Serialize to the self-describing JSON record
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from the JSON record produced by [`to_json`](Self::to_json)
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|e| Error::format("rule collection", e.to_string()))
    }
}
