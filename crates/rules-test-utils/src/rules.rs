//! [`TestRules`] fixture for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

/// A temporary project directory containing `.cursor/rules`, with helpers
/// for writing rule files and asserting on their state.
///
/// # Example
///
/// ```rust,no_run
/// use rules_test_utils::TestRules;
///
/// let rules = TestRules::new();
/// rules.write("a.mdc", "alpha");
/// rules.assert_content("a.mdc", "alpha");
/// ```
pub struct TestRules {
    temp_dir: TempDir,
    rules_dir: PathBuf,
}

impl Default for TestRules {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRules {
    /// Create a temporary project with an empty `.cursor/rules` directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let rules_dir = temp_dir.path().join(".cursor").join("rules");
        fs::create_dir_all(&rules_dir).unwrap();
        Self { temp_dir, rules_dir }
    }

    /// The project root (the working directory a CLI run would use).
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The rules directory inside the project.
    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }

    /// Absolute path of a file relative to the rules directory.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.rules_dir.join(relative)
    }

    /// Write a rule file, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }

    /// Read a rule file.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Modification time of a rule file.
    pub fn modified(&self, relative: &str) -> SystemTime {
        fs::metadata(self.path(relative)).unwrap().modified().unwrap()
    }

    /// Subdirectories of `.backups`, sorted.
    pub fn backup_runs(&self) -> Vec<PathBuf> {
        let dir = self.rules_dir.join(".backups");
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut runs: Vec<PathBuf> = entries
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.is_dir())
            .collect();
        runs.sort();
        runs
    }

    /// Assert that a rule file exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert that a rule file does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(!path.exists(), "Expected file NOT to exist: {}", path.display());
    }

    /// Assert the exact content of a rule file.
    ///
    /// # Panics
    /// Panics if the file cannot be read or differs from `expected`.
    pub fn assert_content(&self, relative: &str, expected: &str) {
        let actual = self.read(relative);
        assert!(
            actual == expected,
            "File {} has unexpected content.\nExpected: {:?}\nActual: {:?}",
            relative,
            expected,
            actual
        );
    }
}
