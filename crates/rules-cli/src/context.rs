//! Invocation context
//!
//! Resolves the configuration layers (defaults, `config.toml`, environment,
//! CLI flags) once per invocation and hands commands the paths, settings and
//! store they need.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use rules_core::{
    BlobStore, CredentialStore, EnvOverrides, Policy, Settings, Strictness, SyncEngine,
    SyncOptions, VersionLedger,
};
use rules_fs::{NormalizedPath, RulesPath};

use crate::error::{CliError, Result};
use crate::interactive;

/// Values given on the command line, the highest-precedence layer
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub rules_dir: Option<PathBuf>,
    pub strictness: Option<Strictness>,
}

/// Everything a command needs to run
#[derive(Debug, Clone)]
pub struct Context {
    pub cwd: PathBuf,
    pub config_root: PathBuf,
    pub settings: Settings,
    pub rules_dir: NormalizedPath,
    pub credentials: CredentialStore,
}

impl Context {
    /// Resolve the context for a command run from `cwd`
    pub fn load(cwd: &Path, overrides: &CliOverrides) -> Result<Self> {
        let config_root = rules_core::config_root()?;
        Self::with_config_root(cwd, config_root, &EnvOverrides::from_env(), overrides)
    }

    pub fn with_config_root(
        cwd: &Path,
        config_root: PathBuf,
        env: &EnvOverrides,
        overrides: &CliOverrides,
    ) -> Result<Self> {
        let mut settings = Settings::resolve(&config_root, env)?;
        if let Some(dir) = &overrides.rules_dir {
            settings.rules_dir = Some(dir.clone());
        }
        if let Some(strictness) = overrides.strictness {
            settings.strictness = strictness;
        }

        let rules_dir = settings.rules_dir(cwd);
        tracing::debug!(%rules_dir, config_root = ?config_root, "Resolved context");

        Ok(Self {
            cwd: cwd.to_path_buf(),
            credentials: CredentialStore::new(&config_root),
            config_root,
            settings,
            rules_dir,
        })
    }

    /// Open the configured remote store
    pub fn store(&self) -> Result<Box<dyn BlobStore>> {
        Ok(rules_core::open_store(&self.settings, &self.credentials)?)
    }

    /// Sync engine for the rules directory under `policy`
    pub fn engine(&self, policy: Policy) -> SyncEngine {
        SyncEngine::new(
            self.rules_dir.clone(),
            SyncOptions {
                policy,
                strictness: self.settings.strictness,
            },
        )
    }

    /// Template name recorded in the ledger, if a ledger exists
    pub fn ledger_template(&self) -> Result<Option<String>> {
        let path = self.rules_dir.join(RulesPath::LedgerFile.as_str());
        if !path.is_file() {
            return Ok(None);
        }
        let ledger = VersionLedger::load(&path, "")?;
        Ok(Some(ledger.template_name().to_string()).filter(|name| !name.is_empty()))
    }

    /// Name of the working directory, the fallback template name for pushes
    pub fn directory_name(&self) -> String {
        self.cwd
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "rules".to_string())
    }

    /// Resolve the template a command acts on.
    ///
    /// Uses the explicit name, then the ledger's template, then an
    /// interactive choice among the remote templates.
    pub fn resolve_template(&self, name: Option<String>, store: &dyn BlobStore) -> Result<String> {
        if let Some(name) = template_arg(name) {
            return Ok(name);
        }
        if let Some(name) = self.ledger_template()? {
            tracing::debug!(name, "Using template from version ledger");
            return Ok(name);
        }

        let mut names: Vec<String> = store.list()?.into_iter().map(|s| s.name).collect();
        names.sort();
        names.dedup();
        if names.is_empty() {
            return Err(CliError::user("No templates found in the remote store"));
        }
        if !std::io::stdin().is_terminal() {
            return Err(CliError::user(format!(
                "No template name given. Available: {}",
                names.join(", ")
            )));
        }
        interactive::select_template(&names)
    }
}

/// A template name from the command line, trimmed; blank counts as absent
pub fn template_arg(name: Option<String>) -> Option<String> {
    name.map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules_core::Backend;
    use rules_test_utils::TestRules;
    use tempfile::TempDir;

    #[test]
    fn cli_overrides_win() {
        let project = TestRules::new();
        let home = TempDir::new().unwrap();
        std::fs::write(
            home.path().join("config.toml"),
            "rules_dir = \"from-config\"\nstrictness = \"path\"\n",
        )
        .unwrap();
        let overrides = CliOverrides {
            rules_dir: Some(PathBuf::from("from-cli")),
            strictness: Some(Strictness::Content),
        };

        let ctx = Context::with_config_root(
            project.root(),
            home.path().to_path_buf(),
            &EnvOverrides::default(),
            &overrides,
        )
        .unwrap();

        assert!(ctx.rules_dir.as_str().ends_with("/from-cli"));
        assert_eq!(ctx.settings.strictness, Strictness::Content);
    }

    #[test]
    fn defaults_to_cursor_rules() {
        let project = TestRules::new();
        let home = TempDir::new().unwrap();
        let env = EnvOverrides {
            store_dir: Some(home.path().join("store")),
            ..EnvOverrides::default()
        };

        let ctx = Context::with_config_root(
            project.root(),
            home.path().to_path_buf(),
            &env,
            &CliOverrides::default(),
        )
        .unwrap();

        assert_eq!(ctx.rules_dir, NormalizedPath::new(project.rules_dir()));
        assert_eq!(ctx.settings.remote.backend, Backend::Dir);
        assert!(ctx.store().unwrap().list().unwrap().is_empty());
    }

    #[test]
    fn ledger_template_reads_sidecar() {
        let project = TestRules::new();
        let home = TempDir::new().unwrap();
        let ctx = Context::with_config_root(
            project.root(),
            home.path().to_path_buf(),
            &EnvOverrides::default(),
            &CliOverrides::default(),
        )
        .unwrap();
        assert_eq!(ctx.ledger_template().unwrap(), None);

        VersionLedger::new("team")
            .save(&ctx.rules_dir.join("version.json"))
            .unwrap();

        assert_eq!(ctx.ledger_template().unwrap(), Some("team".to_string()));
    }

    #[test]
    fn template_arg_trims_and_drops_blank() {
        assert_eq!(template_arg(Some("  team \n".into())), Some("team".to_string()));
        assert_eq!(template_arg(Some("   ".into())), None);
        assert_eq!(template_arg(None), None);
    }
}
