//! Tests for the directory store, store selection and backup restore

use pretty_assertions::assert_eq;
use rules_core::{
    Backend, BlobStore, CredentialStore, DirBlobStore, Error, LocalSnapshot, Policy, PushOutcome,
    Settings, SyncEngine, SyncOptions, fetch_template, open_store, push_template,
};
use rules_fs::NormalizedPath;
use rules_test_utils::TestRules;
use tempfile::TempDir;

fn snapshot(rules: &TestRules, name: &str) -> LocalSnapshot {
    LocalSnapshot::scan(&NormalizedPath::new(rules.rules_dir()), name).unwrap()
}

#[test]
fn test_dir_store_push_pull_between_projects() {
    let store_dir = TempDir::new().unwrap();
    let store = DirBlobStore::new(store_dir.path());

    let alice = TestRules::new();
    alice.write("a.mdc", "alpha");
    alice.write("lang/rust.mdc", "use std;\n");
    push_template(&store, &snapshot(&alice, "team")).unwrap();

    let bob = TestRules::new();
    let engine = SyncEngine::new(NormalizedPath::new(bob.rules_dir()), SyncOptions::default());
    engine.pull(&fetch_template(&store, "team").unwrap()).unwrap();

    bob.assert_content("a.mdc", "alpha");
    bob.assert_content("lang/rust.mdc", "use std;\n");
    bob.assert_exists("version.json");
}

#[test]
fn test_dir_store_replace_is_in_place() {
    let store_dir = TempDir::new().unwrap();
    let store = DirBlobStore::new(store_dir.path());
    let rules = TestRules::new();

    rules.write("a.mdc", "v1");
    let created = push_template(&store, &snapshot(&rules, "team")).unwrap();
    rules.write("a.mdc", "v2");
    let updated = push_template(&store, &snapshot(&rules, "team")).unwrap();

    assert!(matches!(updated, PushOutcome::Updated { .. }));
    assert_eq!(created.id(), updated.id());
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_padded_name_reuses_existing_template() {
    let store_dir = TempDir::new().unwrap();
    let store = DirBlobStore::new(store_dir.path());
    let rules = TestRules::new();
    rules.write("a.mdc", "alpha");

    push_template(&store, &snapshot(&rules, " team ")).unwrap();
    let second = push_template(&store, &snapshot(&rules, "team\n")).unwrap();

    assert!(matches!(second, PushOutcome::UpToDate { .. }));
    assert_eq!(store.list().unwrap().len(), 1);
    assert_eq!(store.list().unwrap()[0].name, "team");
    assert!(fetch_template(&store, "team").is_ok());
}

#[test]
fn test_open_store_dir_backend() {
    let store_dir = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.remote.backend = Backend::Dir;
    settings.remote.store_dir = Some(store_dir.path().to_path_buf());

    let store = open_store(&settings, &CredentialStore::new(home.path()).without_env()).unwrap();

    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_open_store_dir_backend_requires_path() {
    let home = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.remote.backend = Backend::Dir;

    let result = open_store(&settings, &CredentialStore::new(home.path()).without_env());

    assert!(matches!(result, Err(Error::Remote { .. })));
}

#[test]
fn test_open_store_gist_requires_token() {
    let home = TempDir::new().unwrap();
    let settings = Settings::default();

    let result = open_store(&settings, &CredentialStore::new(home.path()).without_env());

    assert!(matches!(result, Err(Error::MissingToken)));
}

#[test]
fn test_restore_after_force() {
    let store_dir = TempDir::new().unwrap();
    let store = DirBlobStore::new(store_dir.path());
    let upstream = TestRules::new();
    upstream.write("a.mdc", "remote");
    push_template(&store, &snapshot(&upstream, "team")).unwrap();

    let rules = TestRules::new();
    rules.write("a.mdc", "mine");
    let engine = SyncEngine::new(
        NormalizedPath::new(rules.rules_dir()),
        SyncOptions {
            policy: Policy::Force,
            ..SyncOptions::default()
        },
    );
    let outcome = engine.pull(&fetch_template(&store, "team").unwrap()).unwrap();
    rules.assert_content("a.mdc", "remote");

    let run_id = outcome.report.backup.unwrap().metadata.run_id;
    let listed: Vec<String> = engine
        .backups()
        .list_backups()
        .unwrap()
        .into_iter()
        .map(|b| b.metadata.run_id)
        .collect();
    assert_eq!(listed, vec![run_id.clone()]);

    let restored = engine.backups().restore_backup(&run_id).unwrap();

    assert_eq!(restored, vec!["a.mdc"]);
    rules.assert_content("a.mdc", "mine");
    assert!(rules.backup_runs()[0].join("a.mdc").exists());
}
