//! Tests for the GitHub gist store against a local mock server
//!
//! `GistStore` uses the blocking reqwest client, so every store call runs
//! inside `spawn_blocking` while wiremock serves from the async runtime.

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use rules_core::{BlobStore, Error, GistStore};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "ghp_test";

/// Run `f` against a store pointed at `server`
async fn with_store<T, F>(server: &MockServer, f: F) -> T
where
    T: Send + 'static,
    F: FnOnce(GistStore) -> T + Send + 'static,
{
    let api_url = server.uri();
    tokio::task::spawn_blocking(move || f(GistStore::new(&api_url, TOKEN).unwrap()))
        .await
        .unwrap()
}

fn files(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(path, content)| (path.to_string(), content.to_string()))
        .collect()
}

// ============================================================================
// list
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_list_follows_pages_and_filters_by_tag() {
    let server = MockServer::start().await;

    let first_page: Vec<Value> = (0..100)
        .map(|i| {
            let description = if i % 2 == 0 {
                format!("[cursorrules] t{}", i)
            } else {
                "unrelated gist".to_string()
            };
            json!({ "id": format!("g{}", i), "description": description })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/gists"))
        .and(query_param("page", "1"))
        .and(header("authorization", "Bearer ghp_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first_page))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gists"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "last", "description": "[cursorrules] team" },
            { "id": "untagged", "description": null }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let summaries = with_store(&server, |store| store.list()).await.unwrap();

    assert_eq!(summaries.len(), 51);
    assert_eq!(summaries[0].name, "t0");
    let last = summaries.last().unwrap();
    assert_eq!((last.id.as_str(), last.name.as_str()), ("last", "team"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_is_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = with_store(&server, |store| store.list()).await.unwrap_err();

    match err {
        Error::Remote { message } => {
            assert!(message.contains("authentication rejected"), "{}", message);
            assert!(message.contains("cursorrules auth"), "{}", message);
        }
        other => panic!("expected a remote error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_gist_is_remote_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = with_store(&server, |store| store.get("gone")).await.unwrap_err();

    assert!(matches!(err, Error::Remote { ref message } if message.contains("not found")));
}

// ============================================================================
// create / get
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_create_sends_private_tagged_gist() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gists"))
        .and(body_partial_json(json!({
            "description": "[cursorrules] team",
            "public": false,
            "files": {
                "a.mdc": { "content": "alpha" },
                "lang%2Frust.mdc": { "content": "rust" }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "new-id" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = with_store(&server, |store| {
        store.create("team", &files(&[("a.mdc", "alpha"), ("lang/rust.mdc", "rust")]))
    })
    .await
    .unwrap();

    assert_eq!(id, "new-id");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_fetches_truncated_file_from_raw_url() {
    let server = MockServer::start().await;
    let raw_url = format!("{}/raw/big", server.uri());
    Mock::given(method("GET"))
        .and(path("/gists/g1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "g1",
            "description": "[cursorrules] team",
            "files": {
                "big.mdc": { "content": "partial", "truncated": true, "raw_url": raw_url },
                "lang%2Frust.mdc": { "content": "rust", "truncated": false }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/big"))
        .respond_with(ResponseTemplate::new(200).set_body_string("full content"))
        .expect(1)
        .mount(&server)
        .await;

    let blob = with_store(&server, |store| store.get("g1")).await.unwrap();

    assert_eq!(blob.description, "[cursorrules] team");
    assert_eq!(
        blob.files,
        files(&[("big.mdc", "full content"), ("lang/rust.mdc", "rust")])
    );
}

// ============================================================================
// replace / delete
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_replace_patches_and_nulls_removed_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/g1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "g1",
            "description": "[cursorrules] team",
            "files": {
                "a.mdc": { "content": "old" },
                "old.mdc": { "content": "gone soon" }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/gists/g1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "g1" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = with_store(&server, |store| {
        store.replace("g1", "team", &files(&[("a.mdc", "new")]))
    })
    .await
    .unwrap();
    assert_eq!(id, "g1");

    let requests = server.received_requests().await.unwrap();
    let patch = requests
        .iter()
        .find(|request| request.method.as_str() == "PATCH")
        .unwrap();
    let body: Value = serde_json::from_slice(&patch.body).unwrap();
    assert_eq!(body["description"], "[cursorrules] team");
    assert_eq!(body["files"]["a.mdc"]["content"], "new");
    assert!(body["files"]["old.mdc"].is_null());
    assert!(body["files"].as_object().unwrap().contains_key("old.mdc"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_sends_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/gists/g1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    with_store(&server, |store| store.delete("g1")).await.unwrap();
}
