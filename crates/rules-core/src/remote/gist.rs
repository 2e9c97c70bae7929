//! GitHub gist blob store
//!
//! Templates are stored as private gists whose description carries the tool
//! tag. Gist file names cannot contain `/`, so relative paths are escaped
//! (`%` -> `%25`, `/` -> `%2F`) on the way up and unescaped on the way down.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{BlobSet, BlobSetSummary, BlobStore, describe, template_name};
use crate::{Error, Result};

/// Default GitHub REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct GistSummary {
    id: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Gist {
    #[serde(default)]
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    files: BTreeMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    raw_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct FileContent<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateGist<'a> {
    description: String,
    public: bool,
    files: BTreeMap<String, FileContent<'a>>,
}

#[derive(Debug, Serialize)]
struct UpdateGist<'a> {
    description: String,
    /// `None` serializes as `null`, which deletes the file
    files: BTreeMap<String, Option<FileContent<'a>>>,
}

/// Blob store backed by GitHub gists
#[derive(Debug, Clone)]
pub struct GistStore {
    client: Client,
    api_url: String,
}

impl GistStore {
    /// Create a client for `api_url` authenticated with `token`
    pub fn new(api_url: &str, token: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| Error::remote("access token contains invalid characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = Client::builder()
            .user_agent(concat!("cursorrules/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Map non-success statuses to remote errors
    fn check(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => format!(
                "{} failed: authentication rejected ({}). Run 'cursorrules auth' to update the token",
                what, status
            ),
            StatusCode::NOT_FOUND => format!("{} failed: not found", what),
            _ => {
                let body = response.text().unwrap_or_default();
                format!("{} failed ({}): {}", what, status, body.trim())
            }
        };
        Err(Error::remote(message))
    }

    fn fetch(&self, id: &str) -> Result<Gist> {
        tracing::debug!(id, "Fetching gist");
        let response = self.client.get(self.url(&format!("/gists/{}", id))).send()?;
        Ok(Self::check(response, "fetching gist")?.json()?)
    }

    fn file_content(&self, file: GistFile) -> Result<String> {
        match (file.truncated, file.raw_url, file.content) {
            (true, Some(raw_url), _) => {
                tracing::debug!(%raw_url, "Gist file truncated, fetching raw content");
                let response = self.client.get(raw_url).send()?;
                Ok(Self::check(response, "fetching raw gist file")?.text()?)
            }
            (_, _, Some(content)) => Ok(content),
            (_, _, None) => Ok(String::new()),
        }
    }
}

impl BlobStore for GistStore {
    fn list(&self) -> Result<Vec<BlobSetSummary>> {
        let mut summaries = Vec::new();
        let mut page = 1;
        loop {
            let response = self
                .client
                .get(self.url("/gists"))
                .query(&[("per_page", PAGE_SIZE), ("page", page)])
                .send()?;
            let gists: Vec<GistSummary> = Self::check(response, "listing gists")?.json()?;
            let count = gists.len();

            summaries.extend(gists.into_iter().filter_map(|gist| {
                let name = template_name(gist.description.as_deref().unwrap_or(""))?.to_string();
                Some(BlobSetSummary { id: gist.id, name })
            }));

            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }
        Ok(summaries)
    }

    fn create(&self, name: &str, files: &BTreeMap<String, String>) -> Result<String> {
        let body = CreateGist {
            description: describe(name),
            public: false,
            files: files
                .iter()
                .map(|(path, content)| (escape_name(path), FileContent { content }))
                .collect(),
        };
        let response = self.client.post(self.url("/gists")).json(&body).send()?;
        let gist: Gist = Self::check(response, "creating gist")?.json()?;
        tracing::info!(id = %gist.id, name, "Created gist");
        Ok(gist.id)
    }

    fn get(&self, id: &str) -> Result<BlobSet> {
        let gist = self.fetch(id)?;
        let mut files = BTreeMap::new();
        for (name, file) in gist.files {
            files.insert(unescape_name(&name), self.file_content(file)?);
        }
        Ok(BlobSet {
            description: gist.description.unwrap_or_default(),
            files,
        })
    }

    fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/gists/{}", id)))
            .send()?;
        Self::check(response, "deleting gist")?;
        tracing::info!(id, "Deleted gist");
        Ok(())
    }

    /// Atomic update through `PATCH /gists/{id}`; files no longer present are
    /// sent as `null` so the gist ends up holding exactly `files`.
    fn replace(&self, id: &str, name: &str, files: &BTreeMap<String, String>) -> Result<String> {
        let existing = self.fetch(id)?;

        let mut update: BTreeMap<String, Option<FileContent<'_>>> = existing
            .files
            .keys()
            .map(|escaped| (escaped.clone(), None))
            .collect();
        for (path, content) in files {
            update.insert(escape_name(path), Some(FileContent { content }));
        }

        let body = UpdateGist {
            description: describe(name),
            files: update,
        };
        let response = self
            .client
            .patch(self.url(&format!("/gists/{}", id)))
            .json(&body)
            .send()?;
        Self::check(response, "updating gist")?;
        tracing::info!(id, name, "Updated gist");
        Ok(id.to_string())
    }
}

/// Escape a relative path into a gist-safe file name
fn escape_name(path: &str) -> String {
    path.replace('%', "%25").replace('/', "%2F")
}

/// Reverse [`escape_name`]
fn unescape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];
        if tail.starts_with("%2F") || tail.starts_with("%2f") {
            out.push('/');
            rest = &tail[3..];
        } else if tail.starts_with("%25") {
            out.push('%');
            rest = &tail[3..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.mdc", "a.mdc")]
    #[case("lang/rust.mdc", "lang%2Frust.mdc")]
    #[case("100%/x.mdc", "100%25%2Fx.mdc")]
    #[case("%2F.mdc", "%252F.mdc")]
    fn escape_round_trip(#[case] path: &str, #[case] escaped: &str) {
        assert_eq!(escape_name(path), escaped);
        assert_eq!(unescape_name(escaped), path);
    }

    #[test]
    fn unescape_leaves_stray_percent() {
        assert_eq!(unescape_name("50%off.mdc"), "50%off.mdc");
    }

    #[test]
    fn update_body_serializes_removed_files_as_null() {
        let mut files = BTreeMap::new();
        files.insert("old.mdc".to_string(), None);
        files.insert("new.mdc".to_string(), Some(FileContent { content: "x" }));
        let body = UpdateGist {
            description: describe("team"),
            files,
        };

        let json = serde_json::to_value(&body).unwrap();

        assert!(json["files"]["old.mdc"].is_null());
        assert_eq!(json["files"]["new.mdc"]["content"], "x");
    }

    #[test]
    fn new_rejects_invalid_token() {
        assert!(GistStore::new(DEFAULT_API_URL, "bad\ntoken").is_err());
    }
}
