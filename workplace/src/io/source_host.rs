//! Source-hosting client abstraction.
//!
//! [`SourceHost`] covers the handful of GitHub REST calls the workflows make:
//! listing a repository root, downloading a raw file, and (for live
//! provisioning) creating a repository, committing files and opening issues.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::core::locator::RepoLocator;
use crate::core::types::ContentEntry;
use crate::io::config::SourceHostConfig;

const USER_AGENT: &str = concat!("shadow-workplace/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum SourceHostError {
    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response from {url}: {detail}")]
    Decode { url: String, detail: String },
    #[error("GITHUB_TOKEN is required for {action}")]
    Unauthenticated { action: &'static str },
}

/// Request to create a repository under the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRepository {
    pub name: String,
    pub description: String,
    pub private: bool,
}

/// A repository created by [`SourceHost::create_repository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRepository {
    pub locator: RepoLocator,
    pub html_url: String,
}

/// Abstraction over source-hosting backends.
pub trait SourceHost: Send + Sync {
    /// List the repository root.
    fn list_contents(&self, repo: &RepoLocator) -> Result<Vec<ContentEntry>, SourceHostError>;

    /// Download a file as text.
    fn fetch_text(&self, download_url: &str) -> Result<String, SourceHostError>;

    fn create_repository(
        &self,
        request: &NewRepository,
    ) -> Result<CreatedRepository, SourceHostError>;

    /// Create or replace a file on the default branch.
    fn put_file(
        &self,
        repo: &RepoLocator,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), SourceHostError>;

    fn create_issue(
        &self,
        repo: &RepoLocator,
        title: &str,
        body: &str,
    ) -> Result<(), SourceHostError>;
}

/// GitHub REST v3 client.
pub struct GitHubClient {
    http: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &SourceHostConfig, token: Option<String>) -> Result<Self, SourceHostError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => builder.header("Authorization", format!("token {token}")),
            None => builder,
        }
    }

    fn require_token(&self, action: &'static str) -> Result<(), SourceHostError> {
        if self.token.is_none() {
            return Err(SourceHostError::Unauthenticated { action });
        }
        Ok(())
    }
}

fn ensure_success(response: Response, url: &str) -> Result<Response, SourceHostError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SourceHostError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response)
}

impl SourceHost for GitHubClient {
    #[instrument(skip_all, fields(repo = %repo))]
    fn list_contents(&self, repo: &RepoLocator) -> Result<Vec<ContentEntry>, SourceHostError> {
        let url = format!("{}/repos/{}/{}/contents", self.api_base, repo.owner, repo.repo);
        let response = ensure_success(self.authorized(self.http.get(&url)).send()?, &url)?;
        let body: serde_json::Value = response.json()?;
        // A file path returns an object instead of a listing.
        if !body.is_array() {
            return Err(SourceHostError::Decode {
                url,
                detail: "expected a directory listing".to_string(),
            });
        }
        let entries: Vec<ContentEntry> =
            serde_json::from_value(body).map_err(|err| SourceHostError::Decode {
                url: url.clone(),
                detail: err.to_string(),
            })?;
        debug!(entries = entries.len(), "listed repository root");
        Ok(entries)
    }

    #[instrument(skip_all)]
    fn fetch_text(&self, download_url: &str) -> Result<String, SourceHostError> {
        let response = ensure_success(
            self.authorized(self.http.get(download_url)).send()?,
            download_url,
        )?;
        Ok(response.text()?)
    }

    #[instrument(skip_all, fields(name = %request.name))]
    fn create_repository(
        &self,
        request: &NewRepository,
    ) -> Result<CreatedRepository, SourceHostError> {
        self.require_token("creating repositories")?;
        let url = format!("{}/user/repos", self.api_base);
        let body = CreateRepoBody {
            name: &request.name,
            description: &request.description,
            private: request.private,
            auto_init: true,
        };
        let response = ensure_success(
            self.authorized(self.http.post(&url)).json(&body).send()?,
            &url,
        )?;
        let created: CreatedRepoResponse = response.json()?;
        let locator = RepoLocator::parse(&created.full_name).map_err(|err| {
            SourceHostError::Decode {
                url: url.clone(),
                detail: err.to_string(),
            }
        })?;
        Ok(CreatedRepository {
            locator,
            html_url: created.html_url,
        })
    }

    #[instrument(skip_all, fields(repo = %repo))]
    fn put_file(
        &self,
        repo: &RepoLocator,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), SourceHostError> {
        self.require_token("committing files")?;
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            repo.owner,
            repo.repo,
            path.trim_start_matches('/')
        );
        let sha = self.existing_sha(&url)?;
        let body = PutFileBody {
            message,
            content: BASE64.encode(content.as_bytes()),
            sha,
        };
        ensure_success(
            self.authorized(self.http.put(&url)).json(&body).send()?,
            &url,
        )?;
        Ok(())
    }

    #[instrument(skip_all, fields(repo = %repo))]
    fn create_issue(
        &self,
        repo: &RepoLocator,
        title: &str,
        body: &str,
    ) -> Result<(), SourceHostError> {
        self.require_token("opening issues")?;
        let url = format!("{}/repos/{}/{}/issues", self.api_base, repo.owner, repo.repo);
        ensure_success(
            self.authorized(self.http.post(&url))
                .json(&IssueBody { title, body })
                .send()?,
            &url,
        )?;
        Ok(())
    }
}

impl GitHubClient {
    /// Blob sha of an existing file, required by the API to replace it.
    fn existing_sha(&self, url: &str) -> Result<Option<String>, SourceHostError> {
        let response = self.authorized(self.http.get(url)).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response, url)?;
        let existing: ExistingFile = response.json()?;
        Ok(Some(existing.sha))
    }
}

#[derive(Serialize)]
struct CreateRepoBody<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    auto_init: bool,
}

#[derive(Deserialize)]
struct CreatedRepoResponse {
    full_name: String,
    html_url: String,
}

#[derive(Serialize)]
struct PutFileBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

#[derive(Deserialize)]
struct ExistingFile {
    sha: String,
}

#[derive(Serialize)]
struct IssueBody<'a> {
    title: &'a str,
    body: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_entries_tolerate_null_download_url() {
        let raw = r#"[{"name":"src","type":"dir","download_url":null},{"name":"main.py","type":"file","download_url":"https://raw.example/main.py"}]"#;
        let entries: Vec<ContentEntry> = serde_json::from_str(raw).expect("parse");
        assert_eq!(entries[0].download_url, None);
        assert_eq!(
            entries[1].download_url.as_deref(),
            Some("https://raw.example/main.py")
        );
    }

    #[test]
    fn put_file_body_is_base64() {
        let body = PutFileBody {
            message: "add readme",
            content: BASE64.encode("# hi".as_bytes()),
            sha: None,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["content"], "IyBoaQ==");
        assert!(json.get("sha").is_none());
    }

    #[test]
    fn writes_require_a_token() {
        let client = GitHubClient::new(&SourceHostConfig::default(), None).expect("client");
        let err = client
            .create_repository(&NewRepository {
                name: "demo".to_string(),
                description: String::new(),
                private: false,
            })
            .unwrap_err();
        assert!(matches!(err, SourceHostError::Unauthenticated { .. }));
    }
}
