//! Test-only collaborators that script LLM and source-host responses.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use anyhow::{Result, anyhow};

use crate::core::locator::RepoLocator;
use crate::core::types::ContentEntry;
use crate::io::llm::{CompletionRequest, LlmClient};
use crate::io::source_host::{CreatedRepository, NewRepository, SourceHost, SourceHostError};

/// Base of the fake raw-download URLs handed out by [`FakeSourceHost`].
pub const RAW_BASE: &str = "https://raw.test";

/// LLM client that replays queued responses and records every request.
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, String>>>,
    always_fail: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            always_fail: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Client whose every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            always_fail: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl LlmClient for ScriptedLlm {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        if let Some(message) = &self.always_fail {
            return Err(anyhow!(message.clone()));
        }
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted response left"))?
            .map_err(|message| anyhow!(message))
    }
}

/// Calls recorded by [`FakeSourceHost`] write operations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordedWrites {
    pub repositories: Vec<NewRepository>,
    /// `(repo, path, content)`.
    pub files: Vec<(String, String, String)>,
    /// `(repo, title)`.
    pub issues: Vec<(String, String)>,
}

/// In-memory source host with a single repository listing.
pub struct FakeSourceHost {
    listing: Result<Vec<ContentEntry>, u16>,
    files: HashMap<String, String>,
    owner: String,
    fail_writes: bool,
    listed: Mutex<Vec<RepoLocator>>,
    writes: Mutex<RecordedWrites>,
}

impl FakeSourceHost {
    /// Repository root holding `files` in listing order.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let listing = files
            .iter()
            .map(|(name, _)| ContentEntry::file(name, &format!("{RAW_BASE}/{name}")))
            .collect();
        let files = files
            .iter()
            .map(|(name, content)| (format!("{RAW_BASE}/{name}"), content.to_string()))
            .collect();
        Self {
            listing: Ok(listing),
            files,
            owner: "shadow-bot".to_string(),
            fail_writes: false,
            listed: Mutex::new(Vec::new()),
            writes: Mutex::new(RecordedWrites::default()),
        }
    }

    /// Listing request fails with HTTP `status`.
    pub fn listing_status(status: u16) -> Self {
        Self {
            listing: Err(status),
            ..Self::with_files(&[])
        }
    }

    /// Listing includes `name` but downloading it fails.
    pub fn with_unreachable_file(name: &str) -> Self {
        let mut host = Self::with_files(&[]);
        host.listing = Ok(vec![ContentEntry::file(name, &format!("{RAW_BASE}/{name}"))]);
        host
    }

    /// Every write operation fails with a 403.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn listed(&self) -> Vec<RepoLocator> {
        self.listed.lock().expect("listed lock").clone()
    }

    pub fn writes(&self) -> RecordedWrites {
        self.writes.lock().expect("writes lock").clone()
    }

    fn check_writes(&self, url: &str) -> Result<(), SourceHostError> {
        if self.fail_writes {
            return Err(SourceHostError::Status {
                status: 403,
                url: url.to_string(),
            });
        }
        Ok(())
    }
}

impl SourceHost for FakeSourceHost {
    fn list_contents(&self, repo: &RepoLocator) -> Result<Vec<ContentEntry>, SourceHostError> {
        self.listed.lock().expect("listed lock").push(repo.clone());
        self.listing.clone().map_err(|status| SourceHostError::Status {
            status,
            url: format!("/repos/{repo}/contents"),
        })
    }

    fn fetch_text(&self, download_url: &str) -> Result<String, SourceHostError> {
        self.files
            .get(download_url)
            .cloned()
            .ok_or_else(|| SourceHostError::Status {
                status: 404,
                url: download_url.to_string(),
            })
    }

    fn create_repository(
        &self,
        request: &NewRepository,
    ) -> Result<CreatedRepository, SourceHostError> {
        self.check_writes("/user/repos")?;
        self.writes
            .lock()
            .expect("writes lock")
            .repositories
            .push(request.clone());
        Ok(CreatedRepository {
            locator: RepoLocator {
                owner: self.owner.clone(),
                repo: request.name.clone(),
            },
            html_url: format!("https://github.com/{}/{}", self.owner, request.name),
        })
    }

    fn put_file(
        &self,
        repo: &RepoLocator,
        path: &str,
        content: &str,
        _message: &str,
    ) -> Result<(), SourceHostError> {
        self.check_writes(path)?;
        self.writes.lock().expect("writes lock").files.push((
            repo.to_string(),
            path.to_string(),
            content.to_string(),
        ));
        Ok(())
    }

    fn create_issue(
        &self,
        repo: &RepoLocator,
        title: &str,
        _body: &str,
    ) -> Result<(), SourceHostError> {
        self.check_writes("issues")?;
        self.writes
            .lock()
            .expect("writes lock")
            .issues
            .push((repo.to_string(), title.to_string()));
        Ok(())
    }
}
