//! Repository locator resolution.
//!
//! A locator is any URL-shaped string ending in `owner/repo`. Resolution is
//! positional: the last two `/`-separated segments are taken. Segments that
//! cannot be a GitHub account or repository name are rejected instead of
//! being passed downstream.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static OWNER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9](?:-?[A-Za-z0-9])*$").expect("owner regex"));
static REPO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("repo regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    #[error("malformed repository locator {locator:?}: {reason}")]
    Malformed { locator: String, reason: String },
}

impl LocatorError {
    fn malformed(locator: &str, reason: impl Into<String>) -> Self {
        LocatorError::Malformed {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            LocatorError::Malformed { reason, .. } => reason,
        }
    }
}

/// Owner and repository name resolved from a locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocator {
    pub owner: String,
    pub repo: String,
}

impl RepoLocator {
    pub fn parse(locator: &str) -> Result<Self, LocatorError> {
        let trimmed = locator.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.len() < 2 {
            return Err(LocatorError::malformed(
                locator,
                "expected a locator ending in owner/repo",
            ));
        }

        let owner = segments[segments.len() - 2];
        let raw_repo = segments[segments.len() - 1];
        let repo = raw_repo.strip_suffix(".git").unwrap_or(raw_repo);

        if owner.is_empty() || repo.is_empty() {
            return Err(LocatorError::malformed(
                locator,
                "owner and repository segments must be non-empty",
            ));
        }
        if !OWNER_RE.is_match(owner) {
            return Err(LocatorError::malformed(
                locator,
                format!("{owner:?} is not a valid account name"),
            ));
        }
        if !REPO_RE.is_match(repo) || repo == "." || repo == ".." {
            return Err(LocatorError::malformed(
                locator,
                format!("{repo:?} is not a valid repository name"),
            ));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for RepoLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
