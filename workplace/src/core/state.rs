//! Workflow state values and the merge step between nodes.
//!
//! Nodes never mutate state. Each node reads the current state and returns a
//! [`StateUpdate`]; the workflow runner merges it into the next state value.

use serde::{Deserialize, Serialize};

use crate::core::types::{SecurityStatus, SourceArtifact};

/// Default request used when the caller supplies none.
pub const DEFAULT_REQUEST: &str = "I want a random coding task.";

/// Contribution of a single node: exactly one message plus optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateUpdate {
    pub message: String,
    pub security_status: Option<SecurityStatus>,
    pub artifact: Option<SourceArtifact>,
}

impl StateUpdate {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            security_status: None,
            artifact: None,
        }
    }

    pub fn with_status(mut self, status: SecurityStatus) -> Self {
        self.security_status = Some(status);
        self
    }

    pub fn with_artifact(mut self, artifact: Option<SourceArtifact>) -> Self {
        self.artifact = artifact;
        self
    }
}

/// State of the setup workflow (manager → devops).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupState {
    pub messages: Vec<String>,
}

impl SetupState {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![prompt.into()],
        }
    }

    /// The user's request: the first message, or the default if blank.
    pub fn request(&self) -> &str {
        self.messages
            .first()
            .map(String::as_str)
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or(DEFAULT_REQUEST)
    }

    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    pub fn merge(mut self, update: StateUpdate) -> Self {
        self.messages.push(update.message);
        self
    }
}

/// State of the review workflow (security → senior_dev).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewState {
    pub repo_url: String,
    pub messages: Vec<String>,
    pub security_status: SecurityStatus,
    /// Source fetched by the security node. Never leaves the process.
    #[serde(skip)]
    pub artifact: Option<SourceArtifact>,
}

impl ReviewState {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            messages: Vec::new(),
            security_status: SecurityStatus::Clean,
            artifact: None,
        }
    }

    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    pub fn merge(mut self, update: StateUpdate) -> Self {
        self.messages.push(update.message);
        if let Some(status) = update.security_status {
            self.security_status = status;
        }
        if update.artifact.is_some() {
            self.artifact = update.artifact;
        }
        self
    }
}
