//! Shared deterministic types for the workflow nodes.
//!
//! These types define stable contracts between nodes and the HTTP boundary.
//! They must not depend on external state or I/O.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Project name used when the plan omits one.
pub const DEFAULT_PROJECT_NAME: &str = "shadow-project";

/// Structured sprint plan produced by the manager node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintPlan {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    pub tickets: Vec<Ticket>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub starter_files: Vec<StarterFile>,
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

impl SprintPlan {
    /// Fixed plan substituted whenever the LLM call or the parse fails.
    pub fn fallback() -> Self {
        Self {
            project_name: "backup_project".to_string(),
            tickets: vec![Ticket {
                id: "0".to_string(),
                title: "Error".to_string(),
                body: "AI failed to generate.".to_string(),
            }],
            starter_files: Vec::new(),
        }
    }
}

/// A single work item in the sprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(deserialize_with = "string_or_integer")]
    pub id: String,
    pub title: String,
    pub body: String,
}

/// Models often emit `"id": 1`; integers are kept as their decimal text.
fn string_or_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
    })
}

/// A file the provisioner commits alongside the README.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarterFile {
    pub name: String,
    pub content: String,
}

/// Verdict status computed by the security node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityStatus {
    #[default]
    Clean,
    Blocked,
}

impl SecurityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SecurityStatus::Clean => "clean",
            SecurityStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for SecurityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Security verdict plus the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityVerdict {
    pub status: SecurityStatus,
    pub message: String,
}

/// Credential shapes recognized by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    GoogleApiKey,
    OpenAiKey,
}

impl CredentialKind {
    pub fn label(self) -> &'static str {
        match self {
            CredentialKind::GoogleApiKey => "Google Key",
            CredentialKind::OpenAiKey => "OpenAI Key",
        }
    }
}

/// A fetched source file. Scanned once, then handed to the reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    pub filename: String,
    pub content: String,
}

/// One entry of a repository directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    /// Raw download URL. `None` for directories and submodules.
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ContentEntry {
    pub fn file(name: &str, download_url: &str) -> Self {
        Self {
            name: name.to_string(),
            download_url: Some(download_url.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_name_defaults() {
        let plan: SprintPlan =
            serde_json::from_str(r#"{"tickets":[{"id":"1","title":"t","body":"b"}]}"#)
                .expect("parse");
        assert_eq!(plan.project_name, DEFAULT_PROJECT_NAME);
        assert!(plan.starter_files.is_empty());
    }

    #[test]
    fn integer_ticket_id_becomes_text() {
        let plan: SprintPlan = serde_json::from_str(
            r#"{"project_name":"p","tickets":[{"id":1,"title":"t","body":"b"}]}"#,
        )
        .expect("parse");
        assert_eq!(plan.tickets[0].id, "1");
        let json = serde_json::to_value(&plan).expect("serialize");
        assert_eq!(json["tickets"][0]["id"], "1");
    }

    #[test]
    fn non_scalar_ticket_id_is_rejected() {
        let err = serde_json::from_str::<SprintPlan>(
            r#"{"project_name":"p","tickets":[{"id":[1],"title":"t","body":"b"}]}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn security_status_serializes_lowercase() {
        let json = serde_json::to_string(&SecurityStatus::Blocked).expect("serialize");
        assert_eq!(json, "\"blocked\"");
        assert_eq!(SecurityStatus::default(), SecurityStatus::Clean);
    }
}
