//! Credential scanning and verdict classification.
//!
//! Scanning is pure: it reports what was found and where. The security node
//! owns fetching and logging.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::types::{
    ContentEntry, CredentialKind, SecurityStatus, SecurityVerdict, SourceArtifact,
};

/// Literal prefix of Google API keys.
pub const GOOGLE_KEY_PREFIX: &str = "AIza";

/// `sk-` followed by at least 20 alphanumerics, word-bounded, so incidental
/// names such as `task-manager-sk` do not match.
static OPENAI_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bsk-[a-zA-Z0-9]{20,}").expect("openai key regex"));

/// A detected credential and the 1-based lines carrying the Google prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFinding {
    pub kind: CredentialKind,
    pub lines: Vec<usize>,
}

/// Scan source text. Google keys are checked before OpenAI keys.
pub fn scan_source(content: &str) -> Option<CredentialFinding> {
    if content.contains(GOOGLE_KEY_PREFIX) {
        let lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains(GOOGLE_KEY_PREFIX))
            .map(|(idx, _)| idx + 1)
            .collect();
        return Some(CredentialFinding {
            kind: CredentialKind::GoogleApiKey,
            lines,
        });
    }

    if OPENAI_KEY_RE.is_match(content) {
        return Some(CredentialFinding {
            kind: CredentialKind::OpenAiKey,
            lines: Vec::new(),
        });
    }

    None
}

/// Mask everything after each Google key prefix up to the end of the token.
pub fn redact_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(pos) = rest.find(GOOGLE_KEY_PREFIX) {
        let (head, tail) = rest.split_at(pos + GOOGLE_KEY_PREFIX.len());
        out.push_str(head);
        let token_len = tail
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(tail.len());
        out.push_str(&"*".repeat(token_len));
        rest = &tail[token_len..];
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Pick the file to scan from a directory listing.
///
/// Entries named exactly `preferred` move to the front (stable, so the
/// remaining entries keep their order); the first entry with a recognized
/// suffix and a download URL wins.
pub fn select_source_file<'a>(
    entries: &'a [ContentEntry],
    preferred: &str,
    suffixes: &[String],
) -> Option<&'a ContentEntry> {
    let mut ordered: Vec<&ContentEntry> = entries.iter().collect();
    ordered.sort_by_key(|entry| entry.name != preferred);
    ordered.into_iter().find(|entry| {
        entry.download_url.is_some()
            && suffixes
                .iter()
                .any(|suffix| entry.name.ends_with(suffix.as_str()))
    })
}

/// What happened when the security node tried to scan a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Clean { filename: String },
    Blocked { kind: CredentialKind, filename: String },
    /// Listing succeeded but held no recognized source file.
    NoSource,
    /// Listing or download failed.
    Unscannable { reason: String },
    MalformedLocator { reason: String },
}

impl ScanOutcome {
    /// Classify a fetched artifact.
    pub fn from_artifact(artifact: &SourceArtifact) -> (Self, Option<CredentialFinding>) {
        match scan_source(&artifact.content) {
            Some(finding) => (
                ScanOutcome::Blocked {
                    kind: finding.kind,
                    filename: artifact.filename.clone(),
                },
                Some(finding),
            ),
            None => (
                ScanOutcome::Clean {
                    filename: artifact.filename.clone(),
                },
                None,
            ),
        }
    }
}

/// Verdict for repositories that could not be scanned at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnscannablePolicy {
    /// Treat like an empty repository (clean).
    #[default]
    Allow,
    /// Block the review.
    Block,
}

pub const NO_CODE_MESSAGE: &str = "Security passed (no code found).";
pub const PASSED_MESSAGE: &str = "Security check passed.";

/// Map a scan outcome to the verdict consumed by the router.
pub fn classify(outcome: &ScanOutcome, policy: UnscannablePolicy) -> SecurityVerdict {
    match outcome {
        ScanOutcome::Clean { .. } => clean(PASSED_MESSAGE),
        ScanOutcome::NoSource => clean(NO_CODE_MESSAGE),
        ScanOutcome::Blocked { kind, filename } => {
            let message = match kind {
                CredentialKind::GoogleApiKey => format!(
                    "SECURITY BLOCK: Found {} in {filename}. Remove '{GOOGLE_KEY_PREFIX}...'.",
                    kind.label()
                ),
                CredentialKind::OpenAiKey => {
                    format!("SECURITY BLOCK: Found {} in {filename}.", kind.label())
                }
            };
            blocked(message)
        }
        ScanOutcome::Unscannable { reason } => match policy {
            UnscannablePolicy::Allow => clean(NO_CODE_MESSAGE),
            UnscannablePolicy::Block => blocked(format!(
                "SECURITY BLOCK: Could not scan repository: {reason}."
            )),
        },
        ScanOutcome::MalformedLocator { reason } => blocked(format!(
            "SECURITY BLOCK: Malformed repository locator: {reason}."
        )),
    }
}

fn clean(message: &str) -> SecurityVerdict {
    SecurityVerdict {
        status: SecurityStatus::Clean,
        message: message.to_string(),
    }
}

fn blocked(message: String) -> SecurityVerdict {
    SecurityVerdict {
        status: SecurityStatus::Blocked,
        message,
    }
}
