//! Security agent: fetches one source file and blocks leaked credentials.

use tracing::{info, instrument, warn};

use crate::core::locator::RepoLocator;
use crate::core::scanner::{ScanOutcome, classify, redact_line, select_source_file};
use crate::core::state::{ReviewState, StateUpdate};
use crate::core::types::{CredentialKind, SecurityStatus, SecurityVerdict, SourceArtifact};
use crate::io::config::ScanConfig;
use crate::io::source_host::SourceHost;

/// Result of scanning a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    pub verdict: SecurityVerdict,
    /// Fetched source, kept only when the verdict is clean.
    pub artifact: Option<SourceArtifact>,
}

/// Code scanner node.
#[derive(Debug, Clone, Default)]
pub struct SecurityAgent {
    config: ScanConfig,
}

impl SecurityAgent {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    #[instrument(skip_all, fields(node = "security", repo_url = %repo_url))]
    pub fn scan<H: SourceHost + ?Sized>(&self, host: &H, repo_url: &str) -> ScanReport {
        let (outcome, artifact) = self.fetch_and_scan(host, repo_url);
        let verdict = classify(&outcome, self.config.unscannable);
        info!(status = %verdict.status, message = %verdict.message, "scan finished");
        let artifact = artifact.filter(|_| verdict.status == SecurityStatus::Clean);
        ScanReport {
            outcome,
            verdict,
            artifact,
        }
    }

    pub fn run<H: SourceHost + ?Sized>(&self, host: &H, state: &ReviewState) -> StateUpdate {
        let report = self.scan(host, &state.repo_url);
        StateUpdate::message(report.verdict.message)
            .with_status(report.verdict.status)
            .with_artifact(report.artifact)
    }

    fn fetch_and_scan<H: SourceHost + ?Sized>(
        &self,
        host: &H,
        repo_url: &str,
    ) -> (ScanOutcome, Option<SourceArtifact>) {
        let locator = match RepoLocator::parse(repo_url) {
            Ok(locator) => locator,
            Err(err) => {
                warn!(error = %err, "rejecting malformed repository locator");
                return (
                    ScanOutcome::MalformedLocator {
                        reason: err.reason().to_string(),
                    },
                    None,
                );
            }
        };

        let entries = match host.list_contents(&locator) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(repo = %locator, error = %err, "could not list repository");
                return (
                    ScanOutcome::Unscannable {
                        reason: err.to_string(),
                    },
                    None,
                );
            }
        };

        let Some(entry) = select_source_file(
            &entries,
            &self.config.preferred_file,
            &self.config.source_suffixes,
        ) else {
            info!(repo = %locator, entries = entries.len(), "no scannable source file");
            return (ScanOutcome::NoSource, None);
        };
        let Some(download_url) = entry.download_url.as_deref() else {
            return (ScanOutcome::NoSource, None);
        };

        info!(filename = %entry.name, "scanning file");
        let content = match host.fetch_text(download_url) {
            Ok(content) => content,
            Err(err) => {
                warn!(filename = %entry.name, error = %err, "could not download source file");
                return (
                    ScanOutcome::Unscannable {
                        reason: err.to_string(),
                    },
                    None,
                );
            }
        };

        let artifact = SourceArtifact {
            filename: entry.name.clone(),
            content,
        };
        let (outcome, finding) = ScanOutcome::from_artifact(&artifact);
        if let Some(finding) = finding {
            match finding.kind {
                CredentialKind::GoogleApiKey => {
                    let lines: Vec<&str> = artifact.content.lines().collect();
                    for number in &finding.lines {
                        let text = lines.get(number - 1).copied().unwrap_or_default();
                        warn!(
                            filename = %artifact.filename,
                            line = *number,
                            text = %redact_line(text),
                            "detected Google API key prefix"
                        );
                    }
                }
                CredentialKind::OpenAiKey => {
                    warn!(filename = %artifact.filename, "detected OpenAI key pattern");
                }
            }
        }
        (outcome, Some(artifact))
    }
}
