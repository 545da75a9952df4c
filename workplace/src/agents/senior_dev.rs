//! Senior developer agent: reviews code that passed the security scan.

use tracing::{info, instrument, warn};

use crate::core::state::{ReviewState, StateUpdate};
use crate::io::config::ReviewConfig;
use crate::io::llm::{CompletionRequest, LlmClient};
use crate::io::prompt::render_senior_dev;

pub const NOTHING_TO_REVIEW: &str = "No source file found to review.";

/// Code reviewer node.
#[derive(Debug, Clone, Default)]
pub struct SeniorDevAgent {
    config: ReviewConfig,
}

impl SeniorDevAgent {
    pub fn new(config: &ReviewConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    #[instrument(skip_all, fields(node = "senior_dev"))]
    pub fn run<L: LlmClient + ?Sized>(&self, llm: &L, state: &ReviewState) -> StateUpdate {
        let Some(artifact) = state.artifact.as_ref() else {
            info!("no artifact from security scan, skipping review");
            return StateUpdate::message(NOTHING_TO_REVIEW);
        };

        let review = render_senior_dev(artifact, self.config.max_source_bytes).and_then(|system| {
            llm.complete(&CompletionRequest {
                system,
                user: format!("Please review my latest push to {}.", state.repo_url),
            })
        });

        match review {
            Ok(text) => {
                info!(filename = %artifact.filename, chars = text.len(), "review written");
                StateUpdate::message(text.trim().to_string())
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "review LLM call failed");
                StateUpdate::message(format!("Review unavailable: {err:#}"))
            }
        }
    }
}
