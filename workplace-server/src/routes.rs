//! HTTP route handlers for the workflow API.

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use workplace::core::state::{ReviewState, SetupState, StateUpdate};

use crate::state::AppState;

const START_JOB_ROUTE: &str = "/agent/start_job";
const REVIEW_CODE_ROUTE: &str = "/agent/review_code";

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route(START_JOB_ROUTE, post(start_job))
        .route(REVIEW_CODE_ROUTE, post(review_code))
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexResponse {
    pub status: String,
    pub routes: Vec<String>,
}

/// GET / - liveness and route listing.
async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        status: "Shadow Workplace is Online".to_string(),
        routes: vec![START_JOB_ROUTE.to_string(), REVIEW_CODE_ROUTE.to_string()],
    })
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct StartJobRequest {
    pub prompt: String,
}

/// POST /agent/start_job - run the setup workflow.
async fn start_job(
    State(state): State<AppState>,
    Json(req): Json<StartJobRequest>,
) -> Json<SetupState> {
    info!(prompt_chars = req.prompt.len(), "start_job");
    let workflows = state.workflows.clone();
    let prompt = req.prompt.clone();
    let joined = tokio::task::spawn_blocking(move || workflows.run_setup(&prompt)).await;

    match joined {
        Ok(run) => Json(run.state),
        Err(err) => {
            error!(error = %err, "setup workflow task failed");
            Json(SetupState::new(&req.prompt).merge(unexpected(&err)))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewCodeRequest {
    pub repo_url: String,
}

/// POST /agent/review_code - run the review workflow.
///
/// Malformed locators are not rejected here; the security node turns them
/// into a blocked verdict like any other expected failure.
async fn review_code(
    State(state): State<AppState>,
    Json(req): Json<ReviewCodeRequest>,
) -> Json<ReviewState> {
    info!(repo_url = %req.repo_url, "review_code");
    let workflows = state.workflows.clone();
    let repo_url = req.repo_url.clone();
    let joined = tokio::task::spawn_blocking(move || workflows.run_review(&repo_url)).await;

    match joined {
        Ok(run) => Json(run.state),
        Err(err) => {
            error!(error = %err, "review workflow task failed");
            Json(ReviewState::new(&req.repo_url).merge(unexpected(&err)))
        }
    }
}

fn unexpected(err: &tokio::task::JoinError) -> StateUpdate {
    StateUpdate::message(format!("Unexpected error: {err}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use workplace::core::types::SecurityStatus;
    use workplace::io::config::WorkplaceConfig;
    use workplace::io::llm::{CompletionRequest, LlmClient};
    use workplace::io::source_host::SourceHost;
    use workplace::test_support::{FakeSourceHost, ScriptedLlm};
    use workplace::workflow::Workflows;

    use super::*;

    const PLAN: &str = r#"{"project_name":"todo_api","tickets":[{"id":"1","title":"Models","body":"Define Todo."},{"id":"2","title":"Routes","body":"CRUD."}]}"#;

    struct PanickingLlm;

    impl LlmClient for PanickingLlm {
        fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            panic!("model client exploded");
        }
    }

    fn app_state(llm: Arc<dyn LlmClient>, host: FakeSourceHost) -> AppState {
        let host: Arc<dyn SourceHost> = Arc::new(host);
        AppState::new(Workflows::new(&WorkplaceConfig::default(), llm, host))
    }

    #[tokio::test]
    async fn index_lists_routes() {
        let Json(body) = index().await;
        assert_eq!(body.status, "Shadow Workplace is Online");
        assert_eq!(body.routes, vec![START_JOB_ROUTE, REVIEW_CODE_ROUTE]);
    }

    #[tokio::test]
    async fn start_job_returns_offer_as_last_message() {
        let state = app_state(
            Arc::new(ScriptedLlm::new(vec![Ok(PLAN.to_string())])),
            FakeSourceHost::with_files(&[]),
        );
        let Json(body) = start_job(
            State(state),
            Json(StartJobRequest {
                prompt: "Junior backend dev".to_string(),
            }),
        )
        .await;
        assert_eq!(body.messages.len(), 3);
        assert_eq!(
            body.last_message(),
            Some("DevOps Action: Created GitHub Repo 'todo_api' with 2 issues.")
        );
    }

    #[tokio::test]
    async fn review_code_blocks_leaked_key() {
        let state = app_state(
            Arc::new(ScriptedLlm::new(Vec::new())),
            FakeSourceHost::with_files(&[("main.py", "API_KEY = \"AIzaSyABC\"\n")]),
        );
        let Json(body) = review_code(
            State(state),
            Json(ReviewCodeRequest {
                repo_url: "https://github.com/alice/demo".to_string(),
            }),
        )
        .await;
        assert_eq!(body.security_status, SecurityStatus::Blocked);
        assert_eq!(body.messages.len(), 1);
        assert!(body.messages[0].contains("main.py"));

        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["security_status"], "blocked");
        assert_eq!(json["repo_url"], "https://github.com/alice/demo");
    }

    #[tokio::test]
    async fn review_code_blocks_malformed_locator_with_state() {
        let host = Arc::new(FakeSourceHost::with_files(&[("main.py", "print('hi')\n")]));
        let llm = Arc::new(ScriptedLlm::new(Vec::new()));
        let state = AppState::new(Workflows::new(
            &WorkplaceConfig::default(),
            llm.clone(),
            host.clone(),
        ));
        let Json(body) = review_code(
            State(state),
            Json(ReviewCodeRequest {
                repo_url: "https://github.com/alice".to_string(),
            }),
        )
        .await;
        assert_eq!(body.repo_url, "https://github.com/alice");
        assert_eq!(body.security_status, SecurityStatus::Blocked);
        assert_eq!(body.messages.len(), 1);
        assert!(
            body.messages[0].starts_with("SECURITY BLOCK: Malformed repository locator:")
        );
        assert!(host.listed().is_empty());
        assert!(llm.requests().is_empty());

        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["security_status"], "blocked");
    }

    #[tokio::test]
    async fn panicking_workflow_reports_unexpected_error() {
        let state = app_state(Arc::new(PanickingLlm), FakeSourceHost::with_files(&[]));
        let Json(body) = start_job(
            State(state),
            Json(StartJobRequest {
                prompt: "Senior SRE".to_string(),
            }),
        )
        .await;
        assert_eq!(body.messages[0], "Senior SRE");
        assert_eq!(body.messages.len(), 2);
        assert!(body.messages[1].starts_with("Unexpected error:"));
    }
}
