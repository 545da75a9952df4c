//! The setup and review graphs.
//!
//! [`Workflows`] is built once per process. Each `run_*` call constructs a
//! fresh initial state, walks the static routing table, merges every node's
//! update into a new state value and returns the final state together with
//! the visited path.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::agents::devops::DevopsAgent;
use crate::agents::manager::ManagerAgent;
use crate::agents::security::SecurityAgent;
use crate::agents::senior_dev::SeniorDevAgent;
use crate::core::routing::{Next, ReviewNode, SetupNode};
use crate::core::state::{ReviewState, SetupState};
use crate::io::config::{Secrets, WorkplaceConfig};
use crate::io::llm::{GeminiClient, LlmClient};
use crate::io::source_host::{GitHubClient, SourceHost};

/// Final state of a workflow invocation and the nodes it visited, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRun<S, N> {
    pub state: S,
    pub path: Vec<N>,
}

/// Both compiled workflows with their shared collaborators.
#[derive(Clone)]
pub struct Workflows {
    llm: Arc<dyn LlmClient>,
    host: Arc<dyn SourceHost>,
    manager: ManagerAgent,
    devops: DevopsAgent,
    security: SecurityAgent,
    senior_dev: SeniorDevAgent,
}

impl Workflows {
    pub fn new(
        config: &WorkplaceConfig,
        llm: Arc<dyn LlmClient>,
        host: Arc<dyn SourceHost>,
    ) -> Self {
        Self {
            llm,
            host,
            manager: ManagerAgent::new(),
            devops: DevopsAgent::new(&config.provision),
            security: SecurityAgent::new(&config.scan),
            senior_dev: SeniorDevAgent::new(&config.review),
        }
    }

    /// Build with the hosted LLM and GitHub clients.
    pub fn from_config(config: &WorkplaceConfig, secrets: &Secrets) -> Result<Self> {
        let llm = GeminiClient::new(&config.llm, secrets.llm_api_key.clone())?;
        let host = GitHubClient::new(&config.source_host, secrets.source_host_token.clone())
            .context("build source host client")?;
        Ok(Self::new(config, Arc::new(llm), Arc::new(host)))
    }

    /// Manager → DevOps.
    #[instrument(skip_all, fields(workflow = "setup"))]
    pub fn run_setup(&self, prompt: &str) -> WorkflowRun<SetupState, SetupNode> {
        let mut state = SetupState::new(prompt);
        let mut path = Vec::new();
        let mut next = Next::Node(SetupNode::ENTRY);

        while let Next::Node(node) = next {
            debug_assert!(!path.contains(&node), "setup node {node:?} visited twice");
            debug!(?node, "running node");
            let update = match node {
                SetupNode::Manager => self.manager.run(&*self.llm, &state),
                SetupNode::Devops => self.devops.run(&*self.host, &state),
            };
            state = state.merge(update);
            path.push(node);
            next = node.next();
        }

        info!(?path, "setup workflow finished");
        WorkflowRun { state, path }
    }

    /// Security → (clean) SeniorDev, or Security → End when blocked.
    #[instrument(skip_all, fields(workflow = "review"))]
    pub fn run_review(&self, repo_url: &str) -> WorkflowRun<ReviewState, ReviewNode> {
        let mut state = ReviewState::new(repo_url);
        let mut path = Vec::new();
        let mut next = Next::Node(ReviewNode::ENTRY);

        while let Next::Node(node) = next {
            debug_assert!(!path.contains(&node), "review node {node:?} visited twice");
            debug!(?node, "running node");
            let update = match node {
                ReviewNode::Security => self.security.run(&*self.host, &state),
                ReviewNode::SeniorDev => self.senior_dev.run(&*self.llm, &state),
            };
            state = state.merge(update);
            path.push(node);
            next = node.next(state.security_status);
        }

        // The fetched source never outlives the run.
        state.artifact = None;
        info!(?path, status = %state.security_status, "review workflow finished");
        WorkflowRun { state, path }
    }
}
