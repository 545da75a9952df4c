//! Manager agent: turns a job request into a sprint plan.

use tracing::{info, instrument, warn};

use crate::core::plan::parse_sprint_plan;
use crate::core::skill::SkillTier;
use crate::core::state::{SetupState, StateUpdate};
use crate::core::types::SprintPlan;
use crate::io::llm::{CompletionRequest, LlmClient};
use crate::io::prompt::render_manager;

/// Result of a planning attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    pub plan: SprintPlan,
    pub tier: SkillTier,
    /// True when the fixed fallback plan was substituted.
    pub fell_back: bool,
}

/// Plan generator. Always yields a valid plan.
#[derive(Debug, Clone, Default)]
pub struct ManagerAgent;

impl ManagerAgent {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip_all, fields(node = "manager"))]
    pub fn plan<L: LlmClient + ?Sized>(&self, llm: &L, request: &str) -> PlanOutcome {
        let tier = SkillTier::detect(request);
        info!(tier = tier.as_str(), "planning sprint");

        let raw = render_manager(tier).and_then(|system| {
            llm.complete(&CompletionRequest {
                system,
                user: request.to_string(),
            })
        });

        let raw = match raw {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "manager LLM call failed, using fallback plan");
                return fallback(tier);
            }
        };

        match parse_sprint_plan(&raw) {
            Ok(plan) => {
                info!(
                    project_name = %plan.project_name,
                    tickets = plan.tickets.len(),
                    starter_files = plan.starter_files.len(),
                    "sprint planned"
                );
                PlanOutcome {
                    plan,
                    tier,
                    fell_back: false,
                }
            }
            Err(err) => {
                warn!(error = %err, "manager output unparseable, using fallback plan");
                fallback(tier)
            }
        }
    }

    /// Plan from the first message and contribute it as canonical JSON.
    pub fn run<L: LlmClient + ?Sized>(&self, llm: &L, state: &SetupState) -> StateUpdate {
        let outcome = self.plan(llm, state.request());
        StateUpdate::message(plan_message(&outcome.plan))
    }
}

fn fallback(tier: SkillTier) -> PlanOutcome {
    PlanOutcome {
        plan: SprintPlan::fallback(),
        tier,
        fell_back: true,
    }
}

const FALLBACK_PLAN_JSON: &str = r#"{"project_name":"backup_project","tickets":[{"id":"0","title":"Error","body":"AI failed to generate."}]}"#;

fn plan_message(plan: &SprintPlan) -> String {
    serde_json::to_string(plan).unwrap_or_else(|err| {
        warn!(error = %err, "failed to serialize plan");
        FALLBACK_PLAN_JSON.to_string()
    })
}
