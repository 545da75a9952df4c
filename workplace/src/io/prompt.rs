//! Prompt rendering for the LLM-backed nodes.

use std::sync::LazyLock;

use anyhow::Result;
use minijinja::{Environment, context};

use crate::core::skill::SkillTier;
use crate::core::types::SourceArtifact;

const MANAGER_TEMPLATE: &str = include_str!("prompts/manager.md");
const SENIOR_DEV_TEMPLATE: &str = include_str!("prompts/senior_dev.md");

/// Template engine wrapper around minijinja.
struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("manager", MANAGER_TEMPLATE)
            .expect("manager template should be valid");
        env.add_template("senior_dev", SENIOR_DEV_TEMPLATE)
            .expect("senior_dev template should be valid");
        Self { env }
    }
}

static ENGINE: LazyLock<PromptEngine> = LazyLock::new(PromptEngine::new);

/// System instruction for the manager node.
pub fn render_manager(tier: SkillTier) -> Result<String> {
    let template = ENGINE.env.get_template("manager")?;
    let rendered = template.render(context! {
        tier => tier.as_str(),
        ticket_count => tier.ticket_count(),
    })?;
    Ok(rendered)
}

/// System instruction for the reviewer, with the source cut to `max_bytes`.
pub fn render_senior_dev(artifact: &SourceArtifact, max_bytes: usize) -> Result<String> {
    let (code, truncated) = truncate_on_char_boundary(&artifact.content, max_bytes);
    let template = ENGINE.env.get_template("senior_dev")?;
    let rendered = template.render(context! {
        filename => &artifact.filename,
        code => code,
        truncated => truncated,
        max_bytes => max_bytes,
    })?;
    Ok(rendered)
}

fn truncate_on_char_boundary(text: &str, max_bytes: usize) -> (&str, bool) {
    if text.len() <= max_bytes {
        return (text, false);
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    (&text[..end], true)
}
