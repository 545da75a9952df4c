//! DevOps agent: provisions the repository described by the sprint plan.

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::core::plan::strip_code_fences;
use crate::core::state::{SetupState, StateUpdate};
use crate::core::types::SprintPlan;
use crate::io::config::{ProvisionConfig, ProvisionMode};
use crate::io::source_host::{NewRepository, SourceHost};

/// Provisioner node.
#[derive(Debug, Clone, Default)]
pub struct DevopsAgent {
    config: ProvisionConfig,
}

impl DevopsAgent {
    pub fn new(config: &ProvisionConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Parse the manager's plan from the last message and provision it.
    #[instrument(skip_all, fields(node = "devops", mode = ?self.config.mode))]
    pub fn run<H: SourceHost + ?Sized>(&self, host: &H, state: &SetupState) -> StateUpdate {
        let message = match state.last_message().map(parse_plan_message) {
            Some(Ok(plan)) => self.provision(host, &plan),
            Some(Err(err)) => {
                format!("DevOps Error: Could not parse Manager's plan. Error: {err}")
            }
            None => "DevOps Error: Could not parse Manager's plan. Error: no plan message"
                .to_string(),
        };
        if message.starts_with("DevOps Error") {
            warn!(%message, "provisioning failed");
        } else {
            info!(%message, "provisioning complete");
        }
        StateUpdate::message(message)
    }

    fn provision<H: SourceHost + ?Sized>(&self, host: &H, plan: &SprintPlan) -> String {
        let confirmation = format!(
            "DevOps Action: Created GitHub Repo '{}' with {} issues",
            plan.project_name,
            plan.tickets.len()
        );
        match self.config.mode {
            ProvisionMode::DryRun => format!("{confirmation}."),
            ProvisionMode::Live => match self.provision_live(host, plan) {
                Ok(html_url) => format!("{confirmation}: {html_url}"),
                Err(err) => format!(
                    "DevOps Error: Provisioning failed for '{}'. Error: {err:#}",
                    plan.project_name
                ),
            },
        }
    }

    /// Create the repository, commit README and starter files, open issues.
    fn provision_live<H: SourceHost + ?Sized>(
        &self,
        host: &H,
        plan: &SprintPlan,
    ) -> Result<String> {
        let created = host
            .create_repository(&NewRepository {
                name: repo_slug(&plan.project_name),
                description: format!("Shadow Workplace sprint: {}", plan.project_name),
                private: self.config.private,
            })
            .context("create repository")?;
        let repo = &created.locator;

        host.put_file(repo, "README.md", &render_readme(plan), "Add sprint README")
            .context("commit README.md")?;

        for file in &plan.starter_files {
            if !is_safe_path(&file.name) {
                warn!(name = %file.name, "skipping starter file with unsafe path");
                continue;
            }
            host.put_file(
                repo,
                &file.name,
                &file.content,
                &format!("Add starter file {}", file.name),
            )
            .with_context(|| format!("commit {}", file.name))?;
        }

        for ticket in &plan.tickets {
            host.create_issue(repo, &ticket.title, &ticket.body)
                .with_context(|| format!("open issue {}", ticket.id))?;
        }

        Ok(created.html_url)
    }
}

fn parse_plan_message(message: &str) -> Result<SprintPlan, serde_json::Error> {
    serde_json::from_str(&strip_code_fences(message))
}

/// Lowercase ASCII alphanumerics; every other run becomes a single `-`.
pub fn repo_slug(project_name: &str) -> String {
    let mut slug = String::with_capacity(project_name.len());
    for ch in project_name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "shadow-project".to_string()
    } else {
        slug.to_string()
    }
}

fn is_safe_path(name: &str) -> bool {
    !name.trim().is_empty()
        && !name.starts_with('/')
        && name.split('/').all(|seg| !seg.is_empty() && seg != "..")
}

/// Mission board committed as the repository README.
pub fn render_readme(plan: &SprintPlan) -> String {
    let mut out = format!(
        "# {}\n\nYour sprint backlog. Each ticket is also an open issue.\n\n",
        plan.project_name
    );
    for ticket in &plan.tickets {
        out.push_str(&format!("## [{}] {}\n\n{}\n\n", ticket.id, ticket.title, ticket.body));
    }
    out.push_str("Push your work to `main`, then submit it for review.\n");
    out
}
