//! Operator CLI for the Shadow Workplace workflows.
//!
//! Runs single agents or whole workflows against the hosted collaborators
//! without going through the HTTP server. Results are printed as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use workplace::agents::manager::ManagerAgent;
use workplace::agents::security::SecurityAgent;
use workplace::core::types::SecurityStatus;
use workplace::exit_codes;
use workplace::io::config::{
    DEFAULT_CONFIG_PATH, LLM_API_KEY_ENV, SOURCE_HOST_TOKEN_ENV, Secrets, WorkplaceConfig,
    load_config, write_config,
};
use workplace::io::llm::GeminiClient;
use workplace::io::source_host::GitHubClient;
use workplace::logging;
use workplace::workflow::Workflows;

#[derive(Parser)]
#[command(
    name = "workplace",
    version,
    about = "Run Shadow Workplace agents and workflows from the terminal"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report whether the LLM key and source-host token are set.
    CheckEnv,
    /// Write the default config file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Run the manager agent alone and print the sprint plan.
    Plan { prompt: String },
    /// Run the setup workflow (manager → devops).
    Setup { prompt: String },
    /// Run the security agent alone against a repository.
    Scan { repo_url: String },
    /// Run the review workflow (security → senior dev).
    Review { repo_url: String },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::CheckEnv => cmd_check_env(),
        Command::InitConfig { force } => cmd_init_config(&cli.config, force),
        Command::Plan { prompt } => cmd_plan(&cli.config, &prompt),
        Command::Setup { prompt } => cmd_setup(&cli.config, &prompt),
        Command::Scan { repo_url } => cmd_scan(&cli.config, &repo_url),
        Command::Review { repo_url } => cmd_review(&cli.config, &repo_url),
    }
}

fn cmd_check_env() -> Result<i32> {
    let secrets = Secrets::from_env();
    println!("{LLM_API_KEY_ENV}: {}", presence(secrets.llm_api_key.is_some()));
    println!(
        "{SOURCE_HOST_TOKEN_ENV}: {}",
        presence(secrets.source_host_token.is_some())
    );
    Ok(exit_codes::OK)
}

fn presence(found: bool) -> &'static str {
    if found { "found" } else { "MISSING" }
}

fn cmd_init_config(path: &Path, force: bool) -> Result<i32> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &WorkplaceConfig::default())?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_plan(config_path: &Path, prompt: &str) -> Result<i32> {
    let (cfg, secrets) = load(config_path)?;
    let llm = GeminiClient::new(&cfg.llm, secrets.llm_api_key)?;
    let outcome = ManagerAgent::new().plan(&llm, prompt);
    if outcome.fell_back {
        eprintln!("warning: model output unusable, printed the fallback plan");
    }
    print_json(&outcome.plan)?;
    Ok(exit_codes::OK)
}

fn cmd_setup(config_path: &Path, prompt: &str) -> Result<i32> {
    let (cfg, secrets) = load(config_path)?;
    let run = Workflows::from_config(&cfg, &secrets)?.run_setup(prompt);
    print_json(&run.state)?;
    Ok(exit_codes::OK)
}

#[derive(Serialize)]
struct ScanSummary<'a> {
    repo_url: &'a str,
    security_status: SecurityStatus,
    message: &'a str,
    filename: Option<&'a str>,
}

fn cmd_scan(config_path: &Path, repo_url: &str) -> Result<i32> {
    let (cfg, secrets) = load(config_path)?;
    let host = GitHubClient::new(&cfg.source_host, secrets.source_host_token)?;
    let report = SecurityAgent::new(&cfg.scan).scan(&host, repo_url);
    print_json(&ScanSummary {
        repo_url,
        security_status: report.verdict.status,
        message: &report.verdict.message,
        filename: report.artifact.as_ref().map(|a| a.filename.as_str()),
    })?;
    Ok(status_code(report.verdict.status))
}

fn cmd_review(config_path: &Path, repo_url: &str) -> Result<i32> {
    let (cfg, secrets) = load(config_path)?;
    let run = Workflows::from_config(&cfg, &secrets)?.run_review(repo_url);
    print_json(&run.state)?;
    Ok(status_code(run.state.security_status))
}

fn load(config_path: &Path) -> Result<(WorkplaceConfig, Secrets)> {
    let cfg = load_config(config_path)?;
    let secrets = Secrets::from_env();
    secrets.log_presence();
    Ok((cfg, secrets))
}

fn status_code(status: SecurityStatus) -> i32 {
    match status {
        SecurityStatus::Clean => exit_codes::OK,
        SecurityStatus::Blocked => exit_codes::BLOCKED,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scan() {
        let cli = Cli::parse_from(["workplace", "scan", "https://github.com/alice/demo"]);
        assert!(matches!(
            cli.command,
            Command::Scan { ref repo_url } if repo_url == "https://github.com/alice/demo"
        ));
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn parse_init_config_force_with_custom_path() {
        let cli = Cli::parse_from(["workplace", "init-config", "--force", "--config", "x.toml"]);
        assert!(matches!(cli.command, Command::InitConfig { force: true }));
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }

    #[test]
    fn blocked_maps_to_blocked_exit_code() {
        assert_eq!(status_code(SecurityStatus::Blocked), exit_codes::BLOCKED);
        assert_eq!(status_code(SecurityStatus::Clean), exit_codes::OK);
    }
}
