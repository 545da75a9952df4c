//! Workplace configuration stored in `workplace.toml`.
//!
//! Secrets never live in this file. They are read from the environment by
//! [`Secrets::from_env`].

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::scanner::UnscannablePolicy;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "workplace.toml";

/// Environment variable holding the LLM API key.
pub const LLM_API_KEY_ENV: &str = "GOOGLE_API_KEY";
/// Environment variable holding the source-host access token.
pub const SOURCE_HOST_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Workplace configuration (TOML).
///
/// Missing fields default to values that reproduce the hosted setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkplaceConfig {
    pub llm: LlmConfig,
    pub source_host: SourceHostConfig,
    pub provision: ProvisionConfig,
    pub scan: ScanConfig,
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the Generative Language API.
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourceHostConfig {
    /// REST API root.
    pub api_base: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SourceHostConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SourceHostConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Whether the devops node touches the source host.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionMode {
    /// Compose the confirmation only.
    #[default]
    DryRun,
    /// Create the repository, README, starter files and issues.
    Live,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProvisionConfig {
    pub mode: ProvisionMode,
    /// Create provisioned repositories as private.
    pub private: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    /// File name scanned first when present.
    pub preferred_file: String,
    /// File name suffixes treated as scannable source.
    pub source_suffixes: Vec<String>,
    /// Verdict when the repository cannot be listed or fetched.
    pub unscannable: UnscannablePolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            preferred_file: "main.py".to_string(),
            source_suffixes: vec![".py".to_string()],
            unscannable: UnscannablePolicy::Allow,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReviewConfig {
    /// Source beyond this many bytes is cut before it reaches the reviewer.
    pub max_source_bytes: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_source_bytes: 40_000,
        }
    }
}

impl WorkplaceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(anyhow!("llm.model must be non-empty"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(anyhow!("llm.timeout_secs must be > 0"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(anyhow!("llm.temperature must be within 0.0..=2.0"));
        }
        if self.source_host.timeout_secs == 0 {
            return Err(anyhow!("source_host.timeout_secs must be > 0"));
        }
        if self.scan.source_suffixes.is_empty()
            || self.scan.source_suffixes.iter().any(|s| s.trim().is_empty())
        {
            return Err(anyhow!("scan.source_suffixes must be a non-empty array"));
        }
        if self.review.max_source_bytes == 0 {
            return Err(anyhow!("review.max_source_bytes must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `WorkplaceConfig::default()`.
pub fn load_config(path: &Path) -> Result<WorkplaceConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        let cfg = WorkplaceConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: WorkplaceConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &WorkplaceConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

/// Credentials supplied by the environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    pub llm_api_key: Option<String>,
    pub source_host_token: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "<set>"))
            .field(
                "source_host_token",
                &self.source_host_token.as_ref().map(|_| "<set>"),
            )
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            llm_api_key: non_empty_env(LLM_API_KEY_ENV),
            source_host_token: non_empty_env(SOURCE_HOST_TOKEN_ENV),
        }
    }

    /// Warn about missing credentials. Startup continues; calls fail later.
    pub fn log_presence(&self) {
        if self.llm_api_key.is_none() {
            warn!(var = LLM_API_KEY_ENV, "LLM API key is missing from environment");
        } else {
            info!(var = LLM_API_KEY_ENV, "LLM API key found");
        }
        if self.source_host_token.is_none() {
            warn!(
                var = SOURCE_HOST_TOKEN_ENV,
                "source host token is missing from environment"
            );
        } else {
            info!(var = SOURCE_HOST_TOKEN_ENV, "source host token found");
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, WorkplaceConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("workplace.toml");
        let mut cfg = WorkplaceConfig::default();
        cfg.provision.mode = ProvisionMode::Live;
        cfg.scan.unscannable = UnscannablePolicy::Block;
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("workplace.toml");
        fs::write(
            &path,
            "[scan]\nunscannable = \"block\"\n\n[provision]\nmode = \"live\"\n",
        )
        .expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.scan.unscannable, UnscannablePolicy::Block);
        assert_eq!(cfg.scan.preferred_file, "main.py");
        assert_eq!(cfg.provision.mode, ProvisionMode::Live);
        assert_eq!(cfg.llm.model, "gemini-2.5-flash");
    }

    #[test]
    fn source_host_section_has_only_consumed_keys() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("workplace.toml");
        write_config(&path, &WorkplaceConfig::default()).expect("write");
        let written = fs::read_to_string(&path).expect("read");
        assert!(!written.contains("web_base"));

        fs::write(
            &path,
            "[source_host]\napi_base = \"https://ghe.test/api/v3\"\nweb_base = \"https://ghe.test\"\n",
        )
        .expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.source_host.api_base, "https://ghe.test/api/v3");
        assert_eq!(cfg.source_host.timeout_secs, 30);
    }

    #[test]
    fn validate_rejects_empty_suffixes() {
        let mut cfg = WorkplaceConfig::default();
        cfg.scan.source_suffixes.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("source_suffixes"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut cfg = WorkplaceConfig::default();
        cfg.llm.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn secrets_debug_hides_values() {
        let secrets = Secrets {
            llm_api_key: Some("AIzaSecret".to_string()),
            source_host_token: None,
        };
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("AIzaSecret"));
        assert!(rendered.contains("<set>"));
    }
}
