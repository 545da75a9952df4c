//! LLM client abstraction.
//!
//! The [`LlmClient`] trait decouples workflow nodes from the model vendor
//! (currently the Google Generative Language API). Tests use scripted clients
//! that return predetermined completions without touching the network.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::io::config::{LLM_API_KEY_ENV, LlmConfig};

/// A system instruction plus one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

/// Abstraction over text-completion backends.
pub trait LlmClient: Send + Sync {
    /// Return the model's text completion for `request`.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Client for `models/{model}:generateContent`.
pub struct GeminiClient {
    http: Client,
    config: LlmConfig,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Build the client. A missing key is not an error until the first call.
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("build llm http client")?;
        Ok(Self {
            http,
            config: config.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl LlmClient for GeminiClient {
    #[instrument(skip_all, fields(model = %self.config.model))]
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("{LLM_API_KEY_ENV} is not set"))?;

        let body = GenerateRequest::new(request, self.config.temperature);
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .context("send generateContent request")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "generateContent failed");
            bail!("generateContent returned {status}: {}", detail.trim());
        }

        let parsed: GenerateResponse = response
            .json()
            .context("decode generateContent response")?;
        let text = parsed.text()?;
        debug!(chars = text.len(), "completion received");
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateRequest {
    fn new(request: &CompletionRequest, temperature: f64) -> Self {
        Self {
            system_instruction: Content::text(None, &request.system),
            contents: vec![Content::text(Some("user"), &request.user)],
            generation_config: GenerationConfig { temperature },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenate the text parts of the first candidate.
    fn text(&self) -> Result<String> {
        let Some(content) = self.candidates.first().and_then(|c| c.content.as_ref()) else {
            let reason = self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
                .unwrap_or("no candidates returned");
            bail!("model returned no content: {reason}");
        };
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_separates_system_and_user() {
        let body = GenerateRequest::new(
            &CompletionRequest {
                system: "be a manager".to_string(),
                user: "backend intern".to_string(),
            },
            0.7,
        );
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be a manager");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "backend intern");
        assert_eq!(json["generationConfig"]["temperature"], 0.7);
    }

    #[test]
    fn response_text_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.text().expect("text"), "{\"a\":1}");
    }

    #[test]
    fn blocked_prompt_reports_reason() {
        let raw = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).expect("parse");
        let err = parsed.text().unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn missing_key_fails_before_network() {
        let client = GeminiClient::new(&LlmConfig::default(), None).expect("client");
        let err = client
            .complete(&CompletionRequest {
                system: "s".to_string(),
                user: "u".to_string(),
            })
            .unwrap_err();
        assert!(err.to_string().contains(LLM_API_KEY_ENV));
    }
}
