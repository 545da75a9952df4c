//! Client side of the workflow HTTP API.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use workplace::core::state::{ReviewState, SetupState};

/// The two workflow calls the session makes.
pub trait WorkplaceApi {
    fn start_job(&self, prompt: &str) -> Result<SetupState>;
    fn review_code(&self, repo_url: &str) -> Result<ReviewState>;
}

pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .with_context(|| format!("connect to {url}"))?;
        decode(response).with_context(|| format!("POST {url}"))
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().context("read response body")?;
    if !status.is_success() {
        bail!("server returned {}: {}", status.as_u16(), text.trim());
    }
    serde_json::from_str(&text).context("decode response body")
}

impl WorkplaceApi for HttpApi {
    fn start_job(&self, prompt: &str) -> Result<SetupState> {
        self.post("/agent/start_job", serde_json::json!({ "prompt": prompt }))
    }

    fn review_code(&self, repo_url: &str) -> Result<ReviewState> {
        self.post("/agent/review_code", serde_json::json!({ "repo_url": repo_url }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let api = HttpApi::new("http://127.0.0.1:8000/", Duration::from_secs(1)).expect("client");
        assert_eq!(api.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn review_state_decodes_without_artifact() {
        let state: ReviewState = serde_json::from_str(
            r#"{"repo_url":"alice/demo","messages":["Security check passed."],"security_status":"clean"}"#,
        )
        .expect("decode");
        assert!(state.artifact.is_none());
        assert_eq!(state.last_message(), Some("Security check passed."));
    }
}
