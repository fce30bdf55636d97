/// Client for a llama.cpp-style text completion server.
///
/// The server is treated as a black box: one formatted prompt goes in, generated text
/// comes out. Requests carry an explicit timeout and are never retried; callers decide
/// what to substitute when generation is unavailable.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;
use crate::http::parse_json_response;

#[derive(Clone, Debug)]
pub struct CompletionClientConfig {
    /// Base URL of the completion server, e.g. "http://localhost:8080".
    pub base_url: String,
    pub timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl CompletionClientConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            max_error_body_bytes: 8 * 1024,
        }
    }
}

/// Body of `POST /completion`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub n_predict: u32,
    pub temperature: f32,
    pub top_p: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub content: Option<String>,
    pub model: Option<String>,
    pub tokens_predicted: Option<u64>,
    pub stop: Option<bool>,
}

#[derive(Clone)]
pub struct CompletionClient {
    config: CompletionClientConfig,
    http: reqwest::Client,
}

impl CompletionClient {
    pub fn new(config: CompletionClientConfig) -> Result<Self, CollaboratorError> {
        let http = reqwest::Client::builder()
            .user_agent("doc-assistant/completion")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &CompletionClientConfig {
        &self.config
    }

    /// Run one completion and return the generated text.
    ///
    /// A success status whose body lacks `content` is reported as `Malformed`.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, CollaboratorError> {
        let url = format!("{}/completion", self.config.base_url);
        let resp = self
            .http
            .post(&url)
            .timeout(self.config.timeout)
            .json(request)
            .send()
            .await?;
        let parsed: CompletionResponse =
            parse_json_response(resp, self.config.max_error_body_bytes).await?;
        parsed
            .content
            .ok_or_else(|| CollaboratorError::Malformed("completion response has no content".to_string()))
    }

    /// `GET /health`; any transport or status failure counts as unhealthy.
    pub async fn is_healthy(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);
        match self.http.get(&url).timeout(self.config.timeout).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_trims_trailing_slash() {
        let config = CompletionClientConfig::new("http://localhost:8080/", Duration::from_secs(30));
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn request_serializes_llama_fields() {
        let request = CompletionRequest {
            prompt: "<s>[INST] hi [/INST]".to_string(),
            n_predict: 512,
            temperature: 0.7,
            top_p: 0.9,
            stop: vec!["</s>".to_string(), "[INST]".to_string()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["n_predict"], 512);
        assert_eq!(json["stop"][1], "[INST]");
        assert!(json.get("prompt").is_some());
    }

    #[test]
    fn response_tolerates_missing_optional_fields() {
        let parsed: CompletionResponse = serde_json::from_str(r#"{"content":"Hello"}"#).unwrap();
        assert_eq!(parsed.content.as_deref(), Some("Hello"));
        assert!(parsed.model.is_none());
    }
}
