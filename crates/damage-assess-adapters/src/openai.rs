//! HTTP chat-completion adapter implementing the completion port.

use std::time::Duration;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use damage_assess_core::ports::{CompletionRequest, CompletionService};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Connection settings for the chat-completion endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    /// Chat-completions URL.
    pub endpoint: String,
    /// Model name sent with every request.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Upper bound on response tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            max_tokens: 1000,
            temperature: 0.3,
        }
    }
}

/// Blocking client for an OpenAI-compatible chat-completions API.
pub struct OpenAiCompletionService {
    http: reqwest::blocking::Client,
    api_key: String,
    config: CompletionConfig,
}

impl std::fmt::Debug for OpenAiCompletionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompletionService")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompletionService {
    /// Creates a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: CompletionConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("damage-assess/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            config,
        })
    }

    /// Creates a client when the configured API key variable is set.
    ///
    /// Returns `None` when the key is missing or empty, which leaves vision
    /// analysis and AI pricing unavailable.
    #[must_use]
    pub fn from_env(config: &CompletionConfig) -> Option<Self> {
        let key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        let Some(key) = key else {
            debug!("{} not set; completion service disabled", config.api_key_env);
            return None;
        };

        match Self::new(key, config.clone()) {
            Ok(service) => Some(service),
            Err(e) => {
                warn!("Completion service unavailable: {e:#}");
                None
            }
        }
    }

    fn body(&self, request: &CompletionRequest) -> Value {
        let content = request.image.as_ref().map_or_else(
            || Value::String(request.instruction.clone()),
            |image| {
                let url = format!("data:{};base64,{}", image.mime_type, STANDARD.encode(&image.data));
                json!([
                    { "type": "text", "text": request.instruction },
                    { "type": "image_url", "image_url": { "url": url } },
                ])
            },
        );

        json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": content }],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

impl CompletionService for OpenAiCompletionService {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        debug!(
            "Completion request to {} (image: {})",
            self.config.model,
            request.image.is_some()
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.body(request))
            .send()
            .with_context(|| format!("Completion request to {} failed", self.config.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Completion request failed with status: {status}");
        }

        let parsed: ChatResponse = response
            .json()
            .context("Failed to decode completion response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("Completion response had no content")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use damage_assess_core::ports::ImagePayload;

    fn service() -> OpenAiCompletionService {
        OpenAiCompletionService::new("test-key", CompletionConfig::default())
            .unwrap_or_else(|e| panic!("client should build: {e}"))
    }

    #[test]
    fn test_text_request_body() {
        let body = service().body(&CompletionRequest::text("Estimate the cost"));
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 1000);
        let temperature = body["temperature"].as_f64().unwrap_or_default();
        assert!((temperature - 0.3).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Estimate the cost");
    }

    #[test]
    fn test_image_request_body_uses_data_url() {
        let request = CompletionRequest::with_image(
            "Describe the damage",
            ImagePayload {
                mime_type: "image/png",
                data: vec![1, 2, 3],
            },
        );
        let body = service().body(&request);
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["text"], "Describe the damage");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,AQID");
    }

    #[test]
    fn test_missing_key_disables_service() {
        let config = CompletionConfig {
            api_key_env: "DAMAGE_ASSESS_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..CompletionConfig::default()
        };
        assert!(OpenAiCompletionService::from_env(&config).is_none());
    }

    #[test]
    fn test_response_content_decoding() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"{\"total_cost\": 5000}"}}]}"#;
        let parsed: ChatResponse =
            serde_json::from_str(raw).unwrap_or_else(|e| panic!("should decode: {e}"));
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("{\"total_cost\": 5000}")
        );
    }
}
