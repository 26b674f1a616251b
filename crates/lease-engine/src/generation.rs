//! Generation service boundary
//!
//! The pipeline talks to the text-completion service through
//! [`GenerationClient`]. [`OpenAiClient`] implements it for any
//! OpenAI-compatible `/chat/completions` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::error::GenerationError;
use crate::prompts::{Message, MessageRole};

/// Highest sampling temperature the pipeline allows.
///
/// The recoverer depends on a stable output shape, so configured values
/// above this are clamped.
pub const MAX_TEMPERATURE: f32 = 0.3;

/// Completion parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature, at most [`MAX_TEMPERATURE`]
    pub temperature: f32,
}

impl CompletionParams {
    pub fn new(temperature: f32, max_tokens: Option<u32>) -> Self {
        Self {
            max_tokens,
            temperature: clamp_temperature(temperature),
        }
    }
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: Some(4096),
            temperature: MAX_TEMPERATURE,
        }
    }
}

/// Clamp a temperature into `0.0..=MAX_TEMPERATURE`
pub fn clamp_temperature(temperature: f32) -> f32 {
    if temperature.is_nan() || temperature < 0.0 {
        warn!("Invalid temperature {}, using 0.0", temperature);
        return 0.0;
    }
    if temperature > MAX_TEMPERATURE {
        warn!(
            "Temperature {} above maximum {}, clamping",
            temperature, MAX_TEMPERATURE
        );
        return MAX_TEMPERATURE;
    }
    temperature
}

/// Text-completion service used by the pipeline
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Complete a conversation, returning the raw model text
    async fn complete(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<String, GenerationError>;
}

/// OpenAI-compatible API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Base URL (defaults to https://api.openai.com/v1)
    pub base_url: String,
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4-turbo".to_string(),
            timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("OpenAiConfig")
            .field("api_key", &api_key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// OpenAI chat-completions client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::Configuration(
                "API key is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                GenerationError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body(&self, messages: &[Message], params: &CompletionParams) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                };
                json!({ "role": role, "content": msg.content })
            })
            .collect();

        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": clamp_temperature(params.temperature),
        });
        if let Some(max_tokens) = params.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    #[instrument(skip(self, messages, params), fields(model = %self.config.model))]
    async fn complete(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<String, GenerationError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(messages, params))
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationError::Api { status, body });
        }

        let response_json: serde_json::Value =
            response.json().await.map_err(map_transport_error)?;

        let content = extract_content(&response_json).ok_or(GenerationError::EmptyResponse)?;
        debug!("raw output: {}", content);

        Ok(content)
    }
}

fn map_transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Unreachable(e.to_string())
    }
}

/// Pull `choices[0].message.content`, treating blank content as absent
fn extract_content(response: &serde_json::Value) -> Option<String> {
    response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .filter(|content| !content.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient::new(OpenAiConfig {
            api_key: "test-key".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = OpenAiConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4-turbo");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = OpenAiConfig {
            api_key: "sk-abc123".to_string(),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-abc123"));
        assert!(rendered.contains("gpt-4-turbo"));

        let client_rendered = format!("{:?}", client());
        assert!(!client_rendered.contains("test-key"));
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let result = OpenAiClient::new(OpenAiConfig::default());
        assert!(matches!(result, Err(GenerationError::Configuration(_))));
    }

    #[test]
    fn test_temperature_is_clamped() {
        assert_eq!(clamp_temperature(0.7), MAX_TEMPERATURE);
        assert_eq!(clamp_temperature(-1.0), 0.0);
        assert_eq!(clamp_temperature(f32::NAN), 0.0);
        assert_eq!(clamp_temperature(0.1), 0.1);
        assert_eq!(CompletionParams::new(1.5, None).temperature, MAX_TEMPERATURE);
    }

    #[test]
    fn test_request_body() {
        let messages = vec![Message::system("rules"), Message::user("lease")];
        let params = CompletionParams {
            max_tokens: Some(100),
            temperature: 0.9,
        };
        let body = client().request_body(&messages, &params);

        assert_eq!(body["model"], "gpt-4-turbo");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "lease");
        assert_eq!(body["max_tokens"], 100);
        assert!(body["temperature"].as_f64().unwrap() <= f64::from(MAX_TEMPERATURE));
    }

    #[test]
    fn test_extract_content() {
        let ok = json!({"choices": [{"message": {"content": "{\"a\":1}"}}]});
        assert_eq!(extract_content(&ok).as_deref(), Some("{\"a\":1}"));

        let blank = json!({"choices": [{"message": {"content": "   "}}]});
        assert_eq!(extract_content(&blank), None);

        let missing = json!({"choices": []});
        assert_eq!(extract_content(&missing), None);
    }
}
