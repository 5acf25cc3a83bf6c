//! Azure OpenAI chat completion client.
//!
//! Speaks the Azure OpenAI deployments API: the deployment name is part of
//! the URL, the API key travels in an `api-key` header, and request/response
//! bodies use the standard chat-completions shape.
//!
//! # Example
//!
//! ```ignore
//! let config = ModelConfig {
//!     providers: vec!["azure".to_string()],
//!     endpoint: Some("https://myresource.openai.azure.com".to_string()),
//!     deployment: Some("gpt-4o".to_string()),
//!     ..Default::default()
//! };
//! let client = AzureCompletion::from_config(&config)?;
//! let reply = client.acall(messages, None).await?;
//! ```

use async_trait::async_trait;
use serde_json::Value;

use crate::llms::base::{ChatModel, LLMMessage, ModelConfig};
use crate::llms::error::LlmError;

/// Env var consulted when the config carries no API key.
pub const AZURE_API_KEY_VAR: &str = "AZURE_API_KEY";
/// Env var consulted when the config carries no endpoint.
pub const AZURE_ENDPOINT_VAR: &str = "AZURE_ENDPOINT";
/// Env var consulted when the config carries no API version.
pub const AZURE_API_VERSION_VAR: &str = "AZURE_API_VERSION";

const DEFAULT_API_VERSION: &str = "2024-02-01";
const DEFAULT_DEPLOYMENT: &str = "gpt-4o";

// ---------------------------------------------------------------------------
// AzureCompletion client
// ---------------------------------------------------------------------------

/// Azure OpenAI chat completion client.
///
/// Credentials and the endpoint are resolved at construction time; a missing
/// key or endpoint fails [`AzureCompletion::from_config`] rather than the
/// first call.
#[derive(Debug, Clone)]
pub struct AzureCompletion {
    model: String,
    api_key: String,
    endpoint: String,
    api_version: String,
    temperature: Option<f64>,
    timeout_secs: u64,
    max_retries: u32,
}

impl AzureCompletion {
    /// Build a client from an agent's model block.
    ///
    /// Explicit config values win over environment variables. The deployment
    /// name falls back to `model`, then to a default.
    pub fn from_config(config: &ModelConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(AZURE_API_KEY_VAR).ok())
            .ok_or(LlmError::MissingCredential {
                provider: "azure",
                var: AZURE_API_KEY_VAR,
            })?;
        let endpoint = config
            .endpoint
            .clone()
            .or_else(|| std::env::var(AZURE_ENDPOINT_VAR).ok())
            .ok_or(LlmError::MissingEndpoint {
                provider: "azure",
                var: AZURE_ENDPOINT_VAR,
            })?;
        let api_version = config
            .api_version
            .clone()
            .or_else(|| std::env::var(AZURE_API_VERSION_VAR).ok())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        let model = config
            .deployment
            .clone()
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string());

        Ok(Self {
            model,
            api_key,
            endpoint,
            api_version,
            temperature: config.temperature,
            timeout_secs: 120,
            max_retries: 2,
        })
    }

    /// Full chat-completions URL for the configured deployment.
    pub fn api_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.model,
            self.api_version
        )
    }

    fn build_request_body(&self, messages: &[LLMMessage], tools: Option<&[Value]>) -> Value {
        let mut body = serde_json::json!({
            "messages": messages,
        });

        if let Some(temp) = self.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(tools) = tools {
            if !tools.is_empty() {
                body["tools"] = Value::Array(tools.to_vec());
            }
        }

        body
    }

    fn parse_response(&self, response: &Value) -> Result<Value, LlmError> {
        let choices = response
            .get("choices")
            .and_then(|c| c.as_array())
            .ok_or_else(|| LlmError::MalformedResponse {
                provider: "azure",
                message: "no choices array".to_string(),
            })?;

        if choices.is_empty() {
            return Err(LlmError::MalformedResponse {
                provider: "azure",
                message: "empty choices array".to_string(),
            });
        }

        let message = choices[0]
            .get("message")
            .ok_or_else(|| LlmError::MalformedResponse {
                provider: "azure",
                message: "no message in first choice".to_string(),
            })?;

        // Tool calls pass through as an assistant message object.
        if let Some(tool_calls) = message.get("tool_calls") {
            if tool_calls.as_array().map_or(false, |a| !a.is_empty()) {
                return Ok(serde_json::json!({
                    "role": "assistant",
                    "content": message.get("content").cloned().unwrap_or(Value::Null),
                    "tool_calls": tool_calls,
                }));
            }
        }

        let content = message
            .get("content")
            .and_then(|c| c.as_str())
            .unwrap_or("");
        Ok(Value::String(content.to_string()))
    }
}

#[async_trait]
impl ChatModel for AzureCompletion {
    fn provider(&self) -> &str {
        "azure"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn acall(
        &self,
        messages: Vec<LLMMessage>,
        tools: Option<Vec<Value>>,
    ) -> Result<Value, LlmError> {
        log::debug!(
            "AzureCompletion.acall: model={}, messages={}, tools={:?}",
            self.model,
            messages.len(),
            tools.as_ref().map(|t| t.len()),
        );

        let body = self.build_request_body(&messages, tools.as_deref());
        let url = self.api_url();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()?;

        // Retry loop with exponential backoff; 429 and 5xx are retryable.
        let mut last_error: Option<LlmError> = None;
        let mut retry_delay = std::time::Duration::from_secs(1);

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                log::warn!("Azure API retry attempt {} after {:?}", attempt, retry_delay);
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let response = match client
                .post(&url)
                .header("api-key", self.api_key.as_str())
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                last_error = Some(LlmError::Api {
                    provider: "azure",
                    status: status.as_u16(),
                    message: "rate limited".to_string(),
                });
                continue;
            }

            if status.is_server_error() {
                last_error = Some(LlmError::Api {
                    provider: "azure",
                    status: status.as_u16(),
                    message: "server error".to_string(),
                });
                continue;
            }

            let response_text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            if status.is_client_error() {
                return Err(LlmError::Api {
                    provider: "azure",
                    status: status.as_u16(),
                    message: response_text,
                });
            }

            let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
                LlmError::MalformedResponse {
                    provider: "azure",
                    message: format!(
                        "{} - body: {}",
                        e,
                        &response_text[..response_text.len().min(500)]
                    ),
                }
            })?;

            if let Some(error) = response_json.get("error") {
                let msg = error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown API error");
                return Err(LlmError::Api {
                    provider: "azure",
                    status: status.as_u16(),
                    message: msg.to_string(),
                });
            }

            return self.parse_response(&response_json);
        }

        Err(last_error.unwrap_or(LlmError::RetriesExhausted {
            provider: "azure",
            retries: self.max_retries,
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
