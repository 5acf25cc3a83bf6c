//! OpenRouter chat completion client.
//!
//! OpenRouter exposes an OpenAI-compatible chat-completions API at
//! `https://openrouter.ai/api/v1` with Bearer authentication; model ids are
//! prefixed with the upstream provider (`openai/gpt-4o-mini`,
//! `anthropic/claude-3.5-sonnet`).

use async_trait::async_trait;
use serde_json::Value;

use crate::llms::base::{ChatModel, LLMMessage, ModelConfig};
use crate::llms::error::LlmError;

/// Env var consulted when the config carries no API key.
pub const OPENROUTER_API_KEY_VAR: &str = "OPENROUTER_API_KEY";

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

// ---------------------------------------------------------------------------
// OpenRouterCompletion client
// ---------------------------------------------------------------------------

/// OpenRouter chat completion client.
#[derive(Debug, Clone)]
pub struct OpenRouterCompletion {
    model: String,
    api_key: String,
    base_url: String,
    temperature: Option<f64>,
    timeout_secs: u64,
    max_retries: u32,
}

impl OpenRouterCompletion {
    /// Build a client from an agent's model block.
    ///
    /// Explicit config values win over environment variables.
    pub fn from_config(config: &ModelConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(OPENROUTER_API_KEY_VAR).ok())
            .ok_or(LlmError::MissingCredential {
                provider: "openrouter",
                var: OPENROUTER_API_KEY_VAR,
            })?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            model,
            api_key,
            base_url,
            temperature: config.temperature,
            timeout_secs: 120,
            max_retries: 2,
        })
    }

    /// Full chat-completions URL.
    pub fn api_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_request_body(&self, messages: &[LLMMessage], tools: Option<&[Value]>) -> Value {
        let mut body = serde_json::json!({
            "model": self.model,
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
                provider: "openrouter",
                message: "no choices array".to_string(),
            })?;

        if choices.is_empty() {
            return Err(LlmError::MalformedResponse {
                provider: "openrouter",
                message: "empty choices array".to_string(),
            });
        }

        let message = choices[0]
            .get("message")
            .ok_or_else(|| LlmError::MalformedResponse {
                provider: "openrouter",
                message: "no message in first choice".to_string(),
            })?;

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
impl ChatModel for OpenRouterCompletion {
    fn provider(&self) -> &str {
        "openrouter"
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
            "OpenRouterCompletion.acall: model={}, messages={}, tools={:?}",
            self.model,
            messages.len(),
            tools.as_ref().map(|t| t.len()),
        );

        let body = self.build_request_body(&messages, tools.as_deref());
        let url = self.api_url();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()?;

        let mut last_error: Option<LlmError> = None;
        let mut retry_delay = std::time::Duration::from_secs(1);

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                log::warn!(
                    "OpenRouter API retry attempt {} after {:?}",
                    attempt,
                    retry_delay
                );
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let response = match client
                .post(&url)
                .bearer_auth(&self.api_key)
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
                    provider: "openrouter",
                    status: status.as_u16(),
                    message: "rate limited".to_string(),
                });
                continue;
            }

            if status.is_server_error() {
                last_error = Some(LlmError::Api {
                    provider: "openrouter",
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
                    provider: "openrouter",
                    status: status.as_u16(),
                    message: response_text,
                });
            }

            let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
                LlmError::MalformedResponse {
                    provider: "openrouter",
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
                    provider: "openrouter",
                    status: status.as_u16(),
                    message: msg.to_string(),
                });
            }

            return self.parse_response(&response_json);
        }

        Err(last_error.unwrap_or(LlmError::RetriesExhausted {
            provider: "openrouter",
            retries: self.max_retries,
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ModelConfig {
        ModelConfig {
            providers: vec!["openrouter".to_string()],
            api_key: Some("or-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_config_defaults() {
        let client = OpenRouterCompletion::from_config(&config()).unwrap();
        assert_eq!(client.provider(), "openrouter");
        assert_eq!(client.model(), "openai/gpt-4o-mini");
        assert_eq!(
            client.api_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_model_override() {
        let mut cfg = config();
        cfg.model = Some("anthropic/claude-3.5-sonnet".to_string());
        let client = OpenRouterCompletion::from_config(&cfg).unwrap();
        assert_eq!(client.model(), "anthropic/claude-3.5-sonnet");

        let body = client.build_request_body(&[], None);
        assert_eq!(body["model"], "anthropic/claude-3.5-sonnet");
    }

    #[test]
    fn test_parse_response_tool_calls() {
        let client = OpenRouterCompletion::from_config(&config()).unwrap();
        let response = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": { "name": "get_stock_price", "arguments": "{}" }
                    }]
                }
            }]
        });

        let result = client.parse_response(&response).unwrap();
        assert_eq!(result["tool_calls"][0]["function"]["name"], "get_stock_price");
    }
}
