//! OpenAI chat completion client.
//!
//! Direct integration with the OpenAI Chat Completions API via `reqwest`:
//! Bearer authentication, function calling, and a retry loop for transient
//! failures (429 and 5xx).

use async_trait::async_trait;
use serde_json::Value;

use crate::llms::base::{ChatModel, LLMMessage, ModelConfig};
use crate::llms::error::LlmError;

/// Env var consulted when the config carries no API key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

// ---------------------------------------------------------------------------
// OpenAICompletion client
// ---------------------------------------------------------------------------

/// OpenAI chat completion client.
///
/// The API key is resolved at construction time; a missing key fails
/// [`OpenAICompletion::from_config`] rather than the first call.
#[derive(Debug, Clone)]
pub struct OpenAICompletion {
    model: String,
    api_key: String,
    base_url: String,
    temperature: Option<f64>,
    timeout_secs: u64,
    max_retries: u32,
}

impl OpenAICompletion {
    /// Build a client from an agent's model block.
    ///
    /// Explicit config values win over environment variables.
    pub fn from_config(config: &ModelConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(OPENAI_API_KEY_VAR).ok())
            .ok_or(LlmError::MissingCredential {
                provider: "openai",
                var: OPENAI_API_KEY_VAR,
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
                provider: "openai",
                message: "no choices array".to_string(),
            })?;

        if choices.is_empty() {
            return Err(LlmError::MalformedResponse {
                provider: "openai",
                message: "empty choices array".to_string(),
            });
        }

        let message = choices[0]
            .get("message")
            .ok_or_else(|| LlmError::MalformedResponse {
                provider: "openai",
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
impl ChatModel for OpenAICompletion {
    fn provider(&self) -> &str {
        "openai"
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
            "OpenAICompletion.acall: model={}, messages={}, tools={:?}",
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
                    "OpenAI API retry attempt {} after {:?}",
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
                    provider: "openai",
                    status: status.as_u16(),
                    message: "rate limited".to_string(),
                });
                continue;
            }

            if status.is_server_error() {
                last_error = Some(LlmError::Api {
                    provider: "openai",
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
                    provider: "openai",
                    status: status.as_u16(),
                    message: response_text,
                });
            }

            let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
                LlmError::MalformedResponse {
                    provider: "openai",
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
                    provider: "openai",
                    status: status.as_u16(),
                    message: msg.to_string(),
                });
            }

            return self.parse_response(&response_json);
        }

        Err(last_error.unwrap_or(LlmError::RetriesExhausted {
            provider: "openai",
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
    use crate::llms::base::text_message;

    fn config() -> ModelConfig {
        ModelConfig {
            providers: vec!["openai".to_string()],
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_config_defaults() {
        let client = OpenAICompletion::from_config(&config()).unwrap();
        assert_eq!(client.provider(), "openai");
        assert_eq!(client.model(), "gpt-4o");
        assert_eq!(client.api_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_base_url_override() {
        let mut cfg = config();
        cfg.base_url = Some("http://localhost:8080/v1/".to_string());
        let client = OpenAICompletion::from_config(&cfg).unwrap();
        assert_eq!(client.api_url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_build_request_body_includes_model() {
        let mut cfg = config();
        cfg.model = Some("gpt-4o-mini".to_string());
        let client = OpenAICompletion::from_config(&cfg).unwrap();

        let body = client.build_request_body(&[text_message("user", "Hi")], None);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_parse_response_text() {
        let client = OpenAICompletion::from_config(&config()).unwrap();
        let response = serde_json::json!({
            "choices": [{
                "message": { "role": "assistant", "content": "42" },
                "finish_reason": "stop"
            }]
        });

        let result = client.parse_response(&response).unwrap();
        assert_eq!(result.as_str().unwrap(), "42");
    }

    #[test]
    fn test_parse_response_missing_choices() {
        let client = OpenAICompletion::from_config(&config()).unwrap();
        let err = client.parse_response(&serde_json::json!({})).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }
}
