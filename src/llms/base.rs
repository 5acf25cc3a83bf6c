//! Chat-model abstraction shared by all provider clients.
//!
//! A [`ChatModel`] is a thin asynchronous client for one chat-completion
//! backend. Callers pass the full message list plus optional function-calling
//! schemas; the model replies with either plain text (`Value::String`) or an
//! assistant message object carrying `tool_calls`. Executing tool calls is
//! the caller's job, never the provider's.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::llms::error::LlmError;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A single message in a chat conversation.
///
/// Kept as a loose map so provider-specific keys (`tool_calls`,
/// `tool_call_id`, `name`) pass through serialization untouched.
pub type LLMMessage = HashMap<String, Value>;

/// Build a message with the given role and text content.
pub fn text_message(role: &str, content: &str) -> LLMMessage {
    let mut msg = HashMap::new();
    msg.insert("role".to_string(), Value::String(role.to_string()));
    msg.insert("content".to_string(), Value::String(content.to_string()));
    msg
}

/// Build a `tool` role message reporting the result of one executed call.
pub fn tool_result_message(tool_call_id: &str, name: &str, content: &str) -> LLMMessage {
    let mut msg = text_message("tool", content);
    msg.insert(
        "tool_call_id".to_string(),
        Value::String(tool_call_id.to_string()),
    );
    msg.insert("name".to_string(), Value::String(name.to_string()));
    msg
}

// ---------------------------------------------------------------------------
// Model configuration
// ---------------------------------------------------------------------------

/// The `model:` block of an agent descriptor.
///
/// One flat set of connection settings shared by every provider in the
/// preference list; each provider picks the fields it understands and falls
/// back to its own environment variables for the rest. Explicit values here
/// always win over the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Ordered provider preference list (`azure`, `openai`, `openrouter`).
    pub providers: Vec<String>,
    /// Explicit API key for whichever provider is being constructed.
    pub api_key: Option<String>,
    /// Azure resource endpoint URL.
    pub endpoint: Option<String>,
    /// Azure deployment name.
    pub deployment: Option<String>,
    /// Model identifier for providers addressed by model name.
    pub model: Option<String>,
    /// Azure API version.
    pub api_version: Option<String>,
    /// Override for the API base URL (OpenAI-compatible providers).
    pub base_url: Option<String>,
    /// Sampling temperature passed through to the backend.
    pub temperature: Option<f64>,
}

// ---------------------------------------------------------------------------
// ChatModel trait
// ---------------------------------------------------------------------------

/// Abstract chat-completion client bound to one provider and model.
#[async_trait]
pub trait ChatModel: Send + Sync + fmt::Debug {
    /// Provider id (`azure`, `openai`, `openrouter`).
    fn provider(&self) -> &str;

    /// Model or deployment identifier sent to the provider.
    fn model(&self) -> &str;

    /// Whether the backend accepts `tools` function schemas.
    fn supports_function_calling(&self) -> bool {
        true
    }

    /// Send the conversation and return the model's reply.
    ///
    /// Returns `Value::String` for a plain text reply, or an assistant
    /// message object (`role`/`content`/`tool_calls`) when the model
    /// requested tool calls.
    async fn acall(
        &self,
        messages: Vec<LLMMessage>,
        tools: Option<Vec<Value>>,
    ) -> Result<Value, LlmError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message() {
        let msg = text_message("user", "Hello!");
        assert_eq!(msg["role"], "user");
        assert_eq!(msg["content"], "Hello!");
        assert_eq!(msg.len(), 2);
    }

    #[test]
    fn test_tool_result_message() {
        let msg = tool_result_message("call_123", "get_weather", "{\"temp\": 22}");
        assert_eq!(msg["role"], "tool");
        assert_eq!(msg["tool_call_id"], "call_123");
        assert_eq!(msg["name"], "get_weather");
        assert_eq!(msg["content"], "{\"temp\": 22}");
    }

    #[test]
    fn test_model_config_defaults() {
        let config: ModelConfig = serde_yaml::from_str("providers: [azure]").unwrap();
        assert_eq!(config.providers, vec!["azure"]);
        assert!(config.api_key.is_none());
        assert!(config.endpoint.is_none());
        assert!(config.temperature.is_none());
    }

    #[test]
    fn test_model_config_full() {
        let yaml = r#"
providers: [azure, openrouter]
endpoint: https://example.openai.azure.com
deployment: gpt-4o
api_version: "2024-02-01"
temperature: 0.2
"#;
        let config: ModelConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.deployment.as_deref(), Some("gpt-4o"));
        assert_eq!(config.temperature, Some(0.2));
    }
}
