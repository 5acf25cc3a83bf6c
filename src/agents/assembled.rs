//! The runnable agent produced by assembly.
//!
//! An [`AssembledAgent`] bundles the descriptor's identity fields with the
//! resolved capability list and the selected chat-model client. Its
//! [`send`](AssembledAgent::send) method drives a native function-calling
//! loop: the model receives the capability schemas, requested tool calls are
//! validated and executed on the blocking thread pool, and their results are
//! fed back until the model answers in plain text.

use std::collections::HashMap;

use serde_json::Value;

use crate::agents::error::AgentError;
use crate::capabilities::capability::Capability;
use crate::context::with_tool_context;
use crate::llms::base::{text_message, tool_result_message, LLMMessage};
use crate::llms::selector::ModelSelection;

/// Tool rounds allowed before the agent forces a plain-text answer.
const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

// ---------------------------------------------------------------------------
// AssembledAgent
// ---------------------------------------------------------------------------

/// A fully wired agent: identity, capabilities, and a model backend.
///
/// Cloning is cheap: capabilities and the model client are shared by
/// reference, so callers can clone an agent out of shared state and run
/// [`send`](AssembledAgent::send) without holding any lock.
#[derive(Debug, Clone)]
pub struct AssembledAgent {
    name: String,
    description: String,
    instructions: String,
    capabilities: Vec<Capability>,
    selection: ModelSelection,
    max_tool_rounds: usize,
}

impl AssembledAgent {
    pub(crate) fn new(
        name: String,
        description: String,
        instructions: String,
        capabilities: Vec<Capability>,
        selection: ModelSelection,
    ) -> Self {
        Self {
            name,
            description,
            instructions,
            capabilities,
            selection,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Builder method to override the tool round limit.
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    // --- Accessors ---

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The descriptor's instructions, verbatim.
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Qualified `domain.name` identifiers of the attached capabilities.
    pub fn capability_names(&self) -> Vec<String> {
        self.capabilities
            .iter()
            .map(|c| c.qualified_name())
            .collect()
    }

    /// Provider id of the selected backend.
    pub fn provider(&self) -> &str {
        &self.selection.provider
    }

    /// Model identifier of the selected backend.
    pub fn model_id(&self) -> &str {
        self.selection.model.model()
    }

    /// Instructions plus the generated tool context.
    pub fn system_prompt(&self) -> String {
        with_tool_context(&self.instructions, &self.capabilities, false)
    }

    /// JSON function-calling schemas for every attached capability.
    pub fn tool_schemas(&self) -> Vec<Value> {
        self.capabilities.iter().map(|c| c.tool_schema()).collect()
    }

    /// Look up an attached capability by plain or qualified name.
    ///
    /// Bare names resolve to the first match in capability order.
    pub fn find_capability(&self, name: &str) -> Option<&Capability> {
        self.capabilities
            .iter()
            .find(|c| c.meta.name == name || c.qualified_name() == name)
    }

    // --- Conversation loop ---

    /// Send one user message and run the tool-calling loop to completion.
    ///
    /// Capability handlers may block, so each one runs via
    /// `tokio::task::spawn_blocking`. Unknown tools and invocation failures
    /// are reported back to the model as tool results rather than aborting
    /// the conversation. After the round limit the model is asked once more
    /// without tools so the reply is always plain text.
    pub async fn send(&self, message: &str) -> Result<String, AgentError> {
        let mut messages = vec![
            text_message("system", &self.system_prompt()),
            text_message("user", message),
        ];

        let tools = if self.selection.model.supports_function_calling()
            && !self.capabilities.is_empty()
        {
            Some(self.tool_schemas())
        } else {
            None
        };

        for round in 0..self.max_tool_rounds {
            let reply = self
                .selection
                .model
                .acall(messages.clone(), tools.clone())
                .await?;

            let tool_calls = match reply.get("tool_calls").and_then(|t| t.as_array()) {
                Some(calls) if !calls.is_empty() => calls.clone(),
                _ => return Ok(reply_text(&reply)),
            };

            log::debug!(
                "Agent '{}' round {}: {} tool call(s)",
                self.name,
                round,
                tool_calls.len()
            );

            messages.push(to_message(&reply));

            for call in &tool_calls {
                let (id, name, args) = parse_tool_call(call);
                if name.is_empty() {
                    messages.push(tool_result_message(&id, "unknown", "Error: malformed tool call"));
                    continue;
                }
                let content = match args {
                    Ok(args) => self.execute_tool_call(&name, args).await?,
                    Err(reason) => format!("Error: {}", reason),
                };
                messages.push(tool_result_message(&id, &name, &content));
            }
        }

        log::warn!(
            "Agent '{}' hit the tool round limit ({}); requesting a final answer",
            self.name,
            self.max_tool_rounds
        );
        let final_reply = self.selection.model.acall(messages, None).await?;
        Ok(reply_text(&final_reply))
    }

    async fn execute_tool_call(
        &self,
        name: &str,
        args: HashMap<String, Value>,
    ) -> Result<String, AgentError> {
        let Some(capability) = self.find_capability(name) else {
            log::warn!("Agent '{}' requested unknown tool '{}'", self.name, name);
            return Ok(format!("Error: unknown tool '{}'", name));
        };

        let capability = capability.clone();
        let result = tokio::task::spawn_blocking(move || capability.invoke(args))
            .await
            .map_err(|e| AgentError::ToolJoin(e.to_string()))?;

        Ok(match result {
            Ok(Value::String(text)) => text,
            Ok(value) => value.to_string(),
            Err(e) => format!("Error: {}", e),
        })
    }
}

// ---------------------------------------------------------------------------
// Reply handling helpers
// ---------------------------------------------------------------------------

/// Extract the text of a model reply (plain string or message object).
fn reply_text(reply: &Value) -> String {
    if let Some(text) = reply.as_str() {
        return text.to_string();
    }
    reply
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Convert a reply object into a conversation message.
fn to_message(reply: &Value) -> LLMMessage {
    reply
        .as_object()
        .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

/// Pull (id, name, parsed arguments) out of one tool-call entry.
///
/// Providers send `arguments` as a JSON-encoded string; an already-decoded
/// object is accepted too.
fn parse_tool_call(call: &Value) -> (String, String, Result<HashMap<String, Value>, String>) {
    let id = call
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let function = call.get("function").cloned().unwrap_or(Value::Null);
    let name = function
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let args = match function.get("arguments") {
        Some(Value::String(raw)) => {
            serde_json::from_str::<Value>(raw).map_err(|e| format!("invalid arguments JSON: {}", e))
        }
        Some(value) => Ok(value.clone()),
        None => Ok(Value::Object(serde_json::Map::new())),
    }
    .and_then(|value| match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(format!("arguments must be a JSON object, got: {}", other)),
    });

    (id, name, args)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
