//! Model backend layer.
//!
//! This module provides everything between an agent and its chat-completion
//! backend:
//!
//! 1. [`base`] - the [`ChatModel`] trait, message helpers, and [`ModelConfig`]
//! 2. [`providers`] - native clients (Azure OpenAI, OpenAI, OpenRouter)
//! 3. [`selector`] - first-success-wins construction over a preference list
//! 4. [`error`] - per-provider errors and the aggregate exhaustion error

pub mod base;
pub mod error;
pub mod providers;
pub mod selector;

// Re-exports for convenience
pub use base::{text_message, tool_result_message, ChatModel, LLMMessage, ModelConfig};
pub use error::{BackendExhaustionError, LlmError, ProviderFailure};
pub use providers::{AzureCompletion, OpenAICompletion, OpenRouterCompletion};
pub use selector::{ModelSelection, ModelSelector};
