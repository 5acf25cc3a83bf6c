//! Native provider clients.
//!
//! Each provider implements the [`ChatModel`](crate::llms::base::ChatModel)
//! trait over its own HTTP surface: [`azure`] addresses deployments with an
//! `api-key` header, [`openai`] and [`openrouter`] speak the standard
//! chat-completions API with Bearer authentication.
//!
//! Clients resolve credentials at construction (config values first, then
//! environment variables) so the selector can tell a misconfigured provider
//! apart without making a network call.

pub mod azure;
pub mod openai;
pub mod openrouter;

pub use azure::AzureCompletion;
pub use openai::OpenAICompletion;
pub use openrouter::OpenRouterCompletion;
