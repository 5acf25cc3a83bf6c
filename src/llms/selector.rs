//! Ordered model backend selection.
//!
//! Given the `providers` preference list of a model config, try to construct
//! a client for each provider in order and return the first that succeeds.
//! Providers after the winner are never attempted. Every failed attempt is
//! recorded; when all providers fail the caller gets one aggregate error
//! enumerating every reason.
//!
//! Construction succeeds when credentials resolve and the client value is
//! built. No network round-trip is made here; a provider that constructs but
//! is unreachable surfaces its failure on the first call instead.

use std::sync::Arc;

use crate::llms::base::{ChatModel, ModelConfig};
use crate::llms::error::{BackendExhaustionError, LlmError, ProviderFailure};
use crate::llms::providers::azure::AzureCompletion;
use crate::llms::providers::openai::OpenAICompletion;
use crate::llms::providers::openrouter::OpenRouterCompletion;

/// Outcome of a successful backend selection.
#[derive(Debug, Clone)]
pub struct ModelSelection {
    /// The constructed client.
    pub model: Arc<dyn ChatModel>,
    /// Provider id of the winner.
    pub provider: String,
    /// Failures recorded for providers tried before the winner.
    pub attempts: Vec<ProviderFailure>,
}

/// First-success-wins client construction over a provider preference list.
pub struct ModelSelector;

impl ModelSelector {
    /// Try each provider in `config.providers` in order.
    ///
    /// Returns the first client that constructs, along with the failures
    /// that preceded it. An unknown provider id counts as that provider's
    /// failure, not a hard error.
    pub fn select(config: &ModelConfig) -> Result<ModelSelection, BackendExhaustionError> {
        let mut failures: Vec<ProviderFailure> = Vec::new();

        for provider in &config.providers {
            match Self::construct(provider, config) {
                Ok(model) => {
                    log::info!(
                        "Selected model provider '{}' (model: {}, {} earlier attempt(s) failed)",
                        provider,
                        model.model(),
                        failures.len()
                    );
                    return Ok(ModelSelection {
                        model,
                        provider: provider.clone(),
                        attempts: failures,
                    });
                }
                Err(e) => {
                    log::warn!("Model provider '{}' unavailable: {}", provider, e);
                    failures.push(ProviderFailure {
                        provider: provider.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(BackendExhaustionError { failures })
    }

    fn construct(provider: &str, config: &ModelConfig) -> Result<Arc<dyn ChatModel>, LlmError> {
        match provider {
            "azure" => Ok(Arc::new(AzureCompletion::from_config(config)?)),
            "openai" => Ok(Arc::new(OpenAICompletion::from_config(config)?)),
            "openrouter" => Ok(Arc::new(OpenRouterCompletion::from_config(config)?)),
            other => Err(LlmError::UnknownProvider(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
