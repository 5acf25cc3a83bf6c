//! Model backend errors.

use std::fmt;

use thiserror::Error;

/// Errors raised by a single provider client, at construction or call time.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key could be resolved from the config or the environment.
    #[error("{provider} API key not set: provide `api_key` or set {var}")]
    MissingCredential {
        provider: &'static str,
        var: &'static str,
    },

    /// No endpoint could be resolved from the config or the environment.
    #[error("{provider} endpoint not set: provide `endpoint` or set {var}")]
    MissingEndpoint {
        provider: &'static str,
        var: &'static str,
    },

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned an error status or an error payload.
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("malformed {provider} response: {message}")]
    MalformedResponse {
        provider: &'static str,
        message: String,
    },

    /// Every retry attempt failed without a more specific error to report.
    #[error("{provider} request failed after {retries} retries")]
    RetriesExhausted { provider: &'static str, retries: u32 },

    /// The provider id is not one of the supported backends.
    #[error("unknown provider '{0}' (supported: azure, openai, openrouter)")]
    UnknownProvider(String),
}

/// One recorded construction failure during backend selection.
#[derive(Debug, Clone)]
pub struct ProviderFailure {
    /// Provider id as it appeared in the preference list.
    pub provider: String,
    /// Human-readable reason the provider was rejected.
    pub reason: String,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.reason)
    }
}

/// Raised when every preferred provider failed to construct.
///
/// Carries the full ordered failure list so startup diagnostics can show why
/// each backend was rejected, not just the last one.
#[derive(Debug, Error)]
#[error("{}", render_failures(.failures))]
pub struct BackendExhaustionError {
    pub failures: Vec<ProviderFailure>,
}

fn render_failures(failures: &[ProviderFailure]) -> String {
    if failures.is_empty() {
        return "no model providers configured".to_string();
    }
    let reasons: Vec<String> = failures.iter().map(|f| f.to_string()).collect();
    format!(
        "all {} model provider(s) failed: {}",
        failures.len(),
        reasons.join("; ")
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
