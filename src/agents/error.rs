//! Agent assembly and runtime errors.

use thiserror::Error;

use crate::llms::error::{BackendExhaustionError, LlmError};

/// Errors that can occur while assembling an agent from its descriptor.
///
/// Assembly errors are fatal for the agent being built but recoverable for
/// the discovery pass as a whole: one bad descriptor never aborts the others.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The descriptor is missing or has an empty required field.
    #[error("invalid agent configuration: {0}")]
    Configuration(String),

    /// Every preferred model provider failed to construct.
    #[error("backend selection failed: {0}")]
    Backend(#[from] BackendExhaustionError),

    /// Descriptor file I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Descriptor YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while running an assembled agent's conversation loop.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model backend call failed.
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    /// A blocking tool-execution task could not be joined.
    #[error("tool execution task failed: {0}")]
    ToolJoin(String),
}
