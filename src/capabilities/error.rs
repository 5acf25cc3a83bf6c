//! Capability discovery and invocation errors.

use thiserror::Error;

/// Errors that can occur while discovering capabilities from manifest files.
///
/// Discovery errors are recoverable per file: the scanner logs them, counts
/// them in its report, and moves on to the next manifest.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A manifest entry references a handler id that was never registered.
    #[error("unknown handler '{handler}' for capability '{domain}.{name}'")]
    UnknownHandler {
        handler: String,
        domain: String,
        name: String,
    },

    /// Capability metadata failed validation (e.g. empty domain).
    #[error("invalid capability metadata: {0}")]
    InvalidMetadata(String),
}

/// Errors raised when invoking a capability with validated arguments.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// A required parameter was not supplied and has no default.
    #[error("missing required parameter '{param}' for '{capability}'")]
    MissingParam { capability: String, param: String },

    /// A supplied argument does not match the declared parameter type.
    #[error("parameter '{param}' of '{capability}' expects {expected}, got {actual}")]
    TypeMismatch {
        capability: String,
        param: String,
        expected: &'static str,
        actual: String,
    },

    /// The underlying handler returned an error.
    #[error("handler for '{capability}' failed: {message}")]
    Handler { capability: String, message: String },
}
