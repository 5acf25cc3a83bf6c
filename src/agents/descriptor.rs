//! Declarative agent configuration.
//!
//! An agent descriptor is one YAML document describing an agent: identity,
//! instructions, which capabilities to attach (by domain and tag), which to
//! exclude, and the model backend preference list.
//!
//! # Example YAML
//!
//! ```yaml
//! name: weather_agent
//! description: Answers questions about current weather and forecasts
//! instructions: |
//!   You are a weather assistant. Use your tools to answer questions
//!   about current conditions and forecasts.
//! tool_domains: [weather]
//! tool_tags: [forecast]
//! exclude_tools: [get_forecast]
//! model:
//!   providers: [azure, openrouter, openai]
//!   endpoint: https://example.openai.azure.com
//!   deployment: gpt-4o
//! ```
//!
//! Unknown fields are ignored so older binaries tolerate newer descriptors.
//! The `instructions` text is opaque: it is stored verbatim and never parsed
//! or rewritten.

use std::path::Path;

use serde::Deserialize;

use crate::agents::error::AssemblyError;
use crate::llms::base::ModelConfig;

/// One parsed agent descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentDescriptor {
    /// Display name, required non-empty.
    pub name: String,

    /// Short human-readable description.
    pub description: String,

    /// System instructions, required non-empty. Passed through verbatim.
    pub instructions: String,

    /// Domains whose capabilities the agent should receive.
    pub tool_domains: Vec<String>,

    /// Tags whose capabilities the agent should receive (OR semantics).
    pub tool_tags: Vec<String>,

    /// Capabilities to drop, by plain `name` or qualified `domain.name`.
    pub exclude_tools: Vec<String>,

    /// Model backend preferences and connection settings.
    pub model: ModelConfig,
}

impl AgentDescriptor {
    /// Parse a descriptor from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load and parse a descriptor from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, AssemblyError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&contents)?)
    }

    /// Check the fields assembly cannot proceed without.
    pub fn validate(&self) -> Result<(), AssemblyError> {
        if self.name.trim().is_empty() {
            return Err(AssemblyError::Configuration(
                "agent `name` must be non-empty".to_string(),
            ));
        }
        if self.instructions.trim().is_empty() {
            return Err(AssemblyError::Configuration(format!(
                "agent '{}' has empty `instructions`",
                self.name
            )));
        }
        if self.model.providers.is_empty() {
            return Err(AssemblyError::Configuration(format!(
                "agent '{}' lists no model providers",
                self.name
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
