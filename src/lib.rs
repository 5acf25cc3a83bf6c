//! # agentry
//!
//! Capability-driven assembly of LLM agents from declarative YAML.
//!
//! Tool implementations register as *capabilities* in a catalog, keyed by
//! `(domain, name)`. Agents are described in YAML files that select
//! capabilities by domain and tag, and are assembled into runnable
//! [`agents::AssembledAgent`] values bound to the first model backend that
//! constructs from an ordered provider preference list.
//!
//! The `devui` binary serves an HTTP API over a scanned workspace for
//! inspecting the catalog and chatting with assembled agents.

pub mod agents;
pub mod capabilities;
pub mod context;
pub mod llms;
pub mod server;
pub mod tools;

pub use agents::{assemble, discover_all, AssembledAgent};
pub use capabilities::{Capability, CapabilityCatalog, CapabilityScanner, HandlerRegistry};
pub use llms::{ChatModel, ModelSelector};

/// Library version.
pub const VERSION: &str = "0.1.0";
