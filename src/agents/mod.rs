//! Agent assembly and execution.
//!
//! This module turns declarative YAML descriptors into runnable agents:
//!
//! 1. [`descriptor`] - parsing and validation of agent YAML files
//! 2. [`assembler`] - capability resolution against a catalog plus backend
//!    selection, for one descriptor or a whole directory
//! 3. [`assembled`] - the runnable [`AssembledAgent`] and its
//!    function-calling conversation loop
//! 4. [`error`] - assembly-time and run-time error types
//!
//! # Example
//!
//! ```ignore
//! let catalog = scan_capabilities()?;
//! let descriptor = AgentDescriptor::from_yaml_file(Path::new("agents/weather_agent.yaml"))?;
//! let agent = assembler::assemble(&descriptor, &catalog)?;
//! let reply = agent.send("What's the weather in Oslo?").await?;
//! ```

pub mod assembled;
pub mod assembler;
pub mod descriptor;
pub mod error;

// Re-exports for convenience
pub use assembled::AssembledAgent;
pub use assembler::{assemble, assemble_file, discover_all, AssemblyFailure, DiscoveredAgents};
pub use descriptor::AgentDescriptor;
pub use error::{AgentError, AssemblyError};
