//! # Capability System
//!
//! Capabilities are named, domain-tagged callables offered to agents. The
//! pieces fit together like this:
//!
//! 1. Built-in tool modules register their handlers in a [`HandlerRegistry`]
//!    at startup (`crate::tools::builtin_handlers`) — an explicit list, no
//!    runtime reflection.
//! 2. The [`CapabilityScanner`] walks a directory of YAML manifests, binds
//!    each declared entry to its handler id, and registers the result in a
//!    [`CapabilityCatalog`] owned by the caller.
//! 3. The agent assembler queries the catalog by domain and tag to attach
//!    capabilities to agents.
//!
//! ## Discovery Flow
//!
//! ```yaml
//! # capabilities/weather.yaml
//! capabilities:
//!   - domain: weather
//!     name: get_weather
//!     handler: weather.get_weather
//! ```
//!
//! 1. `builtin_handlers()` registers `weather.get_weather`
//! 2. `CapabilityScanner::scan(&mut catalog)` parses the manifest and binds it
//! 3. `catalog.by_domain("weather")` returns the capability, in scan order
//!
//! One broken manifest never blocks its siblings; the scan report carries
//! the per-file failures for startup diagnostics.

pub mod capability;
pub mod catalog;
pub mod error;
pub mod handlers;
pub mod manifest;
pub mod scanner;

pub use capability::{Capability, CapabilityMeta, HandlerFn, ParamKind, ParamSpec};
pub use catalog::{CapabilityCatalog, CatalogSummary};
pub use error::{DiscoveryError, InvocationError};
pub use handlers::HandlerRegistry;
pub use manifest::{CapabilityDecl, CapabilityManifest};
pub use scanner::{CapabilityScanner, ScanFailure, ScanReport};
