//! Capability manifest — the YAML document the scanner discovers on disk.
//!
//! A manifest declares one or more capabilities and binds each to a native
//! handler by id. Dropping a manifest file into the scanned directory is all
//! it takes for its entries to appear in the catalog on the next scan,
//! provided the handler ids it names are registered.
//!
//! # Example YAML
//!
//! ```yaml
//! capabilities:
//!   - domain: weather
//!     name: get_weather
//!     description: Get current weather conditions for a location
//!     tags: [weather, current, temperature, conditions]
//!     mock: true
//!     handler: weather.get_weather
//!     params:
//!       - name: location
//!         type: string
//!         description: The location to get the weather for
//!   - domain: weather
//!     name: get_forecast
//!     description: Get weather forecast for multiple days
//!     tags: [weather, forecast]
//!     mock: true
//!     handler: weather.get_forecast
//!     params:
//!       - name: location
//!         type: string
//!       - name: days
//!         type: integer
//!         default: 3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::capability::ParamSpec;
use super::error::DiscoveryError;

/// One capability declaration inside a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDecl {
    /// Functional area (non-empty, validated at binding time).
    #[serde(default)]
    pub domain: String,

    /// Capability name, unique within its domain.
    #[serde(default)]
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Searchable tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Whether this entry is a mock implementation.
    #[serde(default)]
    pub mock: bool,

    /// Environment variable the real implementation needs, if any.
    #[serde(default)]
    pub required_credential: Option<String>,

    /// Typed parameter schema.
    #[serde(default)]
    pub params: Vec<ParamSpec>,

    /// Id of the registered native handler this entry binds to.
    pub handler: String,
}

/// A parsed manifest file: a list of capability declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityManifest {
    pub capabilities: Vec<CapabilityDecl>,
}

impl CapabilityManifest {
    /// Parse a manifest from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse a manifest from a YAML file path.
    pub fn from_yaml_file(path: &Path) -> Result<Self, DiscoveryError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&content)?)
    }
}
