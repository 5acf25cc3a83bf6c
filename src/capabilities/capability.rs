//! Capability definition — one named, domain-tagged callable offered to agents.
//!
//! A capability pairs structured metadata (domain, name, description, tags,
//! mock flag, required credential, typed parameter schema) with a native
//! handler function. The metadata never wraps or intercepts the handler:
//! the raw callable stays directly invocable, and validated invocation is a
//! separate, explicit operation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{DiscoveryError, InvocationError};

// ---------------------------------------------------------------------------
// HandlerFn
// ---------------------------------------------------------------------------

/// Type alias for a shared synchronous capability handler.
pub type HandlerFn =
    Arc<dyn Fn(HashMap<String, Value>) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

// ---------------------------------------------------------------------------
// Parameter schema
// ---------------------------------------------------------------------------

/// Type tag for a capability parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamKind {
    /// JSON Schema type name for this kind.
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }

    /// Check whether a JSON value matches this kind.
    ///
    /// Integers are accepted where a number is expected, but not the reverse.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Number => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
        }
    }
}

/// One typed parameter of a capability.
///
/// Parameters are declared once at registration and validated against the
/// supplied arguments before every invocation; they also drive the JSON
/// function-calling schema handed to model backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,

    /// Type tag: "string", "integer", "number", or "boolean".
    #[serde(rename = "type")]
    pub kind: ParamKind,

    /// Human-readable description (surfaced to the model).
    #[serde(default)]
    pub description: String,

    /// Default value substituted when the argument is absent.
    #[serde(default)]
    pub default: Option<Value>,

    /// Whether the parameter must be supplied (or defaulted).
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

impl ParamSpec {
    /// Create a required parameter with no default.
    pub fn new(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            default: None,
            required: true,
        }
    }

    /// Create an optional parameter with a default value.
    pub fn with_default(
        name: impl Into<String>,
        kind: ParamKind,
        description: impl Into<String>,
        default: Value,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            default: Some(default),
            required: false,
        }
    }
}

// ---------------------------------------------------------------------------
// CapabilityMeta
// ---------------------------------------------------------------------------

/// Structured metadata attached to a capability handler.
///
/// Example YAML (one entry of a manifest's `capabilities:` list):
/// ```yaml
/// domain: weather
/// name: get_weather
/// description: Get current weather conditions for a location
/// tags: [weather, current, temperature, conditions]
/// mock: true
/// handler: weather.get_weather
/// params:
///   - name: location
///     type: string
///     description: The location to get the weather for
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityMeta {
    /// Functional area this capability belongs to (non-empty).
    pub domain: String,

    /// Capability name, unique within its domain.
    pub name: String,

    /// Human-readable description of what the capability does.
    #[serde(default)]
    pub description: String,

    /// Searchable tags for capability selection.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Whether this is a mock implementation returning simulated data.
    #[serde(default)]
    pub mock: bool,

    /// Environment variable the real implementation needs, if any.
    #[serde(default)]
    pub required_credential: Option<String>,

    /// Ordered typed parameter schema.
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

impl CapabilityMeta {
    /// Create metadata with the required fields; the rest via builder methods.
    pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            mock: false,
            required_credential: None,
            params: Vec::new(),
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the tags.
    pub fn with_tags(mut self, tags: Vec<&str>) -> Self {
        self.tags = tags.into_iter().map(String::from).collect();
        self
    }

    /// Builder method to mark this capability as a mock implementation.
    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    /// Builder method to name the credential the real implementation needs.
    pub fn with_required_credential(mut self, var: impl Into<String>) -> Self {
        self.required_credential = Some(var.into());
        self
    }

    /// Builder method to set the parameter schema.
    pub fn with_params(mut self, params: Vec<ParamSpec>) -> Self {
        self.params = params;
        self
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// A capability: metadata plus the handler it describes.
#[derive(Clone)]
pub struct Capability {
    /// Attached metadata.
    pub meta: CapabilityMeta,
    /// The native handler, shared by reference.
    handler: HandlerFn,
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("domain", &self.meta.domain)
            .field("name", &self.meta.name)
            .field("tags", &self.meta.tags)
            .field("mock", &self.meta.mock)
            .field("params", &self.meta.params.len())
            .finish()
    }
}

impl Capability {
    /// Attach metadata to a handler.
    ///
    /// Fails if `domain` or `name` is empty. The handler itself is stored
    /// untouched and remains invocable directly via [`Capability::handler`].
    pub fn new(meta: CapabilityMeta, handler: HandlerFn) -> Result<Self, DiscoveryError> {
        if meta.domain.trim().is_empty() {
            return Err(DiscoveryError::InvalidMetadata(
                "capability domain must be a non-empty string".to_string(),
            ));
        }
        if meta.name.trim().is_empty() {
            return Err(DiscoveryError::InvalidMetadata(
                "capability name must be a non-empty string".to_string(),
            ));
        }
        Ok(Self { meta, handler })
    }

    /// The (domain, name) identity pair.
    pub fn key(&self) -> (&str, &str) {
        (&self.meta.domain, &self.meta.name)
    }

    /// Qualified `domain.name` identifier.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.meta.domain, self.meta.name)
    }

    /// Whether any of this capability's tags appears in `tags`.
    pub fn matches_any_tag(&self, tags: &[String]) -> bool {
        self.meta.tags.iter().any(|t| tags.contains(t))
    }

    /// The raw handler, unvalidated. Callers that want schema checking
    /// should use [`Capability::invoke`].
    pub fn handler(&self) -> HandlerFn {
        Arc::clone(&self.handler)
    }

    /// Validate `args` against the parameter schema, fill defaults, and call
    /// the handler.
    pub fn invoke(&self, args: HashMap<String, Value>) -> Result<Value, InvocationError> {
        let validated = self.validate_args(args)?;
        (self.handler)(validated).map_err(|e| InvocationError::Handler {
            capability: self.qualified_name(),
            message: e.to_string(),
        })
    }

    /// Check arguments against the declared parameters.
    ///
    /// Missing optional parameters take their declared default; a missing
    /// required parameter or a type mismatch is an error. Extra arguments
    /// pass through untouched.
    pub fn validate_args(
        &self,
        mut args: HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, InvocationError> {
        for param in &self.meta.params {
            match args.get(&param.name) {
                Some(value) => {
                    if !param.kind.matches(value) {
                        return Err(InvocationError::TypeMismatch {
                            capability: self.qualified_name(),
                            param: param.name.clone(),
                            expected: param.kind.json_type(),
                            actual: json_type_name(value).to_string(),
                        });
                    }
                }
                None => {
                    if let Some(default) = &param.default {
                        args.insert(param.name.clone(), default.clone());
                    } else if param.required {
                        return Err(InvocationError::MissingParam {
                            capability: self.qualified_name(),
                            param: param.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(args)
    }

    /// JSON function-calling schema for this capability, in the shape model
    /// backends expect for their `tools` array.
    pub fn tool_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.meta.params {
            let mut prop = serde_json::Map::new();
            prop.insert(
                "type".to_string(),
                Value::String(param.kind.json_type().to_string()),
            );
            if !param.description.is_empty() {
                prop.insert(
                    "description".to_string(),
                    Value::String(param.description.clone()),
                );
            }
            if let Some(default) = &param.default {
                prop.insert("default".to_string(), default.clone());
            }
            properties.insert(param.name.clone(), Value::Object(prop));
            if param.required && param.default.is_none() {
                required.push(Value::String(param.name.clone()));
            }
        }

        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.meta.name,
                "description": self.meta.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                },
            },
        })
    }
}

/// Short JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_handler() -> HandlerFn {
        Arc::new(|args: HashMap<String, Value>| Ok(json!({ "args": args })))
    }

    fn weather_capability() -> Capability {
        let meta = CapabilityMeta::new("weather", "get_weather")
            .with_description("Get current weather conditions for a location")
            .with_tags(vec!["weather", "current"])
            .with_mock(true)
            .with_params(vec![
                ParamSpec::new("location", ParamKind::String, "The location"),
                ParamSpec::with_default("days", ParamKind::Integer, "Days ahead", json!(3)),
            ]);
        Capability::new(meta, echo_handler()).unwrap()
    }

    #[test]
    fn test_empty_domain_rejected() {
        let meta = CapabilityMeta::new("", "get_weather");
        let result = Capability::new(meta, echo_handler());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("domain"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let meta = CapabilityMeta::new("weather", "   ");
        assert!(Capability::new(meta, echo_handler()).is_err());
    }

    #[test]
    fn test_key_and_qualified_name() {
        let cap = weather_capability();
        assert_eq!(cap.key(), ("weather", "get_weather"));
        assert_eq!(cap.qualified_name(), "weather.get_weather");
    }

    #[test]
    fn test_raw_handler_bypasses_validation() {
        let cap = weather_capability();
        // No location supplied; the raw handler does not care.
        let result = (cap.handler())(HashMap::new()).unwrap();
        assert_eq!(result["args"], json!({}));
    }

    #[test]
    fn test_invoke_fills_default() {
        let cap = weather_capability();
        let mut args = HashMap::new();
        args.insert("location".to_string(), json!("London"));
        let result = cap.invoke(args).unwrap();
        assert_eq!(result["args"]["location"], json!("London"));
        assert_eq!(result["args"]["days"], json!(3));
    }

    #[test]
    fn test_invoke_missing_required_param() {
        let cap = weather_capability();
        let err = cap.invoke(HashMap::new()).unwrap_err();
        assert!(matches!(err, InvocationError::MissingParam { .. }));
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn test_invoke_type_mismatch() {
        let cap = weather_capability();
        let mut args = HashMap::new();
        args.insert("location".to_string(), json!(42));
        let err = cap.invoke(args).unwrap_err();
        assert!(matches!(err, InvocationError::TypeMismatch { .. }));
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn test_integer_accepted_as_number() {
        let meta = CapabilityMeta::new("math", "scale").with_params(vec![ParamSpec::new(
            "factor",
            ParamKind::Number,
            "Scale factor",
        )]);
        let cap = Capability::new(meta, echo_handler()).unwrap();
        let mut args = HashMap::new();
        args.insert("factor".to_string(), json!(2));
        assert!(cap.invoke(args).is_ok());
    }

    #[test]
    fn test_tool_schema_shape() {
        let cap = weather_capability();
        let schema = cap.tool_schema();
        assert_eq!(schema["type"], "function");
        assert_eq!(schema["function"]["name"], "get_weather");
        assert_eq!(
            schema["function"]["parameters"]["properties"]["location"]["type"],
            "string"
        );
        // Defaulted parameters are not in the required list.
        let required = schema["function"]["parameters"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required, &vec![json!("location")]);
    }

    #[test]
    fn test_matches_any_tag() {
        let cap = weather_capability();
        assert!(cap.matches_any_tag(&["current".to_string()]));
        assert!(!cap.matches_any_tag(&["stock".to_string()]));
        assert!(!cap.matches_any_tag(&[]));
    }

    #[test]
    fn test_param_spec_yaml_roundtrip() {
        let yaml = r#"
name: location
type: string
description: "The location"
"#;
        let spec: ParamSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.name, "location");
        assert_eq!(spec.kind, ParamKind::String);
        assert!(spec.required);
        assert!(spec.default.is_none());
    }

    #[test]
    fn test_handler_error_wrapped() {
        let meta = CapabilityMeta::new("test", "boom");
        let handler: HandlerFn = Arc::new(|_| Err("deliberate failure".into()));
        let cap = Capability::new(meta, handler).unwrap();
        let err = cap.invoke(HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("deliberate failure"));
    }
}
