//! Handler registry — the explicit name-to-callable table behind discovery.
//!
//! Manifest files declare capability metadata and bind each entry to a
//! handler id (`"weather.get_weather"`). The ids resolve against this
//! registry, which is populated at a defined initialization point by plain
//! per-source registration functions (see `crate::tools::builtin_handlers`).
//! Nothing is discovered by inspecting code at runtime.

use std::collections::HashMap;

use super::capability::HandlerFn;

/// Name-to-handler table consulted by the scanner when binding manifests.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerFn>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under an id. Last registration wins.
    pub fn register(&mut self, id: impl Into<String>, handler: HandlerFn) {
        self.handlers.insert(id.into(), handler);
    }

    /// Look up a handler by id.
    pub fn get(&self, id: &str) -> Option<HandlerFn> {
        self.handlers.get(id).cloned()
    }

    /// Sorted list of registered handler ids, for diagnostics.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort();
        ids
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("len", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_register_and_get() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.is_empty());

        registry.register("weather.get_weather", Arc::new(|_| Ok(json!("sunny"))));
        assert_eq!(registry.len(), 1);

        let handler = registry.get("weather.get_weather").unwrap();
        assert_eq!(handler(HashMap::new()).unwrap(), json!("sunny"));
        assert!(registry.get("weather.missing").is_none());
    }

    #[test]
    fn test_ids_sorted() {
        let mut registry = HandlerRegistry::new();
        registry.register("stock.get_price", Arc::new(|_| Ok(json!(1))));
        registry.register("email.send_email", Arc::new(|_| Ok(json!(2))));

        assert_eq!(registry.ids(), vec!["email.send_email", "stock.get_price"]);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = HandlerRegistry::new();
        registry.register("x", Arc::new(|_| Ok(json!("first"))));
        registry.register("x", Arc::new(|_| Ok(json!("second"))));

        let handler = registry.get("x").unwrap();
        assert_eq!(handler(HashMap::new()).unwrap(), json!("second"));
    }
}
