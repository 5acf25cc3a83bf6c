//! Capability catalog — the in-memory index of all discovered capabilities.
//!
//! The catalog maps a composite (domain, name) key to a [`Capability`] and
//! supports lookup by domain, by tag, exact get, and bulk listing. There is
//! deliberately no process-wide instance: the startup routine constructs one
//! catalog and passes it by reference to the scanner and the assembler, so
//! independent catalogs can coexist (tests rely on this).
//!
//! Insertion order is preserved and is observable through every listing
//! operation; agent assembly depends on it.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::capability::Capability;

/// In-memory capability index keyed by (domain, name).
///
/// Re-registering an existing key overwrites the prior entry in place, so
/// the capability keeps its original position in listing order (last write
/// wins for the content, first write wins for the position).
#[derive(Default)]
pub struct CapabilityCatalog {
    /// Capabilities in insertion order.
    entries: Vec<Capability>,
    /// Position of each (domain, name) pair in `entries`.
    index: HashMap<(String, String), usize>,
}

impl CapabilityCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a capability by its (domain, name) key.
    pub fn register(&mut self, capability: Capability) {
        let key = (
            capability.meta.domain.clone(),
            capability.meta.name.clone(),
        );
        match self.index.get(&key) {
            Some(&pos) => {
                self.entries[pos] = capability;
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(capability);
            }
        }
    }

    /// Exact lookup by domain and name.
    pub fn get(&self, domain: &str, name: &str) -> Option<&Capability> {
        self.index
            .get(&(domain.to_string(), name.to_string()))
            .map(|&pos| &self.entries[pos])
    }

    /// All capabilities whose domain equals `domain`, in insertion order.
    /// An unknown domain yields an empty list, not an error.
    pub fn by_domain(&self, domain: &str) -> Vec<&Capability> {
        self.entries
            .iter()
            .filter(|c| c.meta.domain == domain)
            .collect()
    }

    /// All capabilities whose tag set intersects `tags` (OR across tags),
    /// in insertion order.
    pub fn by_tags(&self, tags: &[String]) -> Vec<&Capability> {
        if tags.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|c| c.matches_any_tag(tags))
            .collect()
    }

    /// Full dump in insertion order, for diagnostics.
    pub fn all(&self) -> Vec<&Capability> {
        self.entries.iter().collect()
    }

    /// Sorted distinct domains currently present.
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self
            .entries
            .iter()
            .map(|c| c.meta.domain.clone())
            .collect();
        domains.sort();
        domains.dedup();
        domains
    }

    /// Empty the catalog (used before a rescan).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Total number of registered capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diagnostics snapshot: totals, per-domain counts, mock count.
    pub fn summary(&self) -> CatalogSummary {
        let mut domains: BTreeMap<String, usize> = BTreeMap::new();
        let mut mock = 0;
        for cap in &self.entries {
            *domains.entry(cap.meta.domain.clone()).or_insert(0) += 1;
            if cap.meta.mock {
                mock += 1;
            }
        }
        CatalogSummary {
            total: self.entries.len(),
            domains,
            mock,
        }
    }
}

impl std::fmt::Debug for CapabilityCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityCatalog")
            .field("len", &self.entries.len())
            .field("domains", &self.domains())
            .finish()
    }
}

/// Catalog statistics exposed over the debug API and in startup logs.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    /// Total registered capabilities.
    pub total: usize,
    /// Capability count per domain, sorted by domain.
    pub domains: BTreeMap<String, usize>,
    /// How many entries are mock implementations.
    pub mock: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::capability::{CapabilityMeta, HandlerFn};
    use serde_json::json;
    use std::sync::Arc;

    fn make_cap(domain: &str, name: &str, tags: Vec<&str>) -> Capability {
        let handler: HandlerFn = Arc::new(|_| Ok(json!("ok")));
        let meta = CapabilityMeta::new(domain, name)
            .with_description(format!("{} capability", name))
            .with_tags(tags)
            .with_mock(true);
        Capability::new(meta, handler).unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let mut catalog = CapabilityCatalog::new();
        catalog.register(make_cap("weather", "get_weather", vec!["weather"]));

        assert_eq!(catalog.len(), 1);
        let found = catalog.get("weather", "get_weather");
        assert!(found.is_some());
        assert_eq!(found.unwrap().meta.name, "get_weather");
        assert!(catalog.get("weather", "missing").is_none());
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut catalog = CapabilityCatalog::new();
        catalog.register(make_cap("weather", "get_weather", vec!["old"]));
        catalog.register(make_cap("stock", "get_price", vec!["stock"]));
        catalog.register(make_cap("weather", "get_weather", vec!["new"]));

        assert_eq!(catalog.len(), 2);
        // Last write wins for content, first write wins for position.
        let all = catalog.all();
        assert_eq!(all[0].meta.name, "get_weather");
        assert_eq!(all[0].meta.tags, vec!["new"]);
        assert_eq!(all[1].meta.name, "get_price");
    }

    #[test]
    fn test_by_domain_insertion_order() {
        let mut catalog = CapabilityCatalog::new();
        catalog.register(make_cap("weather", "get_weather", vec![]));
        catalog.register(make_cap("stock", "get_price", vec![]));
        catalog.register(make_cap("weather", "get_forecast", vec![]));

        let weather = catalog.by_domain("weather");
        assert_eq!(weather.len(), 2);
        assert_eq!(weather[0].meta.name, "get_weather");
        assert_eq!(weather[1].meta.name, "get_forecast");
    }

    #[test]
    fn test_by_domain_unknown_is_empty() {
        let mut catalog = CapabilityCatalog::new();
        catalog.register(make_cap("weather", "get_weather", vec![]));
        assert!(catalog.by_domain("nonexistent").is_empty());
    }

    #[test]
    fn test_by_tags_intersection() {
        let mut catalog = CapabilityCatalog::new();
        catalog.register(make_cap("weather", "get_weather", vec!["weather", "current"]));
        catalog.register(make_cap("weather", "get_forecast", vec!["weather", "forecast"]));
        catalog.register(make_cap("stock", "get_price", vec!["stock"]));

        let hits = catalog.by_tags(&["current".to_string(), "stock".to_string()]);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].meta.name, "get_weather");
        assert_eq!(hits[1].meta.name, "get_price");

        assert!(catalog.by_tags(&[]).is_empty());
        assert!(catalog.by_tags(&["missing".to_string()]).is_empty());
    }

    #[test]
    fn test_domains_sorted_distinct() {
        let mut catalog = CapabilityCatalog::new();
        catalog.register(make_cap("stock", "get_price", vec![]));
        catalog.register(make_cap("weather", "get_weather", vec![]));
        catalog.register(make_cap("email", "send_email", vec![]));
        catalog.register(make_cap("weather", "get_forecast", vec![]));

        assert_eq!(catalog.domains(), vec!["email", "stock", "weather"]);
    }

    #[test]
    fn test_clear() {
        let mut catalog = CapabilityCatalog::new();
        catalog.register(make_cap("weather", "get_weather", vec![]));
        assert!(!catalog.is_empty());

        catalog.clear();
        assert!(catalog.is_empty());
        assert!(catalog.get("weather", "get_weather").is_none());
        assert!(catalog.domains().is_empty());
    }

    #[test]
    fn test_summary() {
        let mut catalog = CapabilityCatalog::new();
        catalog.register(make_cap("weather", "get_weather", vec![]));
        catalog.register(make_cap("weather", "get_forecast", vec![]));
        catalog.register(make_cap("stock", "get_price", vec![]));

        let summary = catalog.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.domains.get("weather"), Some(&2));
        assert_eq!(summary.domains.get("stock"), Some(&1));
        assert_eq!(summary.mock, 3);
    }
}
