//! Agent assembly: descriptor + catalog -> runnable agent.
//!
//! Assembly is a pure pipeline over explicit inputs:
//!
//! 1. Validate the descriptor (name, instructions, provider list).
//! 2. Resolve capabilities from the catalog: domain filters first, then tag
//!    filters, deduplicated by (domain, name) keeping first-seen order.
//! 3. Drop exclusions, matched by plain `name` or qualified `domain.name`.
//! 4. Select a model backend over the provider preference list.
//!
//! A filter matching nothing is not an error: an agent with zero
//! capabilities is valid. Backend exhaustion and configuration problems are
//! errors and fail just the agent being assembled.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::agents::assembled::AssembledAgent;
use crate::agents::descriptor::AgentDescriptor;
use crate::agents::error::AssemblyError;
use crate::capabilities::capability::Capability;
use crate::capabilities::catalog::CapabilityCatalog;
use crate::llms::selector::ModelSelector;

// ---------------------------------------------------------------------------
// Single-agent assembly
// ---------------------------------------------------------------------------

/// Assemble one agent from a parsed descriptor.
pub fn assemble(
    descriptor: &AgentDescriptor,
    catalog: &CapabilityCatalog,
) -> Result<AssembledAgent, AssemblyError> {
    descriptor.validate()?;

    let capabilities = resolve_capabilities(descriptor, catalog);
    let selection = ModelSelector::select(&descriptor.model)?;

    log::info!(
        "Assembled agent '{}': {} capability(ies), provider '{}'",
        descriptor.name,
        capabilities.len(),
        selection.provider
    );

    Ok(AssembledAgent::new(
        descriptor.name.clone(),
        descriptor.description.clone(),
        descriptor.instructions.clone(),
        capabilities,
        selection,
    ))
}

/// Load a descriptor from a YAML file and assemble it.
pub fn assemble_file(
    path: &Path,
    catalog: &CapabilityCatalog,
) -> Result<AssembledAgent, AssemblyError> {
    let descriptor = AgentDescriptor::from_yaml_file(path)?;
    assemble(&descriptor, catalog)
}

/// Resolve the descriptor's filters against the catalog.
///
/// Domain matches come first (in the order domains are listed), tag matches
/// after; duplicates keep their first position. Exclusions are applied last.
fn resolve_capabilities(
    descriptor: &AgentDescriptor,
    catalog: &CapabilityCatalog,
) -> Vec<Capability> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut resolved: Vec<Capability> = Vec::new();

    for domain in &descriptor.tool_domains {
        for capability in catalog.by_domain(domain) {
            let key = (capability.meta.domain.clone(), capability.meta.name.clone());
            if seen.insert(key) {
                resolved.push(capability.clone());
            }
        }
    }

    for capability in catalog.by_tags(&descriptor.tool_tags) {
        let key = (capability.meta.domain.clone(), capability.meta.name.clone());
        if seen.insert(key) {
            resolved.push(capability.clone());
        }
    }

    if !descriptor.exclude_tools.is_empty() {
        let excluded: HashSet<&str> = descriptor
            .exclude_tools
            .iter()
            .map(|s| s.as_str())
            .collect();
        let before = resolved.len();
        resolved.retain(|capability| {
            !excluded.contains(capability.meta.name.as_str())
                && !excluded.contains(capability.qualified_name().as_str())
        });
        let removed = before - resolved.len();
        if removed > 0 {
            log::info!(
                "Agent '{}': excluded {} capability(ies)",
                descriptor.name,
                removed
            );
        }
    }

    resolved
}

// ---------------------------------------------------------------------------
// Directory discovery
// ---------------------------------------------------------------------------

/// One agent config file that failed to load or assemble.
#[derive(Debug)]
pub struct AssemblyFailure {
    pub path: PathBuf,
    pub error: AssemblyError,
}

/// Result of assembling every descriptor found in a directory.
#[derive(Debug, Default)]
pub struct DiscoveredAgents {
    /// Successfully assembled agents, keyed by config file stem.
    pub agents: HashMap<String, AssembledAgent>,
    /// Per-file failures, for startup diagnostics.
    pub failures: Vec<AssemblyFailure>,
}

/// Assemble every agent YAML in a directory.
///
/// Files are visited in sorted order; stems starting with `_` are skipped.
/// One bad config degrades only itself: it is logged, recorded in
/// `failures`, and the remaining files still load.
pub fn discover_all(agents_dir: &Path, catalog: &CapabilityCatalog) -> DiscoveredAgents {
    let mut outcome = DiscoveredAgents::default();

    if !agents_dir.is_dir() {
        log::warn!(
            "Agents directory {:?} does not exist; no agents loaded",
            agents_dir
        );
        return outcome;
    }

    let mut paths: Vec<PathBuf> = match std::fs::read_dir(agents_dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(e) => {
            log::warn!("Failed to read agents directory {:?}: {}", agents_dir, e);
            return outcome;
        }
    };
    paths.sort();

    for path in paths {
        if !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.starts_with('_') {
            log::debug!("Skipping agent config {:?}", path);
            continue;
        }
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);
        if !is_yaml {
            continue;
        }

        match assemble_file(&path, catalog) {
            Ok(agent) => {
                log::info!("Loaded agent '{}' from {:?}", agent.name(), path);
                outcome.agents.insert(stem.to_string(), agent);
            }
            Err(e) => {
                log::warn!("Skipping agent config {:?}: {}", path, e);
                outcome.failures.push(AssemblyFailure { path, error: e });
            }
        }
    }

    log::info!(
        "Agent discovery complete: {} loaded, {} failed",
        outcome.agents.len(),
        outcome.failures.len()
    );

    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
