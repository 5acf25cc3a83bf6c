//! Capability scanner — walks a manifest directory and populates a catalog.
//!
//! The scanner recursively enumerates YAML manifest files under a root
//! directory, binds each declared capability to its registered handler, and
//! registers the results in the catalog it is given. Files and directories
//! whose names start with an underscore are internal helpers and are not
//! scanned as capability sources.
//!
//! Failure isolation is the load-bearing behavior here: one broken manifest
//! (YAML syntax error, unknown handler id, invalid metadata) is logged,
//! counted, and skipped without affecting its siblings. A manifest either
//! contributes all of its entries or none of them.

use std::path::{Path, PathBuf};

use super::capability::{Capability, CapabilityMeta};
use super::catalog::CapabilityCatalog;
use super::error::DiscoveryError;
use super::handlers::HandlerRegistry;
use super::manifest::{CapabilityDecl, CapabilityManifest};

// ---------------------------------------------------------------------------
// ScanReport
// ---------------------------------------------------------------------------

/// One manifest file that failed to load, with the reason.
#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: DiscoveryError,
}

/// Outcome of a scan pass, for startup diagnostics.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Capabilities registered during this pass.
    pub discovered: usize,
    /// Manifest files that failed to load.
    pub failed: usize,
    /// The per-file failure reasons.
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    fn record_failure(&mut self, path: &Path, error: DiscoveryError) {
        log::warn!("Skipping capability manifest {:?}: {}", path, error);
        self.failed += 1;
        self.failures.push(ScanFailure {
            path: path.to_path_buf(),
            error,
        });
    }
}

// ---------------------------------------------------------------------------
// CapabilityScanner
// ---------------------------------------------------------------------------

/// Discovers capabilities by walking a directory tree of YAML manifests.
///
/// The scanner owns the handler registry it binds against; the catalog is
/// always passed in by the caller, so repeated scans (after
/// [`CapabilityCatalog::clear`]) reproduce the same contents for unchanged
/// files.
pub struct CapabilityScanner {
    /// Root directory to walk.
    root: PathBuf,
    /// Native handlers available for binding.
    handlers: HandlerRegistry,
}

impl CapabilityScanner {
    /// Create a scanner over `root` binding against `handlers`.
    pub fn new(root: impl Into<PathBuf>, handlers: HandlerRegistry) -> Self {
        Self {
            root: root.into(),
            handlers,
        }
    }

    /// The scanned root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root directory and register every bound capability.
    ///
    /// Never fails as a whole: per-file problems are absorbed into the
    /// report. A missing root yields an empty report.
    pub fn scan(&self, catalog: &mut CapabilityCatalog) -> ScanReport {
        let mut report = ScanReport::default();
        if !self.root.exists() {
            log::warn!("Capability directory {:?} does not exist", self.root);
            return report;
        }
        self.scan_dir(&self.root, catalog, &mut report);
        log::info!(
            "Capability scan of {:?}: {} discovered, {} failed",
            self.root,
            report.discovered,
            report.failed
        );
        report
    }

    fn scan_dir(&self, dir: &Path, catalog: &mut CapabilityCatalog, report: &mut ScanReport) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                report.record_failure(dir, DiscoveryError::Io(e));
                return;
            }
        };

        // Sort for deterministic registration order across platforms.
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        paths.sort();

        for path in paths {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            if name.starts_with('_') {
                log::debug!("Skipping internal entry {:?}", path);
                continue;
            }

            if path.is_dir() {
                self.scan_dir(&path, catalog, report);
            } else if path
                .extension()
                .map_or(false, |ext| ext == "yaml" || ext == "yml")
            {
                match self.load_file(&path, catalog) {
                    Ok(count) => report.discovered += count,
                    Err(e) => report.record_failure(&path, e),
                }
            }
        }
    }

    /// Load one manifest file and register its capabilities.
    ///
    /// All entries are bound before any is registered, so a bad entry keeps
    /// the whole file out of the catalog.
    fn load_file(
        &self,
        path: &Path,
        catalog: &mut CapabilityCatalog,
    ) -> Result<usize, DiscoveryError> {
        let manifest = CapabilityManifest::from_yaml_file(path)?;

        let mut bound = Vec::with_capacity(manifest.capabilities.len());
        for decl in manifest.capabilities {
            bound.push(self.bind(decl)?);
        }

        let count = bound.len();
        for cap in bound {
            log::debug!("Discovered capability {}", cap.qualified_name());
            catalog.register(cap);
        }
        Ok(count)
    }

    /// Bind one declaration to its registered handler.
    fn bind(&self, decl: CapabilityDecl) -> Result<Capability, DiscoveryError> {
        let handler =
            self.handlers
                .get(&decl.handler)
                .ok_or_else(|| DiscoveryError::UnknownHandler {
                    handler: decl.handler.clone(),
                    domain: decl.domain.clone(),
                    name: decl.name.clone(),
                })?;

        let meta = CapabilityMeta {
            domain: decl.domain,
            name: decl.name,
            description: decl.description,
            tags: decl.tags,
            mock: decl.mock,
            required_credential: decl.required_credential,
            params: decl.params,
        };
        Capability::new(meta, handler)
    }
}

impl std::fmt::Debug for CapabilityScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityScanner")
            .field("root", &self.root)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
