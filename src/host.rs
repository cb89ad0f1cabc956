//! Host Collaborators
//!
//! Everything the session needs from the language-service host, injected at
//! construction instead of patched in after the fact.

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};

/// Synchronous view of the host filesystem.
pub trait HostFileSystem {
    type Watch: DirectoryWatch;

    /// File contents, or `None` when the file cannot be read.
    fn read_file(&self, path: &str) -> Option<String>;

    fn file_exists(&self, path: &str) -> bool;

    /// Host path resolution (relative paths, `..` segments).
    fn resolve_path(&self, path: &str) -> String;

    /// Script files below `root`, recursively.
    fn walk_directory(&self, root: &str) -> Vec<String>;

    fn watch_directory(&self, dir: &str, recursive: bool) -> Result<Self::Watch, BridgeError>;

    /// Changed paths queued since the last call, for collaborators that
    /// deliver events by polling rather than by calling into the session.
    fn take_pending_events(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Native watch handle. Must be closed before it is dropped.
pub trait DirectoryWatch {
    fn close(&mut self);
}

/// Receives "content changed, recompute diagnostics" signals.
pub trait DiagnosticsSink {
    fn refresh_diagnostics(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModule {
    pub resolved_file_name: String,
    pub extension: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionOutcome {
    pub resolved_module: Option<ResolvedModule>,
    pub failed_lookup_locations: Vec<String>,
}

/// The host's own module resolution, wrapped by the resolution override.
///
/// `Options` carries whatever the host threads through a resolution request
/// (compiler options, resolution cache, redirected reference, mode); the
/// override never looks inside it.
pub trait ModuleResolver {
    type Options;

    fn resolve_module_name(
        &self,
        name: &str,
        containing_file: &str,
        options: &Self::Options,
    ) -> ResolutionOutcome;
}

/// Counts refresh signals; used by the native bridge, which reports the count back to JS.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshCounter {
    pub count: u32,
}

impl RefreshCounter {
    /// Returns the number of signals since the last call.
    pub fn take(&mut self) -> u32 {
        std::mem::take(&mut self.count)
    }
}

impl DiagnosticsSink for RefreshCounter {
    fn refresh_diagnostics(&mut self) {
        self.count += 1;
    }
}
