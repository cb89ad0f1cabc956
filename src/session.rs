//! Plugin Session
//!
//! One session per language-service project. It owns the alias cache, the
//! watch set and the rewrite memo, and intercepts the host operations that
//! need to see classic modules as ES modules:
//!
//! - `read_file`: virtual paths and classic single-module files are rewritten
//! - `file_exists`: virtual paths exist when their physical file does
//! - `resolve_module_name`: aliases and scoped imports, see [`crate::resolve`]
//! - import completions: every known alias
//!
//! Configuration updates re-root the watch set and refresh diagnostics once.

use crate::alias_cache::{AliasCache, CacheUpdate};
use crate::config::{removed_roots, Config};
use crate::error::RefactorError;
use crate::host::{DiagnosticsSink, HostFileSystem, ModuleResolver, ResolutionOutcome};
use crate::memo::{MemoReport, RewriteCache};
use crate::refactor::{self, ApplicableRefactor, RefactorEdits};
use crate::resolve;
use crate::virtual_path::decode;
use crate::watch::WatchRegistry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Completion kind the host shows for module specifiers.
pub const EXTERNAL_MODULE_NAME_KIND: &str = "external module name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEntry {
    pub name: String,
    pub kind: String,
    pub sort_text: String,
    pub is_import_statement_completion: bool,
}

pub struct PluginSession<F: HostFileSystem, D: DiagnosticsSink> {
    fs: F,
    diagnostics: D,
    project_root: String,
    config: Config,
    roots: Vec<String>,
    cache: AliasCache,
    watches: WatchRegistry<F::Watch>,
    rewrites: RewriteCache,
}

impl<F: HostFileSystem, D: DiagnosticsSink> PluginSession<F, D> {
    /// Watch the project and its addon roots, then index every script below
    /// the roots.
    pub fn new(fs: F, diagnostics: D, project_root: &str, config: Config) -> Self {
        let project_root = fs.resolve_path(project_root);
        let roots = config.addon_roots(&project_root, |p| fs.resolve_path(p));
        info!(target: "odoo", project_root = project_root.as_str(), roots = ?roots, "odoo plugin session created");

        let mut session = Self {
            fs,
            diagnostics,
            project_root,
            config,
            roots,
            cache: AliasCache::new(),
            watches: WatchRegistry::new(),
            rewrites: RewriteCache::new(),
        };
        session.acquire_watches();
        let roots = session.roots.clone();
        session.index_roots(&roots);
        session
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // HOST INTERCEPTION
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn read_file(&mut self, path: &str) -> Option<String> {
        let decoded = decode(path);
        if let Some(alias) = decoded.alias {
            let file = self.fs.read_file(decoded.physical_path)?;
            return Some(self.rewrites.synthesize(&file, alias));
        }

        let file = self.fs.read_file(path)?;
        match self.cache.classic_entry_at(path) {
            Some(entry) => Some(self.rewrites.synthesize(&file, &entry.alias)),
            None => Some(file),
        }
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.fs.file_exists(decode(path).physical_path)
    }

    pub fn resolve_module_name<R: ModuleResolver>(
        &self,
        resolver: &R,
        name: &str,
        containing_file: &str,
        options: &R::Options,
    ) -> ResolutionOutcome {
        resolve::resolve_module_name(
            &self.cache,
            &self.fs,
            &self.roots,
            resolver,
            name,
            containing_file,
            options,
        )
    }

    /// One import-statement completion per known alias. Nothing unless the
    /// host is completing an import statement.
    pub fn import_completions(&self, include_import_statements: bool) -> Vec<CompletionEntry> {
        if !include_import_statements {
            return Vec::new();
        }
        self.cache
            .aliases()
            .map(|alias| CompletionEntry {
                name: alias.to_string(),
                kind: EXTERNAL_MODULE_NAME_KIND.to_string(),
                sort_text: alias.to_string(),
                is_import_statement_completion: true,
            })
            .collect()
    }

    pub fn applicable_refactors(
        &self,
        file_name: &str,
        start: usize,
        end: Option<usize>,
    ) -> Option<ApplicableRefactor> {
        let source = self.fs.read_file(file_name)?;
        refactor::applicable_refactors(file_name, &source, start, end)
    }

    pub fn edits_for_refactor(
        &self,
        file_name: &str,
        start: usize,
        end: Option<usize>,
        action: &str,
    ) -> Result<RefactorEdits, RefactorError> {
        let source = self
            .fs
            .read_file(file_name)
            .ok_or(RefactorError::NoStatement)?;
        refactor::edits_for_refactor(file_name, &source, start, end, action)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EVENTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Re-scan `path` after a create, change or delete. Diagnostics are
    /// refreshed once when the cache changed.
    pub fn on_file_event(&mut self, path: &str) -> CacheUpdate {
        let contents = self.fs.read_file(path);
        let update = self.cache.update_file(path, contents.as_deref());
        if update.changed() {
            debug!(target: "odoo", path, inserted = update.inserted, removed = update.removed, "alias cache updated");
            self.diagnostics.refresh_diagnostics();
        }
        update
    }

    /// Drain events queued by the host filesystem. Returns how many were handled.
    pub fn pump_events(&mut self) -> usize {
        let events = self.fs.take_pending_events();
        for path in &events {
            self.on_file_event(path);
        }
        events.len()
    }

    /// Replace the configuration: watches on roots that are gone are closed,
    /// new roots are watched and indexed, then diagnostics refresh once.
    pub fn update_configuration(&mut self, config: Config) {
        let fs = &self.fs;
        let next = config.addon_roots(&self.project_root, |p| fs.resolve_path(p));
        let previous = std::mem::replace(&mut self.roots, next);
        info!(target: "odoo", roots = ?self.roots, "odoo plugin configuration updated");

        for root in removed_roots(&previous, &self.roots) {
            if root != self.project_root {
                self.watches.release(&root);
            }
        }
        self.config = config;
        self.acquire_watches();

        let added = removed_roots(&self.roots, &previous);
        self.index_roots(&added);
        self.diagnostics.refresh_diagnostics();
    }

    /// Close every watch. The session keeps answering reads from its cache.
    pub fn shutdown(&mut self) {
        self.watches.release_all();
    }

    fn acquire_watches(&mut self) {
        let dirs = self
            .roots
            .iter()
            .cloned()
            .chain(std::iter::once(self.project_root.clone()));
        for dir in dirs {
            let fs = &self.fs;
            if let Err(e) = self.watches.acquire(&dir, |d| fs.watch_directory(d, true)) {
                warn!(target: "odoo", dir = dir.as_str(), error = %e, "could not watch directory");
            }
        }
    }

    fn index_roots(&mut self, roots: &[String]) {
        for root in roots {
            let files = self.fs.walk_directory(root);
            debug!(target: "odoo", root = root.as_str(), files = files.len(), "indexing addon root");
            for file in files {
                self.on_file_event(&file);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn cache(&self) -> &AliasCache {
        &self.cache
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn project_root(&self) -> &str {
        &self.project_root
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn watched_directories(&self) -> Vec<&str> {
        self.watches.directories().collect()
    }

    pub fn rewrite_report(&self) -> MemoReport {
        self.rewrites.report()
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut D {
        &mut self.diagnostics
    }
}
