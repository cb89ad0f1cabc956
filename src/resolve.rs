//! Resolution Override
//!
//! Sits in front of the host's module resolution. Known aliases resolve to
//! the physical file that declares them (never the virtual path: the
//! compiler needs real content before the read layer rewrites it). Scoped
//! imports such as `@web/core/utils` from Odoo files are mapped onto
//! `<addons>/web/static/src/core/utils`. Everything else is delegated.

use crate::alias_cache::AliasCache;
use crate::detect::mentions_odoo_module;
use crate::host::{HostFileSystem, ModuleResolver, ResolutionOutcome, ResolvedModule};
use crate::virtual_path::extname;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref SCOPED_IMPORT_RE: Regex = Regex::new(r"^@(.+?)/(.+)$").unwrap();
}

/// Suffixes tried on every scoped candidate, in order.
pub const PROBE_EXTENSIONS: &[&str] = &["", ".js", ".ts"];

/// Extension reported when the resolved path has none.
const DEFAULT_EXTENSION: &str = ".js";

pub fn resolved_module(path: &str) -> ResolvedModule {
    let extension = match extname(path) {
        "" => DEFAULT_EXTENSION,
        ext => ext,
    };
    ResolvedModule {
        resolved_file_name: path.to_string(),
        extension: extension.to_string(),
    }
}

/// One candidate per addon root for a scoped import, or none when `name`
/// is not of the `@scope/subpath` shape.
pub fn scoped_candidates(name: &str, roots: &[String]) -> Vec<String> {
    let Some(cap) = SCOPED_IMPORT_RE.captures(name) else {
        return Vec::new();
    };
    roots
        .iter()
        .map(|dir| format!("{}/{}/static/src/{}", dir.trim_end_matches('/'), &cap[1], &cap[2]))
        .collect()
}

pub fn resolve_module_name<F, R>(
    cache: &AliasCache,
    fs: &F,
    roots: &[String],
    resolver: &R,
    name: &str,
    containing_file: &str,
    options: &R::Options,
) -> ResolutionOutcome
where
    F: HostFileSystem,
    R: ModuleResolver,
{
    if let Some(entry) = cache.get(name) {
        return ResolutionOutcome {
            resolved_module: Some(resolved_module(&entry.physical_path)),
            failed_lookup_locations: Vec::new(),
        };
    }

    if name.starts_with('@') {
        let containing = fs.read_file(containing_file).unwrap_or_default();
        let candidates = if mentions_odoo_module(&containing) {
            scoped_candidates(name, roots)
        } else {
            Vec::new()
        };

        if !candidates.is_empty() {
            let mut found = None;
            let mut failed = Vec::new();
            for base in &candidates {
                for ext in PROBE_EXTENSIONS {
                    let probe = format!("{base}{ext}");
                    if fs.file_exists(&probe) {
                        found.get_or_insert(probe);
                    } else {
                        failed.push(probe);
                    }
                }
            }

            if let Some(path) = found {
                debug!(target: "odoo", name, path = path.as_str(), "resolved scoped import");
                return ResolutionOutcome {
                    resolved_module: Some(resolved_module(&path)),
                    failed_lookup_locations: failed,
                };
            }

            let mut outcome = resolver.resolve_module_name(name, containing_file, options);
            failed.append(&mut outcome.failed_lookup_locations);
            outcome.failed_lookup_locations = failed;
            return outcome;
        }
    }

    resolver.resolve_module_name(name, containing_file, options)
}
