//! Alias Cache
//!
//! Maps logical module aliases to where their source lives. Populated by the
//! initial walk and kept in sync from file events; every mutation is
//! reported back so the session can ask the host to refresh diagnostics.

use crate::detect::detect_modules;
use crate::virtual_path::{encode_for, is_addressable_physical};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub alias: String,
    /// File that holds the source text.
    pub physical_path: String,
    /// Path consumers look the module up by: the physical path, or a virtual
    /// path when the file declares several classic modules.
    pub addressable_path: String,
    /// Classic `odoo.define` module, rewritten on read.
    pub is_legacy_form: bool,
    pub is_multi_module: bool,
}

/// What a single file event did to the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheUpdate {
    pub inserted: usize,
    pub removed: usize,
}

impl CacheUpdate {
    pub fn changed(&self) -> bool {
        self.inserted > 0 || self.removed > 0
    }
}

/// Insertion-ordered; a rediscovered alias keeps its slot and the newest entry.
#[derive(Debug, Default)]
pub struct AliasCache {
    entries: IndexMap<String, CacheEntry>,
}

impl AliasCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-synchronize the entries owned by `file` with its current contents.
    /// Missing or empty contents mean the file was removed.
    pub fn update_file(&mut self, file: &str, contents: Option<&str>) -> CacheUpdate {
        let Some(contents) = contents.filter(|c| !c.is_empty()) else {
            return CacheUpdate {
                inserted: 0,
                removed: self.remove_physical(file),
            };
        };

        if !is_addressable_physical(Path::new(file)) {
            warn!(target: "odoo", file, "path contains the virtual marker, skipping");
            return CacheUpdate::default();
        }

        let Some(detected) = detect_modules(contents) else {
            return CacheUpdate {
                inserted: 0,
                removed: self.remove_stale(file, &[]),
            };
        };

        let aliases = detected.aliases();
        let classic = detected.is_classic();
        let multi = detected.is_multi_module();
        for alias in &aliases {
            info!(target: "odoo", alias, file, classic, "Found alias");
            let addressable_path = if multi {
                encode_for(file, alias)
            } else {
                file.to_string()
            };
            self.entries.insert(
                alias.to_string(),
                CacheEntry {
                    alias: alias.to_string(),
                    physical_path: file.to_string(),
                    addressable_path,
                    is_legacy_form: classic,
                    is_multi_module: multi,
                },
            );
        }

        CacheUpdate {
            inserted: aliases.len(),
            removed: self.remove_stale(file, &aliases),
        }
    }

    /// Drop every entry whose source is `file`.
    pub fn remove_physical(&mut self, file: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|alias, entry| {
            let keep = entry.physical_path != file;
            if !keep {
                info!(target: "odoo", alias = alias.as_str(), file, "File removal");
            }
            keep
        });
        before - self.entries.len()
    }

    /// Drop entries of `file` whose alias is no longer declared there.
    fn remove_stale(&mut self, file: &str, declared: &[&str]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|alias, entry| {
            entry.physical_path != file || declared.contains(&alias.as_str())
        });
        before - self.entries.len()
    }

    pub fn get(&self, alias: &str) -> Option<&CacheEntry> {
        self.entries.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    /// Classic entry addressed by exactly `path`.
    pub fn classic_entry_at(&self, path: &str) -> Option<&CacheEntry> {
        self.entries
            .values()
            .find(|entry| entry.is_legacy_form && entry.addressable_path == path)
    }

    pub fn entries_for(&self, physical_path: &str) -> Vec<&CacheEntry> {
        self.entries
            .values()
            .filter(|entry| entry.physical_path == physical_path)
            .collect()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtual_path::decode;

    const TWO_MODULES: &str = "odoo.define('a', function () { return 1; });\nodoo.define('b', function () { return 2; });";

    #[test]
    fn test_multi_module_file_gets_virtual_paths() {
        let mut cache = AliasCache::new();
        let update = cache.update_file("/addons/m/static/src/ab.js", Some(TWO_MODULES));
        assert_eq!(update.inserted, 2);
        assert_eq!(cache.len(), 2);

        for alias in ["a", "b"] {
            let entry = cache.get(alias).unwrap();
            assert!(entry.is_multi_module);
            assert!(entry.is_legacy_form);
            let decoded = decode(&entry.addressable_path);
            assert_eq!(decoded.physical_path, "/addons/m/static/src/ab.js");
            assert_eq!(decoded.alias, Some(alias));
        }
        assert_ne!(
            cache.get("a").unwrap().addressable_path,
            cache.get("b").unwrap().addressable_path
        );
    }

    #[test]
    fn test_pragma_file_is_addressed_directly() {
        let mut cache = AliasCache::new();
        cache.update_file("/addons/x.js", Some("/** @odoo-module alias=x */\nexport default 1;"));
        assert_eq!(cache.len(), 1);
        let entry = cache.get("x").unwrap();
        assert!(!entry.is_legacy_form);
        assert!(!entry.is_multi_module);
        assert_eq!(entry.addressable_path, "/addons/x.js");
    }

    #[test]
    fn test_single_classic_module_is_addressed_directly() {
        let mut cache = AliasCache::new();
        cache.update_file("/addons/a.js", Some("odoo.define('a', function () { return 1; });"));
        let entry = cache.get("a").unwrap();
        assert!(entry.is_legacy_form);
        assert!(!entry.is_multi_module);
        assert_eq!(cache.classic_entry_at("/addons/a.js"), Some(entry));
    }

    #[test]
    fn test_removal_drops_every_entry_of_the_file() {
        let mut cache = AliasCache::new();
        cache.update_file("/addons/ab.js", Some(TWO_MODULES));
        cache.update_file("/addons/c.js", Some("odoo.define('c', () => 3);"));

        let update = cache.update_file("/addons/ab.js", None);
        assert_eq!(update.removed, 2);
        assert!(update.changed());
        assert_eq!(cache.aliases().collect::<Vec<_>>(), vec!["c"]);

        let update = cache.update_file("/addons/ab.js", Some(""));
        assert!(!update.changed());
    }

    #[test]
    fn test_rescan_drops_stale_aliases() {
        let mut cache = AliasCache::new();
        cache.update_file("/addons/ab.js", Some(TWO_MODULES));
        let update =
            cache.update_file("/addons/ab.js", Some("odoo.define('a', function () { return 1; });"));
        assert_eq!(update.removed, 1);
        assert!(!cache.contains("b"));
        assert!(!cache.get("a").unwrap().is_multi_module);

        let update = cache.update_file("/addons/ab.js", Some("export default 1;"));
        assert_eq!(update.removed, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_alias_collision_last_write_wins() {
        let mut cache = AliasCache::new();
        cache.update_file("/addons/one.js", Some("odoo.define('dup', () => 1);"));
        cache.update_file("/addons/two.js", Some("odoo.define('dup', () => 2);"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("dup").unwrap().physical_path, "/addons/two.js");

        // The older file no longer owns the alias, so its deletion is a no-op.
        assert_eq!(cache.remove_physical("/addons/one.js"), 0);
    }

    #[test]
    fn test_marker_in_physical_path_is_skipped() {
        let mut cache = AliasCache::new();
        let update = cache.update_file("/addons/#tmp/a.js", Some("odoo.define('a', () => 1);"));
        assert!(!update.changed());
        assert!(cache.is_empty());
    }
}
