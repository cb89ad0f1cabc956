use crate::rewrite::synthesize;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoReport {
    pub hits: u64,
    pub misses: u64,
}

/// Memoized [`synthesize`], keyed by the content hash of the file text and the alias.
///
/// Every read hands in freshly read text, so an edited file hashes to a new
/// key and never hits a stale rewrite.
#[derive(Debug, Default)]
pub struct RewriteCache {
    entries: HashMap<(String, String), String>,
    hits: u64,
    misses: u64,
}

impl RewriteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute_hash(source: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn synthesize(&mut self, file: &str, alias: &str) -> String {
        let key = (Self::compute_hash(file), alias.to_string());
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return hit.clone();
        }
        self.misses += 1;
        let rewritten = synthesize(file, alias);
        self.entries.insert(key, rewritten.clone());
        rewritten
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn report(&self) -> MemoReport {
        MemoReport {
            hits: self.hits,
            misses: self.misses,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
