//! Watch Set
//!
//! Registry of active directory watches, keyed by resolved directory. Owned
//! by the session; acquisition is idempotent and every handle is closed
//! before it is discarded, including when the registry itself is dropped.

use crate::host::DirectoryWatch;
use indexmap::IndexMap;
use tracing::debug;

#[derive(Debug)]
pub struct WatchRegistry<W: DirectoryWatch> {
    handles: IndexMap<String, W>,
}

impl<W: DirectoryWatch> WatchRegistry<W> {
    pub fn new() -> Self {
        Self {
            handles: IndexMap::new(),
        }
    }

    /// Acquire a watch for `dir` unless one is already active.
    /// Returns true when a new handle was installed.
    pub fn acquire<E>(
        &mut self,
        dir: &str,
        open: impl FnOnce(&str) -> Result<W, E>,
    ) -> Result<bool, E> {
        if self.handles.contains_key(dir) {
            return Ok(false);
        }
        let handle = open(dir)?;
        debug!(target: "odoo", dir, "watching directory");
        self.handles.insert(dir.to_string(), handle);
        Ok(true)
    }

    /// Close and forget the watch for `dir`.
    pub fn release(&mut self, dir: &str) -> bool {
        match self.handles.shift_remove(dir) {
            Some(mut handle) => {
                handle.close();
                debug!(target: "odoo", dir, "released directory watch");
                true
            }
            None => false,
        }
    }

    pub fn release_all(&mut self) {
        for (dir, mut handle) in self.handles.drain(..) {
            handle.close();
            debug!(target: "odoo", dir = dir.as_str(), "released directory watch");
        }
    }

    pub fn is_watching(&self, dir: &str) -> bool {
        self.handles.contains_key(dir)
    }

    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl<W: DirectoryWatch> Default for WatchRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: DirectoryWatch> Drop for WatchRegistry<W> {
    fn drop(&mut self) {
        self.release_all();
    }
}
