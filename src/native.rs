//! Native Filesystem
//!
//! [`HostFileSystem`] over `std::fs`, `walkdir` and `notify`. Watch callbacks
//! run on notify's thread and only enqueue paths; the session consumes them
//! on its own thread through [`HostFileSystem::take_pending_events`].

use crate::error::BridgeError;
use crate::host::{DirectoryWatch, HostFileSystem};
use indexmap::IndexSet;
use notify::{recommended_watcher, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Extensions indexed by the initial walk.
pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "ts"];

pub struct NativeFileSystem {
    project_root: PathBuf,
    sender: mpsc::Sender<String>,
    receiver: mpsc::Receiver<String>,
}

impl NativeFileSystem {
    pub fn new(project_root: &str) -> Result<Self, BridgeError> {
        let project_root = fs::canonicalize(project_root).map_err(|source| BridgeError::Io {
            path: project_root.to_string(),
            source,
        })?;
        let (sender, receiver) = mpsc::channel();
        Ok(Self {
            project_root,
            sender,
            receiver,
        })
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

/// Lexical normalization: `.` dropped, `..` pops a segment. Symlinks are
/// not followed.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == "node_modules" || name.starts_with('.')
}

fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}

impl HostFileSystem for NativeFileSystem {
    type Watch = NativeWatch;

    fn read_file(&self, path: &str) -> Option<String> {
        fs::read_to_string(path).ok()
    }

    fn file_exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn resolve_path(&self, path: &str) -> String {
        let path = Path::new(path);
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        };
        normalize(&absolute).to_string_lossy().to_string()
    }

    fn walk_directory(&self, root: &str) -> Vec<String> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e))
        {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_script(entry.path()) => {
                    files.push(entry.path().to_string_lossy().to_string());
                }
                Ok(_) => {}
                Err(e) => debug!(target: "odoo", root, error = %e, "skipping unreadable entry"),
            }
        }
        files
    }

    fn watch_directory(&self, dir: &str, recursive: bool) -> Result<NativeWatch, BridgeError> {
        let tx = self.sender.clone();
        let mut watcher = recommended_watcher(move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                if matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    for path in event.paths {
                        let _ = tx.send(path.to_string_lossy().to_string());
                    }
                }
            }
            Err(e) => warn!(target: "odoo", error = %e, "watch error"),
        })
        .map_err(|source| BridgeError::Watch {
            dir: dir.to_string(),
            source,
        })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(Path::new(dir), mode)
            .map_err(|source| BridgeError::Watch {
                dir: dir.to_string(),
                source,
            })?;

        Ok(NativeWatch {
            dir: PathBuf::from(dir),
            watcher: Some(watcher),
        })
    }

    /// Queued paths in arrival order, each reported once per drain.
    fn take_pending_events(&self) -> Vec<String> {
        let unique: IndexSet<String> = self.receiver.try_iter().collect();
        unique.into_iter().collect()
    }
}

pub struct NativeWatch {
    dir: PathBuf,
    watcher: Option<RecommendedWatcher>,
}

impl DirectoryWatch for NativeWatch {
    fn close(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            if let Err(e) = watcher.unwatch(&self.dir) {
                debug!(target: "odoo", dir = %self.dir.display(), error = %e, "unwatch failed");
            }
        }
    }
}

impl Drop for NativeWatch {
    fn drop(&mut self) {
        self.close();
    }
}
