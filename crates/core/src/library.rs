//! Reference libraries of product images on local disk.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A directory tree searched by file name.
#[derive(Debug, Clone)]
pub struct ReferenceLibrary {
    root: PathBuf,
}

impl ReferenceLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the first entry below the root whose name contains `substring`.
    ///
    /// Both files and directories match. Entries are visited in the order the
    /// filesystem returns them, so with several candidates the result is not
    /// guaranteed to be stable. An empty substring never matches.
    pub fn find(&self, substring: &str) -> Option<PathBuf> {
        if substring.is_empty() {
            return None;
        }

        WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(root = %self.root.display(), error = %e, "Skipping unreadable library entry");
                    None
                }
            })
            .find(|entry| entry.file_name().to_string_lossy().contains(substring))
            .map(|entry| entry.into_path())
    }

    /// [`find`](Self::find) on the blocking thread pool.
    pub async fn locate(&self, substring: &str) -> Option<PathBuf> {
        let library = self.clone();
        let substring = substring.to_string();

        match tokio::task::spawn_blocking(move || library.find(&substring)).await {
            Ok(found) => found,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "Library search task failed");
                None
            }
        }
    }
}
