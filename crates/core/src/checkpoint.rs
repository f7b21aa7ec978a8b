//! Persisted "last processed order" timestamp.
//!
//! The checkpoint is read once at the start of a run and written once at the
//! end. Orders whose timestamp is not strictly newer than the stored value are
//! treated as already fulfilled.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// chrono format of the stored value, e.g. `03/14/2024,09:05 PM`.
pub const CHECKPOINT_FORMAT: &str = "%m/%d/%Y,%I:%M %p";

/// Errors for checkpoint persistence.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to create checkpoint directory {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write checkpoint {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Storage for the run checkpoint.
pub trait CheckpointStore: Send + Sync {
    /// Read the stored checkpoint.
    ///
    /// Never fails: a missing, unreadable or malformed store reads as `None`
    /// so that a first run processes the whole order feed.
    fn read(&self) -> Option<NaiveDateTime>;

    /// Overwrite the stored checkpoint.
    fn write(&self, timestamp: NaiveDateTime) -> Result<(), CheckpointError>;
}

/// Checkpoint kept in a single text file.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn read(&self) -> Option<NaiveDateTime> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No checkpoint found, processing full feed");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Checkpoint unreadable, ignoring it");
                return None;
            }
        };

        match NaiveDateTime::parse_from_str(raw.trim(), CHECKPOINT_FORMAT) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    value = raw.trim(),
                    error = %e,
                    "Checkpoint malformed, ignoring it"
                );
                None
            }
        }
    }

    fn write(&self, timestamp: NaiveDateTime) -> Result<(), CheckpointError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CheckpointError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source: e,
                }
            })?;
        }

        std::fs::write(&self.path, format_checkpoint(timestamp)).map_err(|e| {
            CheckpointError::WriteFailed {
                path: self.path.clone(),
                source: e,
            }
        })?;

        debug!(path = %self.path.display(), %timestamp, "Checkpoint written");
        Ok(())
    }
}

/// Render a timestamp in the stored format.
pub fn format_checkpoint(timestamp: NaiveDateTime) -> String {
    timestamp.format(CHECKPOINT_FORMAT).to_string()
}
