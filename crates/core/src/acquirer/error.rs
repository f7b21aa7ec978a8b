//! Error types for the acquirer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching a remote image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL has no final path segment to name the file after.
    #[error("No file name in URL: {url}")]
    NoFileName { url: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The request could not be sent or the body could not be read.
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// Failed to write the downloaded body.
    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to give the downloaded file its final name.
    #[error("Failed to rename {from} to {to}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Creates a transport error from any displayable cause.
    pub fn transport(url: &str, reason: impl ToString) -> Self {
        Self::Transport {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the server was reached and refused the request.
    ///
    /// Every other failure (network, local I/O) leaves the destination in an
    /// unknown state and is queued for quarantine by the engine.
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::NoFileName { .. })
    }
}

/// Errors that can occur while copying a library file.
#[derive(Debug, Error)]
pub enum CopyError {
    /// Source file vanished between lookup and copy.
    #[error("Source file not found: {path}")]
    SourceMissing { path: PathBuf },

    /// The located entry is a directory, not a file.
    #[error("Not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Located path has no file name component.
    #[error("No file name in path: {path}")]
    NoFileName { path: PathBuf },

    /// Failed to copy file.
    #[error("Failed to copy file from {source} to {destination}")]
    CopyFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

impl CopyError {
    /// Creates a copy failed error.
    pub fn copy_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::CopyFailed {
            source,
            destination,
            error,
        }
    }
}
