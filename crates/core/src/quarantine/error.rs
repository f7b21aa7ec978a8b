//! Error types for the quarantine module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while sweeping the output tree.
#[derive(Debug, Error)]
pub enum QuarantineError {
    /// Failed to create the quarantine area.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to list a directory of the output tree.
    #[error("Failed to scan directory: {path}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The quarantine already holds a non-empty entry of that name.
    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// Failed to move a directory into quarantine.
    #[error("Failed to move directory from {source} to {destination}")]
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to write the failure report.
    #[error("Failed to write report: {path}")]
    ReportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl QuarantineError {
    pub fn move_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::MoveFailed {
            source,
            destination,
            error,
        }
    }
}
