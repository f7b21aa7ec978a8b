//! Per-run accumulators.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Failure bookkeeping and checkpoint candidate for one run.
///
/// Created by the caller, threaded through the engine, then handed to the
/// quarantine sweep. Every collection keeps insertion order.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    messages: Vec<String>,
    failed_urls: Vec<(String, PathBuf)>,
    failed_dirs: Vec<PathBuf>,
    checkpoint_candidate: Option<NaiveDateTime>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a free-text line to the failure report.
    pub fn record_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Remember a URL whose download broke off.
    ///
    /// A URL seen again keeps its original position and takes the newer
    /// destination.
    pub fn record_failed_url(&mut self, url: &str, dest_dir: &Path) {
        match self.failed_urls.iter_mut().find(|(u, _)| u == url) {
            Some(entry) => entry.1 = dest_dir.to_path_buf(),
            None => self
                .failed_urls
                .push((url.to_string(), dest_dir.to_path_buf())),
        }
    }

    /// Queue a destination directory for relocation into quarantine.
    pub fn queue_failed_dir(&mut self, dir: &Path) {
        if !self.failed_dirs.iter().any(|d| d == dir) {
            self.failed_dirs.push(dir.to_path_buf());
        }
    }

    /// Move the checkpoint candidate forward. Older timestamps are ignored.
    pub fn advance_checkpoint(&mut self, timestamp: NaiveDateTime) {
        if self.checkpoint_candidate.is_none_or(|c| timestamp > c) {
            self.checkpoint_candidate = Some(timestamp);
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn failed_urls(&self) -> &[(String, PathBuf)] {
        &self.failed_urls
    }

    pub fn failed_dirs(&self) -> &[PathBuf] {
        &self.failed_dirs
    }

    pub fn checkpoint_candidate(&self) -> Option<NaiveDateTime> {
        self.checkpoint_candidate
    }

    /// True when nothing needs reporting.
    pub fn is_clean(&self) -> bool {
        self.messages.is_empty() && self.failed_urls.is_empty() && self.failed_dirs.is_empty()
    }
}
