//! Quarantine sweep run after a fulfillment pass.
//!
//! Moves empty and failed output directories into the quarantine area and
//! writes the consolidated failure report. Individual relocation failures
//! are logged and skipped so one stuck directory never hides the report.

mod error;
mod report;

pub use error::QuarantineError;
pub use report::{render_report, write_report};

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::PathsConfig;
use crate::engine::RunContext;

/// Outcome of a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Final locations of relocated directories.
    pub relocated: Vec<PathBuf>,
    /// Relocations that failed and were skipped.
    pub failures: usize,
}

/// Relocates directories into the quarantine area.
#[derive(Debug, Clone)]
pub struct QuarantineManager {
    downloads_dir: PathBuf,
    quarantine_dir: PathBuf,
    report_path: PathBuf,
}

impl QuarantineManager {
    pub fn new(
        downloads_dir: impl Into<PathBuf>,
        quarantine_dir: impl Into<PathBuf>,
        report_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            downloads_dir: downloads_dir.into(),
            quarantine_dir: quarantine_dir.into(),
            report_path: report_path.into(),
        }
    }

    pub fn from_paths(paths: &PathsConfig) -> Self {
        Self::new(&paths.downloads, paths.quarantine_dir(), paths.report_path())
    }

    pub fn quarantine_dir(&self) -> &Path {
        &self.quarantine_dir
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Relocate empty and failed directories, then write the report.
    ///
    /// Only creating the quarantine area and writing the report can fail
    /// the sweep.
    pub async fn sweep(&self, ctx: &RunContext) -> Result<SweepReport, QuarantineError> {
        fs::create_dir_all(&self.quarantine_dir)
            .await
            .map_err(|e| QuarantineError::DirectoryCreationFailed {
                path: self.quarantine_dir.clone(),
                source: e,
            })?;

        let mut report = SweepReport::default();

        match self.empty_dirs().await {
            Ok(dirs) => {
                for dir in dirs {
                    self.relocate_logged(&dir, &mut report).await;
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not scan output tree for empty directories");
                report.failures += 1;
            }
        }

        for dir in ctx.failed_dirs() {
            if !dir.exists() {
                debug!(dir = %dir.display(), "Failed directory already gone");
                continue;
            }
            self.relocate_logged(dir, &mut report).await;
        }

        write_report(&self.report_path, ctx).await?;

        info!(
            relocated = report.relocated.len(),
            failures = report.failures,
            report = %self.report_path.display(),
            "Quarantine sweep complete"
        );
        Ok(report)
    }

    /// Move `dir` to `<quarantine>/<name>`.
    ///
    /// An empty directory already at the destination is replaced; a
    /// non-empty one is left alone and the move fails.
    pub async fn relocate(&self, dir: &Path) -> Result<PathBuf, QuarantineError> {
        let Some(name) = dir.file_name() else {
            return Err(QuarantineError::move_failed(
                dir.to_path_buf(),
                self.quarantine_dir.clone(),
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no name"),
            ));
        };
        let destination = self.quarantine_dir.join(name);

        if fs::metadata(&destination).await.is_ok() {
            if !is_empty_dir(&destination).await? {
                return Err(QuarantineError::DestinationExists { path: destination });
            }
            fs::remove_dir(&destination).await.map_err(|e| {
                QuarantineError::move_failed(dir.to_path_buf(), destination.clone(), e)
            })?;
        }

        fs::rename(dir, &destination)
            .await
            .map_err(|e| QuarantineError::move_failed(dir.to_path_buf(), destination.clone(), e))?;

        Ok(destination)
    }

    async fn relocate_logged(&self, dir: &Path, report: &mut SweepReport) {
        match self.relocate(dir).await {
            Ok(destination) => {
                debug!(from = %dir.display(), to = %destination.display(), "Directory quarantined");
                report.relocated.push(destination);
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Could not quarantine directory");
                report.failures += 1;
            }
        }
    }

    /// Empty directories at the first two levels of the output tree.
    ///
    /// An empty top-level directory is returned itself; otherwise its empty
    /// children are. The quarantine area is never included.
    async fn empty_dirs(&self) -> Result<Vec<PathBuf>, QuarantineError> {
        let mut found = Vec::new();

        for top in list_dirs(&self.downloads_dir).await? {
            if top == self.quarantine_dir {
                continue;
            }

            if is_empty_dir(&top).await? {
                found.push(top);
                continue;
            }

            for child in list_dirs(&top).await? {
                if is_empty_dir(&child).await? {
                    found.push(child);
                }
            }
        }

        Ok(found)
    }
}

/// Subdirectories of `dir`, sorted by path.
async fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>, QuarantineError> {
    let scan_failed = |e: std::io::Error| QuarantineError::ScanFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(scan_failed(e)),
    };

    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(scan_failed)? {
        if entry.file_type().await.map_err(scan_failed)?.is_dir() {
            dirs.push(entry.path());
        }
    }

    dirs.sort();
    Ok(dirs)
}

async fn is_empty_dir(dir: &Path) -> Result<bool, QuarantineError> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| QuarantineError::ScanFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let first = entries
        .next_entry()
        .await
        .map_err(|e| QuarantineError::ScanFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    Ok(first.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(temp: &TempDir) -> QuarantineManager {
        let downloads = temp.path().join("downloads");
        QuarantineManager::new(
            &downloads,
            downloads.join("errors"),
            downloads.join("errors/errors.txt"),
        )
    }

    fn mkdir(temp: &TempDir, rel: &str) -> PathBuf {
        let path = temp.path().join(rel);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn test_sweep_relocates_empty_directories() {
        let temp = TempDir::new().unwrap();
        mkdir(&temp, "downloads/local_secondary");
        mkdir(&temp, "downloads/multi_remote/empty-order");
        let full = mkdir(&temp, "downloads/multi_remote/full-order");
        std::fs::write(full.join("full-order_a.jpg"), "x").unwrap();

        let report = manager(&temp).sweep(&RunContext::new()).await.unwrap();

        assert_eq!(report.failures, 0);
        assert!(temp.path().join("downloads/errors/local_secondary").is_dir());
        assert!(temp.path().join("downloads/errors/empty-order").is_dir());
        assert!(!temp.path().join("downloads/local_secondary").exists());
        assert!(!temp.path().join("downloads/multi_remote/empty-order").exists());
        assert!(full.join("full-order_a.jpg").exists());
        assert_eq!(report.relocated.len(), 2);
    }

    #[tokio::test]
    async fn test_sweep_relocates_failed_directories() {
        let temp = TempDir::new().unwrap();
        let failed = mkdir(&temp, "downloads/multi_remote/7");
        std::fs::write(failed.join("7_a.jpg"), "x").unwrap();

        let mut ctx = RunContext::new();
        ctx.record_failed_url("http://cdn/b.jpg", &failed);
        ctx.queue_failed_dir(&failed);

        let report = manager(&temp).sweep(&ctx).await.unwrap();

        assert!(temp.path().join("downloads/errors/7/7_a.jpg").exists());
        assert!(!failed.exists());
        assert_eq!(report.relocated, vec![temp.path().join("downloads/errors/7")]);

        let text = std::fs::read_to_string(temp.path().join("downloads/errors/errors.txt")).unwrap();
        assert!(text.starts_with("URL: http://cdn/b.jpg, Folder: "));
    }

    #[tokio::test]
    async fn test_relocate_replaces_empty_destination() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp);
        mkdir(&temp, "downloads/errors/ORD-3");
        let source = mkdir(&temp, "downloads/multi_remote/ORD-3");
        std::fs::write(source.join("partial.jpg"), "x").unwrap();

        let destination = manager.relocate(&source).await.unwrap();
        assert!(destination.join("partial.jpg").exists());
    }

    #[tokio::test]
    async fn test_relocate_refuses_non_empty_destination() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp);
        let taken = mkdir(&temp, "downloads/errors/ORD-3");
        std::fs::write(taken.join("keep.jpg"), "x").unwrap();
        let source = mkdir(&temp, "downloads/multi_remote/ORD-3");

        let result = manager.relocate(&source).await;
        assert!(matches!(result, Err(QuarantineError::DestinationExists { .. })));
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_sweep_continues_past_relocation_failure() {
        let temp = TempDir::new().unwrap();
        let taken = mkdir(&temp, "downloads/errors/7");
        std::fs::write(taken.join("keep.jpg"), "x").unwrap();
        let failed = mkdir(&temp, "downloads/multi_remote/7");
        std::fs::write(failed.join("7_a.jpg"), "x").unwrap();
        mkdir(&temp, "downloads/single_remote");

        let mut ctx = RunContext::new();
        ctx.queue_failed_dir(&failed);
        ctx.queue_failed_dir(&temp.path().join("downloads/multi_remote/gone"));

        let report = manager(&temp).sweep(&ctx).await.unwrap();

        assert_eq!(report.failures, 1);
        assert!(failed.exists());
        assert!(temp.path().join("downloads/errors/single_remote").is_dir());
        assert!(temp.path().join("downloads/errors/errors.txt").exists());
    }

    #[tokio::test]
    async fn test_sweep_without_output_tree() {
        let temp = TempDir::new().unwrap();
        let report = manager(&temp).sweep(&RunContext::new()).await.unwrap();

        assert!(report.relocated.is_empty());
        assert_eq!(
            std::fs::read_to_string(temp.path().join("downloads/errors/errors.txt")).unwrap(),
            ""
        );
    }
}
