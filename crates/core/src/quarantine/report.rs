//! Consolidated failure report.

use std::path::Path;
use tokio::fs;

use crate::engine::RunContext;

use super::error::QuarantineError;

/// Render the report: one line per failed URL, then one per message.
pub fn render_report(ctx: &RunContext) -> String {
    let mut out = String::new();

    for (url, folder) in ctx.failed_urls() {
        out.push_str(&format!("URL: {}, Folder: {}\n", url, folder.display()));
    }
    for message in ctx.messages() {
        out.push_str(message);
        out.push('\n');
    }

    out
}

/// Overwrite `path` with the rendered report.
pub async fn write_report(path: &Path, ctx: &RunContext) -> Result<(), QuarantineError> {
    fs::write(path, render_report(ctx))
        .await
        .map_err(|e| QuarantineError::ReportFailed {
            path: path.to_path_buf(),
            source: e,
        })
}
