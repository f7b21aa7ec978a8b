//! Copies from a reference library into an order directory.

use std::path::{Path, PathBuf};
use tokio::fs;

use super::error::CopyError;
use super::naming::FileNaming;

/// Copy a located library file into `dest_dir` under its renamed file name.
///
/// The source is checked again right before copying since library contents
/// may change between lookup and copy.
pub async fn copy_local(
    dest_dir: &Path,
    found_path: &Path,
    rename_to: FileNaming<'_>,
) -> Result<PathBuf, CopyError> {
    let meta = match fs::metadata(found_path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CopyError::SourceMissing {
                path: found_path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(CopyError::copy_failed(
                found_path.to_path_buf(),
                dest_dir.to_path_buf(),
                e,
            ))
        }
    };

    if !meta.is_file() {
        return Err(CopyError::NotAFile {
            path: found_path.to_path_buf(),
        });
    }

    let original = found_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| CopyError::NoFileName {
            path: found_path.to_path_buf(),
        })?;
    let destination = dest_dir.join(rename_to.apply(&original));

    fs::copy(found_path, &destination).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound && !found_path.exists() {
            CopyError::SourceMissing {
                path: found_path.to_path_buf(),
            }
        } else {
            CopyError::copy_failed(found_path.to_path_buf(), destination.clone(), e)
        }
    })?;

    Ok(destination)
}
