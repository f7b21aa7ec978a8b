//! Trait definitions for the acquirer module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::FetchError;

/// Something that can download an image into a directory.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Downloads `url` into `dest_dir`, naming the file after the URL's last
    /// path segment. Returns the path of the written file.
    async fn fetch(&self, dest_dir: &Path, url: &str) -> Result<PathBuf, FetchError>;
}
