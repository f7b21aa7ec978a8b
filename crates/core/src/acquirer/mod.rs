//! Acquirer module for materializing product images in order directories.
//!
//! An image is either copied from a local reference library or downloaded
//! from a URL, then given its final name according to the strategy in use.
//!
//! # Example
//!
//! ```ignore
//! use orderpix_core::acquirer::{fetch_and_name, FileNaming, HttpFetcher};
//!
//! let fetcher = HttpFetcher::new(FetchConfig::default())?;
//! let placed = fetch_and_name(
//!     &fetcher,
//!     Path::new("downloads/multi_remote/ORD-1"),
//!     "https://cdn.example.com/items/A_bcd.jpg",
//!     FileNaming::OrderPrefixed("ORD-1"),
//! )
//! .await?;
//! assert!(placed.ends_with("ORD-1_A_bcd.jpg"));
//! ```

mod error;
mod http_fetcher;
mod local;
mod naming;
mod traits;

pub use error::{CopyError, FetchError};
pub use http_fetcher::HttpFetcher;
pub use local::copy_local;
pub use naming::{
    order_file_name, reference_file_name, single_remote_file_name, FileNaming,
};
pub use traits::ImageFetcher;

use std::path::{Path, PathBuf};
use tokio::fs;

/// Fetch `url` into `dest_dir`, then rename the file according to `naming`.
pub async fn fetch_and_name<F>(
    fetcher: &F,
    dest_dir: &Path,
    url: &str,
    naming: FileNaming<'_>,
) -> Result<PathBuf, FetchError>
where
    F: ImageFetcher + ?Sized,
{
    let fetched = fetcher.fetch(dest_dir, url).await?;

    let original = fetched
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| FetchError::NoFileName {
            url: url.to_string(),
        })?;
    let renamed = dest_dir.join(naming.apply(&original));

    if renamed != fetched {
        fs::rename(&fetched, &renamed)
            .await
            .map_err(|e| FetchError::RenameFailed {
                from: fetched.clone(),
                to: renamed.clone(),
                source: e,
            })?;
    }

    Ok(renamed)
}
