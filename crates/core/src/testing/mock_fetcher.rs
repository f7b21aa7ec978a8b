//! Mock image fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::acquirer::{reference_file_name, FetchError, ImageFetcher};

/// Scripted outcome for a URL.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Write these bytes under the URL-derived name.
    Body(Vec<u8>),
    /// Fail as if the server answered with this status.
    Status(u16),
    /// Fail as if the connection broke.
    Transport(String),
}

/// A recorded fetch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    pub dest_dir: PathBuf,
    pub url: String,
    pub success: bool,
}

/// Mock implementation of the ImageFetcher trait.
///
/// Unscripted URLs succeed and write a small placeholder body, so tests only
/// describe the failures they care about.
///
/// # Example
///
/// ```rust,ignore
/// use orderpix_core::testing::MockFetcher;
///
/// let fetcher = MockFetcher::new();
/// fetcher.fail_with_status("http://cdn/missing.jpg", 404).await;
///
/// // Run the engine...
///
/// assert_eq!(fetcher.fetch_count().await, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome for a URL.
    pub async fn set_response(&self, url: &str, response: MockResponse) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), response);
    }

    /// Serve the given body for a URL.
    pub async fn serve_bytes(&self, url: &str, body: &[u8]) {
        self.set_response(url, MockResponse::Body(body.to_vec())).await;
    }

    /// Answer a URL with a non-success status.
    pub async fn fail_with_status(&self, url: &str, status: u16) {
        self.set_response(url, MockResponse::Status(status)).await;
    }

    /// Fail a URL with a transport error.
    pub async fn fail_with_transport(&self, url: &str, reason: &str) {
        self.set_response(url, MockResponse::Transport(reason.to_string()))
            .await;
    }

    /// Get all recorded fetches.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Get the number of fetches performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    /// URLs requested, in order.
    pub async fn fetched_urls(&self) -> Vec<String> {
        self.fetches
            .read()
            .await
            .iter()
            .map(|f| f.url.clone())
            .collect()
    }

    async fn respond(&self, dest_dir: &Path, url: &str) -> Result<PathBuf, FetchError> {
        let response = self
            .responses
            .read()
            .await
            .get(url)
            .cloned()
            .unwrap_or_else(|| MockResponse::Body(b"mock-image".to_vec()));

        match response {
            MockResponse::Body(body) => {
                let name = reference_file_name(url).ok_or_else(|| FetchError::NoFileName {
                    url: url.to_string(),
                })?;
                let path = dest_dir.join(name);
                tokio::fs::write(&path, body)
                    .await
                    .map_err(|e| FetchError::WriteFailed {
                        path: path.clone(),
                        source: e,
                    })?;
                Ok(path)
            }
            MockResponse::Status(status) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            MockResponse::Transport(reason) => Err(FetchError::transport(url, reason)),
        }
    }
}

#[async_trait]
impl ImageFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, dest_dir: &Path, url: &str) -> Result<PathBuf, FetchError> {
        let result = self.respond(dest_dir, url).await;

        self.fetches.write().await.push(RecordedFetch {
            dest_dir: dest_dir.to_path_buf(),
            url: url.to_string(),
            success: result.is_ok(),
        });

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_unscripted_url_succeeds() {
        let temp = TempDir::new().unwrap();
        let fetcher = MockFetcher::new();

        let path = fetcher.fetch(temp.path(), "http://cdn/a/b.jpg").await.unwrap();
        assert_eq!(path, temp.path().join("b.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), b"mock-image");
    }

    #[tokio::test]
    async fn test_scripted_responses() {
        let temp = TempDir::new().unwrap();
        let fetcher = MockFetcher::new();
        fetcher.serve_bytes("http://cdn/ok.jpg", b"abc").await;
        fetcher.fail_with_status("http://cdn/404.jpg", 404).await;
        fetcher
            .fail_with_transport("http://cdn/reset.jpg", "connection reset")
            .await;

        let ok = fetcher.fetch(temp.path(), "http://cdn/ok.jpg").await.unwrap();
        assert_eq!(std::fs::read(ok).unwrap(), b"abc");

        let not_found = fetcher.fetch(temp.path(), "http://cdn/404.jpg").await;
        assert!(matches!(not_found, Err(FetchError::Status { status: 404, .. })));

        let reset = fetcher.fetch(temp.path(), "http://cdn/reset.jpg").await;
        assert!(matches!(reset, Err(FetchError::Transport { .. })));

        let fetches = fetcher.recorded_fetches().await;
        assert_eq!(fetches.len(), 3);
        assert!(fetches[0].success);
        assert!(!fetches[1].success);
        assert!(!fetches[2].success);
        assert_eq!(
            fetcher.fetched_urls().await,
            vec!["http://cdn/ok.jpg", "http://cdn/404.jpg", "http://cdn/reset.jpg"]
        );
    }
}
