//! HTTP image fetcher.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use crate::config::FetchConfig;

use super::error::FetchError;
use super::naming::reference_file_name;
use super::traits::ImageFetcher;

/// Downloads images with plain GET requests.
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a fetcher sending the configured browser-like headers.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| FetchError::Client(format!("invalid user agent: {}", e)))?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| FetchError::Client(format!("invalid accept language: {}", e)))?,
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Stream the response body to `path` through a `chunk_size` buffer.
    async fn write_body(
        &self,
        url: &str,
        mut response: Response,
        path: &Path,
    ) -> Result<u64, FetchError> {
        let write_failed = |e: std::io::Error| FetchError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        };

        let file = File::create(path).await.map_err(write_failed)?;
        let mut writer = BufWriter::with_capacity(self.config.chunk_size, file);
        let mut total_bytes = 0u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::transport(url, e))?
        {
            writer.write_all(&chunk).await.map_err(write_failed)?;
            total_bytes += chunk.len() as u64;
        }

        writer.flush().await.map_err(write_failed)?;
        Ok(total_bytes)
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, dest_dir: &Path, url: &str) -> Result<PathBuf, FetchError> {
        let file_name = reference_file_name(url).ok_or_else(|| FetchError::NoFileName {
            url: url.to_string(),
        })?;
        let path = dest_dir.join(file_name);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::transport(url, "request timed out")
            } else {
                FetchError::transport(url, e)
            }
        })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        match self.write_body(url, response, &path).await {
            Ok(bytes) => {
                debug!(url, path = %path.display(), bytes, "Image downloaded");
                Ok(path)
            }
            Err(e) => {
                // Never leave a truncated image behind
                if let Err(rm) = fs::remove_file(&path).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %path.display(), error = %rm, "Failed to remove partial download");
                    }
                }
                Err(e)
            }
        }
    }
}
