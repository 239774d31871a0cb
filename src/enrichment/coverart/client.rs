//! HTTP image client
//!
//! Downloads cover art from a URL. No API key required, but the Cover Art
//! Archive redirects to its image host, so redirects are followed.

use async_trait::async_trait;
use tracing::debug;

use crate::enrichment::domain::ServiceError;
use crate::enrichment::traits::CoverArtFetcher;

/// Largest image we accept, in bytes.
const MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024;

/// Cover art fetcher backed by reqwest
pub struct HttpCoverArtFetcher {
    http_client: reqwest::Client,
}

impl HttpCoverArtFetcher {
    /// Create a new fetcher
    pub fn new() -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        Ok(Self { http_client })
    }

    /// Download an image from a URL
    async fn download_image(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ServiceError::NoMatches);
        }

        if !status.is_success() {
            return Err(ServiceError::http(status));
        }

        let is_image = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(|ct| ct.starts_with("image/") || ct == "application/octet-stream");
        if !is_image {
            return Err(ServiceError::Parse(format!("{url} is not an image")));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        if data.is_empty() || data.len() > MAX_IMAGE_BYTES {
            return Err(ServiceError::Parse(format!(
                "Unexpected image size: {} bytes",
                data.len()
            )));
        }

        debug!(url, bytes = data.len(), "Downloaded cover art");
        Ok(data.to_vec())
    }
}

#[async_trait]
impl CoverArtFetcher for HttpCoverArtFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        self.download_image(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(HttpCoverArtFetcher::new().is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_is_network_error() {
        let fetcher = HttpCoverArtFetcher::new().unwrap();
        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(ServiceError::Network(_))));
    }
}
