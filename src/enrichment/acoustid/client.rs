//! AcoustID HTTP client
//!
//! Handles communication with the AcoustID web service.
//! See: https://acoustid.org/webservice
//!
//! The `meta` parameter uses a literal `+` as separator. reqwest's `.query()`
//! would encode it as `%2B`, which the API ignores, so the URL is built by
//! hand with only the values percent-encoded.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{adapter, dto};
use crate::enrichment::domain::{AudioFingerprint, RecognizedSong, ServiceError};
use crate::enrichment::fingerprint;
use crate::enrichment::traits::SongRecognizer;

/// AcoustID results below this confidence are not trusted
const MIN_RESULT_SCORE: f32 = 0.5;

/// AcoustID API client
pub struct AcoustIdClient {
    api_key: String,
    http_client: reqwest::Client,
    base_url: String,
}

impl AcoustIdClient {
    /// Create a new client with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            http_client,
            base_url: "https://api.acoustid.org/v2/lookup".to_string(),
        })
    }

    fn lookup_url(&self, fingerprint: &AudioFingerprint) -> String {
        format!(
            "{}?client={}&duration={}&fingerprint={}&meta=recordings+releaseids",
            self.base_url,
            urlencoding::encode(&self.api_key),
            fingerprint.duration_secs,
            urlencoding::encode(&fingerprint.fingerprint)
        )
    }

    /// Look up a fingerprint
    pub async fn lookup(
        &self,
        fingerprint: &AudioFingerprint,
    ) -> Result<dto::LookupResponse, ServiceError> {
        let response = self
            .http_client
            .get(self.lookup_url(fingerprint))
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Http {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        response
            .json::<dto::LookupResponse>()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }
}

/// Recognizer built on a local Chromaprint fingerprint and an AcoustID
/// lookup. Cover art comes from the Cover Art Archive.
pub struct AcoustIdRecognizer {
    client: AcoustIdClient,
}

impl AcoustIdRecognizer {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ServiceError> {
        Ok(Self {
            client: AcoustIdClient::new(api_key)?,
        })
    }
}

#[async_trait]
impl SongRecognizer for AcoustIdRecognizer {
    async fn recognize(&self, path: &Path) -> Result<Option<RecognizedSong>, ServiceError> {
        let path: PathBuf = path.to_path_buf();
        let fp = tokio::task::spawn_blocking(move || fingerprint::generate_fingerprint(&path))
            .await
            .map_err(|e| ServiceError::Tool(e.to_string()))??;

        let response = self.client.lookup(&fp).await?;
        let candidate = adapter::best_match(response, MIN_RESULT_SCORE)?;
        debug!(found = candidate.is_some(), "AcoustID lookup done");
        Ok(candidate)
    }
}
