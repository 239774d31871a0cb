//! Internal domain models for the external collaborators.
//!
//! These types are OUR types - they don't change when external APIs change.
//! Service responses get converted into these types by the clients.

use crate::model::SongId;

/// Song proposed by the recognition service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedSong {
    /// Track title
    pub title: String,
    /// Performing artist (the service's "subtitle")
    pub artist: String,
    /// Cover art reference, when the service has one
    pub cover_art_url: Option<String>,
}

/// Metadata of a source video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub id: SongId,
    /// Channel or uploader name
    pub author: Option<String>,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Audio fingerprint for a song file
#[derive(Debug, Clone)]
pub struct AudioFingerprint {
    /// The fingerprint string (Chromaprint format)
    pub fingerprint: String,
    /// Duration of the audio in seconds (required by AcoustID)
    pub duration_secs: u32,
}

/// Errors raised by external collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("External tool failed: {0}")]
    Tool(String),

    #[error("No matches found")]
    NoMatches,
}

impl ServiceError {
    /// Build an HTTP error from a status code.
    pub fn http(status: reqwest::StatusCode) -> Self {
        Self::Http {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}
