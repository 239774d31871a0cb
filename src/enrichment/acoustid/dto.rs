//! AcoustID API Data Transfer Objects
//!
//! These types match what the AcoustID lookup endpoint returns with
//! `meta=recordings+releaseids`. Only the adapter converts them to domain
//! types.
//!
//! API Reference: https://acoustid.org/webservice#lookup

use serde::Deserialize;

/// Top-level AcoustID lookup response
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<LookupResult>,
    /// Present when status != "ok"
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
}

/// A single fingerprint match
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResult {
    /// Match confidence (0.0 to 1.0)
    pub score: f32,
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

/// MusicBrainz recording attached to a match
#[derive(Debug, Clone, Deserialize)]
pub struct Recording {
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub releases: Vec<Release>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub name: String,
    /// Text joining this artist to the next one, e.g. " feat. "
    pub joinphrase: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub id: String,
}
