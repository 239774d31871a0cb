//! Adapter layer: Convert AcoustID DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.

use std::cmp::Ordering;

use super::dto;
use crate::enrichment::domain::{RecognizedSong, ServiceError};

const COVER_ART_ARCHIVE: &str = "https://coverartarchive.org";

/// Pick the best recording of a lookup response.
///
/// Results below `min_score` are ignored, as are recordings without a title
/// or an artist. `Ok(None)` means nothing usable was found.
pub fn best_match(
    response: dto::LookupResponse,
    min_score: f32,
) -> Result<Option<RecognizedSong>, ServiceError> {
    if response.status != "ok" {
        let message = response
            .error
            .map(|e| format!("AcoustID error {}: {}", e.code, e.message))
            .unwrap_or_else(|| "Unknown AcoustID error".to_string());
        return Err(ServiceError::Parse(message));
    }

    let mut results: Vec<dto::LookupResult> = response
        .results
        .into_iter()
        .filter(|r| r.score >= min_score)
        .collect();
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    Ok(results
        .into_iter()
        .flat_map(|r| r.recordings)
        .find_map(to_recognized_song))
}

fn to_recognized_song(recording: dto::Recording) -> Option<RecognizedSong> {
    let title = recording.title.filter(|t| !t.trim().is_empty())?;
    let artist = join_artists(&recording.artists)?;
    let cover_art_url = recording
        .releases
        .first()
        .map(|release| format!("{COVER_ART_ARCHIVE}/release/{}/front-500", release.id));

    Some(RecognizedSong {
        title,
        artist,
        cover_art_url,
    })
}

fn join_artists(artists: &[dto::Artist]) -> Option<String> {
    let mut joined = String::new();
    for (i, artist) in artists.iter().enumerate() {
        joined.push_str(&artist.name);
        if i + 1 < artists.len() {
            joined.push_str(artist.joinphrase.as_deref().unwrap_or(", "));
        }
    }
    let joined = joined.trim().to_string();
    (!joined.is_empty()).then_some(joined)
}
