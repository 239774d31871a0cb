//! Turning a recognition answer into field changes.

use crate::enrichment::RecognizedSong;
use crate::matching::fuzzy::partial_token_sort_ratio;
use crate::model::{FieldUpdate, SongChanges, SongFields, normalize_label};
use crate::organizer::capitalize_first;

/// Confidence that a candidate is the song described by the working labels.
///
/// Title similarity weighs twice as much as artist similarity. When the
/// artist barely matches but the title alone clears the threshold, the
/// working title probably embeds the artist name (typical of video titles),
/// so the candidate title is compared against `"artist - title"` instead.
pub fn confidence(
    working_artist: Option<&str>,
    working_title: Option<&str>,
    candidate_artist: &str,
    candidate_title: &str,
    threshold: u8,
) -> u8 {
    let threshold = f64::from(threshold);
    let artist_score = partial_token_sort_ratio(working_artist.unwrap_or_default(), candidate_artist);
    let title_score = partial_token_sort_ratio(working_title.unwrap_or_default(), candidate_title);

    let score = if artist_score < 2.0 * threshold / 3.0 && title_score >= threshold {
        partial_token_sort_ratio(
            candidate_title,
            &format!("{candidate_artist} - {candidate_title}"),
        )
    } else {
        (artist_score + 2.0 * title_score) / 3.0
    };
    score.clamp(0.0, 100.0) as u8
}

/// Field changes for a recognition answer.
///
/// No candidate records a score of 0 and nothing else. A candidate always
/// lands in the recognition fields with a score of at least 1; it is
/// promoted to the working fields only when its confidence reaches
/// `threshold`.
pub fn recognition_changes(
    fields: &SongFields,
    candidate: Option<&RecognizedSong>,
    threshold: u8,
) -> SongChanges {
    let labels = candidate.and_then(|c| {
        let artist = normalize_label(&capitalize_first(c.artist.trim()))?;
        let title = normalize_label(&capitalize_first(c.title.trim()))?;
        Some((artist, title, c.cover_art_url.clone()))
    });

    let Some((artist, title, cover_art_url)) = labels else {
        return SongChanges {
            shazam_match_score: FieldUpdate::Set(0),
            ..Default::default()
        };
    };

    let score = confidence(
        fields.artist.as_deref(),
        fields.title.as_deref(),
        &artist,
        &title,
        threshold,
    )
    .max(1);

    let mut changes = SongChanges {
        shazam_artist: FieldUpdate::Set(artist.clone()),
        shazam_title: FieldUpdate::Set(title.clone()),
        shazam_cover_art_url: FieldUpdate::from(cover_art_url.clone()),
        shazam_match_score: FieldUpdate::Set(score),
        ..Default::default()
    };

    if score >= threshold {
        changes.artist = FieldUpdate::Set(artist);
        changes.title = FieldUpdate::Set(title);
        if let Some(url) = cover_art_url {
            changes.cover_art_url = FieldUpdate::Set(url);
        }
    }
    changes
}
