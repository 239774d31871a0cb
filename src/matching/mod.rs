//! Keyword relevance scoring for songs.
//!
//! [`score`] rates how well a song's artist and title match a keyword query.
//! [`normalize`] rescales a batch of raw scores to 0–100 so a single
//! threshold means the same thing whatever the query.
//!
//! # Scoring
//!
//! Keywords are weighted by position, the first one heaviest. A keyword found
//! verbatim in `"artist title"` earns its full weight; otherwise the query
//! prefix consumed so far is fuzzy-matched against artist, title and both
//! together. Longer queries get a more lenient per-keyword threshold and a
//! smaller length penalty.

pub mod fuzzy;

use std::cmp::Ordering;

/// Score given to every song when there are no keywords.
pub const MAX_SCORE: f64 = 100.0;

/// Raw relevance of a song for a keyword query. Always `>= 0`.
pub fn score(artist: Option<&str>, title: Option<&str>, keywords: &str) -> f64 {
    let keywords: Vec<String> = keywords
        .split_whitespace()
        .map(|k| k.to_lowercase())
        .collect();
    if keywords.is_empty() {
        return MAX_SCORE;
    }

    let artist = artist.unwrap_or_default().to_lowercase();
    let title = title.unwrap_or_default().to_lowercase();
    let song_name = format!("{artist} {title}").trim().to_string();

    let count = keywords.len();
    let leniency = MAX_SCORE - 10.0 * count as f64;

    let mut total = 0.0;
    let mut weight_sum = 0.0;
    let mut penalty = 0.0;
    let mut stacked = String::new();

    for (position, keyword) in keywords.iter().enumerate() {
        let weight = (count - position) as f64;
        weight_sum += weight;
        if !stacked.is_empty() {
            stacked.push(' ');
        }
        stacked.push_str(keyword);

        if song_name.contains(keyword.as_str()) {
            total += MAX_SCORE * weight;
            continue;
        }

        let fuzzy = (fuzzy::weighted_ratio(&stacked, &artist)
            + fuzzy::weighted_ratio(&stacked, &title)
            + 3.0 * fuzzy::weighted_ratio(&stacked, &song_name))
            / 5.0;
        if fuzzy < leniency {
            penalty += weight;
        }
        total += fuzzy * weight;
    }

    let aggressiveness = 50.0 * (-(std::f64::consts::LN_2 / 3.0) * weight_sum).exp();
    (total / weight_sum - aggressiveness - 10.0 * penalty).max(0.0)
}

/// Rescale a batch of raw scores and keep those reaching `threshold`.
///
/// Non-positive scores are dropped first. The survivors are stretched with
/// `100 * sqrt((raw - min) / (max - min))` (left as-is when they are all
/// equal), filtered, and returned best first. Ties keep their input order.
pub fn normalize<T>(scored: Vec<(T, f64)>, threshold: f64) -> Vec<(T, f64)> {
    let mut kept: Vec<(T, f64)> = scored.into_iter().filter(|(_, s)| *s > 0.0).collect();
    if kept.is_empty() {
        return kept;
    }

    kept.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let max = kept.first().map(|(_, s)| *s).unwrap_or_default();
    let min = kept.last().map(|(_, s)| *s).unwrap_or_default();
    let range = max - min;

    kept.into_iter()
        .map(|(item, raw)| {
            let normalized = if range > 0.0 {
                (MAX_SCORE * ((raw - min) / range).sqrt()).min(MAX_SCORE)
            } else {
                raw
            };
            (item, normalized)
        })
        .filter(|(_, s)| *s >= threshold)
        .collect()
}
