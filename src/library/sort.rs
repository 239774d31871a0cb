//! Deterministic orderings for folders and songs.
//!
//! Folder listings must index the same way on every machine, so they sort on
//! a lowercase slug rather than the raw name. Songs sort naturally: digit
//! runs compare by value, so `Track 2` comes before `Track 10`.

use std::cmp::Ordering;

use crate::song::Song;

/// Lowercase slug of a name: alphanumeric runs joined by `-`.
pub fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Compare two folder names by slug, then by raw name.
pub fn folder_cmp(a: &str, b: &str) -> Ordering {
    slug(a).cmp(&slug(b)).then_with(|| a.cmp(b))
}

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(String),
}

fn chunks(text: &str) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while let Some(first) = rest.chars().next() {
        let digits = first.is_ascii_digit();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        chunks.push(if digits {
            Chunk::Digits(chunk)
        } else {
            Chunk::Text(chunk.to_lowercase())
        });
        rest = tail;
    }
    chunks
}

fn digits_cmp(a: &str, b: &str) -> Ordering {
    let a_value = a.trim_start_matches('0');
    let b_value = b.trim_start_matches('0');
    a_value
        .len()
        .cmp(&b_value.len())
        .then_with(|| a_value.cmp(b_value))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Case-insensitive comparison treating digit runs as numbers.
///
/// Falls back to the raw strings so distinct inputs never compare equal.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a_chunks, b_chunks) = (chunks(a), chunks(b));
    for (x, y) in a_chunks.iter().zip(&b_chunks) {
        let ordering = match (x, y) {
            (Chunk::Digits(x), Chunk::Digits(y)) => digits_cmp(x, y),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a_chunks
        .len()
        .cmp(&b_chunks.len())
        .then_with(|| a.cmp(b))
}

/// Sort songs by `"artist - title"`, then by playlist folder.
pub fn sort_songs(songs: &mut [Song]) {
    songs.sort_by(|a, b| {
        natural_cmp(&a.song_name(), &b.song_name())
            .then_with(|| a.playlist().unwrap_or_default().cmp(b.playlist().unwrap_or_default()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Road Trip [PL123]"), "road-trip-pl123");
        assert_eq!(slug("  --Été!! 2024 "), "été-2024");
        assert_eq!(slug("!!!"), "");
    }

    #[test]
    fn test_folder_order_ignores_case_and_punctuation() {
        let mut folders = vec!["b-Side [PL2]", "A side [PL3]", "a_side [PL1]"];
        folders.sort_by(|a, b| folder_cmp(a, b));
        assert_eq!(folders, vec!["a_side [PL1]", "A side [PL3]", "b-Side [PL2]"]);
    }

    #[test]
    fn test_natural_order() {
        let mut names = vec!["Track 10", "track 2", "Track 1", "Album", "Track 02"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["Album", "Track 1", "track 2", "Track 02", "Track 10"]);
    }

    #[test]
    fn test_natural_order_blank_labels_first() {
        assert_eq!(natural_cmp(" - ", "ABBA - Waterloo"), Ordering::Less);
    }

    proptest! {
        #[test]
        fn natural_cmp_is_antisymmetric(a in "[a-zA-Z0-9 ]{0,12}", b in "[a-zA-Z0-9 ]{0,12}") {
            prop_assert_eq!(natural_cmp(&a, &b), natural_cmp(&b, &a).reverse());
        }

        #[test]
        fn natural_cmp_equal_only_for_same_string(a in "[a-zA-Z0-9 ]{0,12}", b in "[a-zA-Z0-9 ]{0,12}") {
            prop_assert_eq!(natural_cmp(&a, &b) == Ordering::Equal, a == b);
        }
    }
}
