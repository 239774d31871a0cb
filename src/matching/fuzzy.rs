//! Normalized fuzzy string similarity on a 0–100 scale.
//!
//! Built on `strsim` normalized Levenshtein distance. Inputs are processed
//! first: lowercased, non-alphanumeric characters turned into spaces, and
//! whitespace collapsed. The token and partial variants make the comparison
//! tolerant to word order and to one string being embedded in the other.

use std::collections::BTreeSet;

/// Lowercase, strip punctuation, collapse whitespace.
pub fn process(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain similarity of two already-processed strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best similarity of the shorter string against any equally long window of
/// the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if short.is_empty() {
        return 0.0;
    }
    if short.len() == long.len() {
        return ratio(a, b);
    }

    let needle: String = short.iter().collect();
    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let candidate: String = window.iter().collect();
        best = best.max(ratio(&needle, &candidate));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

struct TokenSets {
    intersection: String,
    only_a: String,
    only_b: String,
}

fn token_sets(a: &str, b: &str) -> TokenSets {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();
    let join = |tokens: Vec<&str>| tokens.join(" ");
    TokenSets {
        intersection: join(set_a.intersection(&set_b).copied().collect()),
        only_a: join(set_a.difference(&set_b).copied().collect()),
        only_b: join(set_b.difference(&set_a).copied().collect()),
    }
}

fn join_non_empty(left: &str, right: &str) -> String {
    format!("{left} {right}").trim().to_string()
}

/// Similarity after sorting the words of both strings.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Similarity based on shared words, ignoring duplicates and order.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let sets = token_sets(a, b);
    if sets.intersection.is_empty() {
        return ratio(&sets.only_a, &sets.only_b);
    }
    if sets.only_a.is_empty() || sets.only_b.is_empty() {
        return 100.0;
    }
    let with_a = join_non_empty(&sets.intersection, &sets.only_a);
    let with_b = join_non_empty(&sets.intersection, &sets.only_b);
    ratio(&sets.intersection, &with_a)
        .max(ratio(&sets.intersection, &with_b))
        .max(ratio(&with_a, &with_b))
}

/// Partial similarity after sorting the words of both strings.
pub fn partial_token_sort_ratio(a: &str, b: &str) -> f64 {
    let (a, b) = (process(a), process(b));
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    partial_ratio(&sorted_tokens(&a), &sorted_tokens(&b))
}

fn partial_token_set_ratio(a: &str, b: &str) -> f64 {
    let sets = token_sets(a, b);
    if !sets.intersection.is_empty() {
        return 100.0;
    }
    partial_ratio(&sets.only_a, &sets.only_b)
}

/// Weighted blend of the ratios above, picking the most favourable strategy
/// for the length difference between the two strings.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    const UNBASE_SCALE: f64 = 0.95;

    let (a, b) = (process(a), process(b));
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (len_a, len_b) = (a.chars().count() as f64, b.chars().count() as f64);
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    let plain = ratio(&a, &b);
    if len_ratio < 1.5 {
        let tokens = token_sort_ratio(&a, &b).max(token_set_ratio(&a, &b));
        return plain.max(tokens * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    let partial = partial_ratio(&a, &b) * partial_scale;
    let tokens = partial_ratio(&sorted_tokens(&a), &sorted_tokens(&b))
        .max(partial_token_set_ratio(&a, &b))
        * UNBASE_SCALE
        * partial_scale;
    plain.max(partial).max(tokens)
}
