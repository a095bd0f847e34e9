//! Bag-of-words cosine similarity
//!
//! Text is lowercased and split into tokens of two or more word characters,
//! the same tokens a default count vectorizer produces. Each comparison
//! builds its own vocabulary from the two texts.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("Invalid token regex"));

/// Lowercased tokens of `text`, in order
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn term_counts(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

/// Cosine of the term-count vectors of `a` and `b`, in `[0, 1]`.
///
/// Returns 0.0 when either text has no tokens.
#[must_use]
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    let counts_a = term_counts(a);
    let counts_b = term_counts(b);
    if counts_a.is_empty() || counts_b.is_empty() {
        return 0.0;
    }

    let dot: f64 = counts_a
        .iter()
        .filter_map(|(term, &count)| {
            counts_b
                .get(term)
                .map(|&other| f64::from(count) * f64::from(other))
        })
        .sum();
    let norm = |counts: &HashMap<String, u32>| {
        counts
            .values()
            .map(|&c| f64::from(c) * f64::from(c))
            .sum::<f64>()
            .sqrt()
    };

    (dot / (norm(&counts_a) * norm(&counts_b))).clamp(0.0, 1.0)
}
