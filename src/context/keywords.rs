//! Query keyword extraction.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Words carrying no retrieval signal: articles, prepositions, and the
/// common imperative verbs of coding requests.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "how", "do", "i", "the", "a", "an", "to", "in", "for", "create", "make", "write", "add",
        "new",
    ]
    .into_iter()
    .collect()
});

/// Derives search keywords from a free-text query.
///
/// Lowercases, strips punctuation, splits on whitespace, drops tokens of
/// length <= 2 and stop words, and deduplicates while preserving first
/// occurrence order.
#[must_use]
pub fn extract_keywords(query: &str) -> Vec<String> {
    let cleaned: String = query
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut keywords: Vec<String> = Vec::new();
    for word in cleaned.split_whitespace() {
        if word.len() <= 2 {
            continue;
        }
        if STOP_WORDS.contains(word) {
            continue;
        }
        // Deduplicate using linear search; keyword lists are tiny.
        if keywords.iter().any(|k| k == word) {
            continue;
        }
        keywords.push(word.to_string());
    }

    keywords
}
