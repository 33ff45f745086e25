/// Expands one user string into the upstream queries to run for it.
///
/// The catalog only does prefix/substring matching, so a multi-word phrase
/// that is not literally in a card name returns nothing. Issuing the first
/// significant word, the full phrase and the remaining words separately
/// recovers results the phrase alone would miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPlanner;

/// Words of this length or shorter are ignored entirely
const MIN_WORD_CHARS: usize = 1;
/// Words and phrases must be longer than this to become their own query
const MIN_QUERY_CHARS: usize = 2;

impl QueryPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Ordered, duplicate-free list of upstream queries.
    ///
    /// Order: anchor word, full phrase, remaining words. An empty result means
    /// there is no query text at all (the popularity path).
    pub fn plan(&self, raw_text: &str) -> Vec<String> {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let words: Vec<&str> = trimmed
            .split_whitespace()
            .filter(|w| char_len(w) > MIN_WORD_CHARS)
            .collect();

        let mut queries: Vec<String> = Vec::new();

        // Anchor
        if let Some(first) = words.first() {
            if char_len(first) > MIN_QUERY_CHARS {
                push_unique(first, &mut queries);
            }
        }

        // Full phrase
        if char_len(trimmed) > MIN_QUERY_CHARS {
            push_unique(trimmed, &mut queries);
        }

        // Remaining significant words, original order
        for word in words.iter().skip(1) {
            if char_len(word) > MIN_QUERY_CHARS {
                push_unique(word, &mut queries);
            }
        }

        if queries.is_empty() {
            queries.push(trimmed.to_string());
        }

        queries
    }
}

/// Stable de-duplication: keep the first emission, preserve order
fn push_unique(candidate: &str, queries: &mut Vec<String>) {
    if !queries.iter().any(|q| q == candidate) {
        queries.push(candidate.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
