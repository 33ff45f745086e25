use strsim::levenshtein;

/// Strategy for scoring how well a pattern occurs in a text
///
/// Scores run from 0.0 (pattern found verbatim) to 1.0 (nothing in common);
/// lower is better. Implementations must be pure.
pub trait MatchStrategy: Send + Sync {
    fn score(&self, pattern: &str, text: &str) -> f64;

    /// Get the name of this strategy for logging/debugging
    fn name(&self) -> &'static str;
}

/// Edit distance of the pattern against its best-matching substring of the
/// text, divided by the pattern length.
///
/// The match may start anywhere in the text at no cost, so where the pattern
/// occurs does not matter. Extra words in the pattern ("Lugia V Alt Art"
/// against "Lugia V") cost one edit per character and still land under a
/// permissive threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateSubstringStrategy;

impl ApproximateSubstringStrategy {
    /// Fewest edits turning `pattern` into some substring of `text`.
    ///
    /// Windows are tried outward from the pattern length. A window whose
    /// length differs from the pattern by `k` chars costs at least `k`
    /// edits, so the search stops once `k` reaches the best distance found.
    pub fn distance(pattern: &str, text: &str) -> usize {
        let m = pattern.chars().count();
        if m == 0 {
            return 0;
        }

        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();

        // the empty substring
        let mut best = m;
        let mut spread = 0;
        while spread < best {
            let lengths = [Some(m - spread), (spread > 0).then_some(m + spread)];
            for len in lengths.into_iter().flatten() {
                if let Some(d) = best_window(pattern, text, &bounds, len) {
                    best = best.min(d);
                }
            }
            spread += 1;
        }

        best
    }
}

/// Smallest edit distance between `pattern` and any `len`-char window of `text`
fn best_window(pattern: &str, text: &str, bounds: &[usize], len: usize) -> Option<usize> {
    let chars = bounds.len() - 1;
    if len == 0 || len > chars {
        return None;
    }
    (0..=chars - len)
        .map(|start| levenshtein(pattern, &text[bounds[start]..bounds[start + len]]))
        .min()
}

impl MatchStrategy for ApproximateSubstringStrategy {
    fn score(&self, pattern: &str, text: &str) -> f64 {
        let len = pattern.chars().count();
        if len == 0 {
            return 0.0;
        }
        (Self::distance(pattern, text) as f64 / len as f64).min(1.0)
    }

    fn name(&self) -> &'static str {
        "ApproximateSubstring"
    }
}
