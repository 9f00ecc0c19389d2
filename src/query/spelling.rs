use std::collections::HashMap;

use crate::index::IndexSnapshot;

/// Calculate Levenshtein edit distance between two strings
///
/// Uses a two-row DP table, counting in chars rather than bytes.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let (shorter, longer, short_len, long_len) = if len1 <= len2 {
        (&s1_chars, &s2_chars, len1, len2)
    } else {
        (&s2_chars, &s1_chars, len2, len1)
    };

    let mut prev_row: Vec<usize> = (0..=short_len).collect();
    let mut curr_row = vec![0; short_len + 1];

    for i in 1..=long_len {
        curr_row[0] = i;

        for j in 1..=short_len {
            let cost = if longer[i - 1] == shorter[j - 1] { 0 } else { 1 };

            curr_row[j] = std::cmp::min(
                std::cmp::min(
                    prev_row[j] + 1,     // deletion
                    curr_row[j - 1] + 1, // insertion
                ),
                prev_row[j - 1] + cost, // substitution
            );
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[short_len]
}

/// Proposes replacements for query words drawn from the scoped vocabulary
pub struct SpellingSuggester<'a> {
    snapshot: &'a IndexSnapshot,
    collections: &'a [String],
    max_distance: usize,
}

impl<'a> SpellingSuggester<'a> {
    pub fn new(
        snapshot: &'a IndexSnapshot,
        collections: &'a [String],
        max_distance: usize,
    ) -> Self {
        Self {
            snapshot,
            collections,
            max_distance,
        }
    }

    /// Closest vocabulary word to `word`
    ///
    /// Candidates are ranked by edit distance, then by how many documents in
    /// scope contain them, then alphabetically. The word itself is never
    /// suggested.
    pub fn suggest(&self, word: &str) -> Option<String> {
        if self.max_distance == 0 {
            return None;
        }

        let word_len = word.chars().count();
        let mut doc_freq: HashMap<&str, u32> = HashMap::new();
        for id in self.collections {
            if let Some(collection) = self.snapshot.collection(id) {
                for (candidate, df) in collection.terms.vocabulary() {
                    *doc_freq.entry(candidate).or_insert(0) += df;
                }
            }
        }

        let mut best: Option<(usize, u32, &str)> = None;
        for (candidate, df) in doc_freq {
            if candidate == word
                || candidate.chars().count().abs_diff(word_len) > self.max_distance
            {
                continue;
            }
            let distance = levenshtein_distance(word, candidate);
            if distance > self.max_distance {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_distance, best_df, best_word)) => {
                    (distance, std::cmp::Reverse(df), candidate)
                        < (best_distance, std::cmp::Reverse(best_df), best_word)
                }
            };
            if better {
                best = Some((distance, df, candidate));
            }
        }

        best.map(|(_, _, candidate)| candidate.to_string())
    }
}
