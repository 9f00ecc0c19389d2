use ordered_float::OrderedFloat;
use roaring::RoaringBitmap;
use std::cmp::Ordering;
use tracing::debug;

use super::parser::{ParsedQuery, QueryParser};
use super::spelling::SpellingSuggester;
use crate::config::SearchSettings;
use crate::error::Result;
use crate::index::{CollectionIndex, IndexSnapshot};
use crate::models::{DocumentId, SearchResults, SpellingCorrections};

/// Query word after analysis
#[derive(Clone, Debug)]
struct QueryTerm {
    /// Lowercased word as typed, used as the spelling-correction key
    surface: String,
    /// Analyzed form looked up in the term index
    term: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ScoreEntry<'a> {
    score: OrderedFloat<f32>,
    collection: &'a str,
    doc_id: DocumentId,
}

impl Ord for ScoreEntry<'_> {
    /// Best hit first: higher score, then collection id, then source order
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.collection.cmp(other.collection))
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

impl PartialOrd for ScoreEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Evaluates queries against a single snapshot
///
/// Every word and phrase must match for a document to be returned. Scores
/// are computed per document and do not depend on which other collections
/// are in scope, so searching a union of collections ranks the same way as
/// merging the per-collection results.
pub struct QueryEngine<'a> {
    snapshot: &'a IndexSnapshot,
    settings: &'a SearchSettings,
}

impl<'a> QueryEngine<'a> {
    pub fn new(snapshot: &'a IndexSnapshot, settings: &'a SearchSettings) -> Self {
        Self { snapshot, settings }
    }

    /// Run `raw_query` over the collections named by `scope`
    ///
    /// `scope` is the comma-separated parameter as received; `None` searches
    /// the default scope.
    pub fn search(&self, raw_query: &str, scope: Option<&str>) -> Result<SearchResults> {
        let scope = self
            .snapshot
            .registry
            .resolve_scope(scope, self.settings.scope_policy)?;
        if !scope.unresolved.is_empty() {
            debug!(unresolved = ?scope.unresolved, "Ignoring unknown collections in scope");
        }

        let parsed = QueryParser::parse(raw_query, self.settings.max_query_length);
        if parsed.is_empty() {
            return Ok(SearchResults::empty());
        }

        let terms = self.analyze(&parsed);
        if terms.is_empty() && parsed.phrases.is_empty() {
            // Every word was filtered out by the analyzer
            return Ok(SearchResults::empty());
        }

        let mut entries = Vec::new();
        for id in &scope.collections {
            if let Some(collection) = self.snapshot.collection(id) {
                self.score_collection(collection, &terms, &parsed.phrases, &mut entries);
            }
        }

        entries.sort_unstable();
        entries.truncate(self.settings.max_results);

        let results = entries
            .iter()
            .filter_map(|entry| {
                self.snapshot
                    .collection(entry.collection)
                    .and_then(|c| c.store.hit(entry.doc_id))
            })
            .collect();

        let spelling_corrections = self.corrections(&terms, &scope.collections);

        Ok(SearchResults {
            results,
            spelling_corrections,
        })
    }

    fn analyze(&self, parsed: &ParsedQuery) -> Vec<QueryTerm> {
        let mut terms: Vec<QueryTerm> = Vec::new();
        for word in &parsed.words {
            if let Some(token) = self.snapshot.tokenizer.analyze_word(word) {
                if !terms.iter().any(|t| t.term == token.term) {
                    terms.push(QueryTerm {
                        surface: word.clone(),
                        term: token.term,
                    });
                }
            }
        }
        terms
    }

    fn score_collection<'c>(
        &self,
        collection: &'c CollectionIndex,
        terms: &[QueryTerm],
        phrases: &[String],
        out: &mut Vec<ScoreEntry<'c>>,
    ) {
        let candidates = match self.candidates(collection, terms) {
            Some(candidates) => candidates,
            None => return,
        };

        for doc_id in candidates.iter() {
            let Some(doc) = collection.store.get(doc_id) else {
                continue;
            };

            let mut score: f32 = terms
                .iter()
                .map(|t| collection.terms.weight(&t.term, doc_id))
                .sum();

            let mut all_phrases = true;
            for phrase in phrases {
                let occurrences = doc.searchable_text.matches(phrase.as_str()).count();
                if occurrences == 0 {
                    all_phrases = false;
                    break;
                }
                score += self.settings.phrase_boost * occurrences as f32;
            }

            if all_phrases {
                out.push(ScoreEntry {
                    score: OrderedFloat(score),
                    collection: collection.id.as_str(),
                    doc_id,
                });
            }
        }
    }

    /// Documents containing every word term; all documents when there are none
    fn candidates(
        &self,
        collection: &CollectionIndex,
        terms: &[QueryTerm],
    ) -> Option<RoaringBitmap> {
        if terms.is_empty() {
            let mut all = RoaringBitmap::new();
            all.insert_range(0..collection.store.len() as u32);
            return Some(all);
        }

        let mut postings = Vec::with_capacity(terms.len());
        for term in terms {
            postings.push(&collection.terms.postings(&term.term)?.docs);
        }
        // Intersect smallest first
        postings.sort_by_key(|docs| docs.len());

        let mut iter = postings.into_iter();
        let mut result = iter.next()?.clone();
        for docs in iter {
            result &= docs;
            if result.is_empty() {
                return None;
            }
        }
        Some(result)
    }

    /// Suggestions for words that occur in no collection in scope
    fn corrections(&self, terms: &[QueryTerm], scope: &[String]) -> SpellingCorrections {
        let mut corrections = SpellingCorrections::new();
        let suggester =
            SpellingSuggester::new(self.snapshot, scope, self.settings.max_edit_distance);

        for term in terms {
            let known = scope.iter().any(|id| {
                self.snapshot
                    .collection(id)
                    .map(|c| c.terms.contains_term(&term.term))
                    .unwrap_or(false)
            });
            if !known {
                corrections.insert(term.surface.clone(), suggester.suggest(&term.surface));
            }
        }
        corrections
    }
}
