use roaring::RoaringBitmap;
use std::collections::{BTreeMap, HashMap};

use crate::models::DocumentId;

/// Postings for one term: matching documents and their field-weighted frequency
#[derive(Clone, Debug, Default)]
pub struct TermPostings {
    pub docs: RoaringBitmap,
    weights: HashMap<DocumentId, f32>,
}

impl TermPostings {
    fn add(&mut self, doc_id: DocumentId, weight: f32) {
        self.docs.insert(doc_id);
        *self.weights.entry(doc_id).or_insert(0.0) += weight;
    }

    /// Accumulated weight of this term in `doc_id`, zero when absent
    pub fn weight(&self, doc_id: DocumentId) -> f32 {
        self.weights.get(&doc_id).copied().unwrap_or(0.0)
    }

    pub fn doc_frequency(&self) -> u64 {
        self.docs.len()
    }
}

/// Inverted index for a single collection
///
/// Besides term postings it keeps the surface vocabulary (lowercased words as
/// they appeared, before stemming) with document frequencies, which is what
/// spelling suggestions are drawn from.
#[derive(Clone, Debug, Default)]
pub struct TermIndex {
    postings: HashMap<String, TermPostings>,
    vocabulary: BTreeMap<String, u32>,
}

impl TermIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_term(&mut self, term: &str, doc_id: DocumentId, weight: f32) {
        self.postings
            .entry(term.to_string())
            .or_default()
            .add(doc_id, weight);
    }

    /// Count one more document containing `surface`
    pub(crate) fn record_surface(&mut self, surface: &str) {
        *self.vocabulary.entry(surface.to_string()).or_insert(0) += 1;
    }

    pub fn postings(&self, term: &str) -> Option<&TermPostings> {
        self.postings.get(term)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.postings
            .get(term)
            .map(|p| !p.docs.is_empty())
            .unwrap_or(false)
    }

    pub fn weight(&self, term: &str, doc_id: DocumentId) -> f32 {
        self.postings
            .get(term)
            .map(|p| p.weight(doc_id))
            .unwrap_or(0.0)
    }

    /// Surface words and the number of documents each occurs in, sorted by word
    pub fn vocabulary(&self) -> impl Iterator<Item = (&str, u32)> {
        self.vocabulary.iter().map(|(w, df)| (w.as_str(), *df))
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }
}
