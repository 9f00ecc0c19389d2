use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{CollectionRegistry, DocumentStore, TermIndex};
use crate::models::Timestamp;
use crate::tokenizer::Tokenizer;

/// Documents and terms for one collection
#[derive(Clone, Debug)]
pub struct CollectionIndex {
    pub id: String,
    pub base_url: String,
    pub store: DocumentStore,
    pub terms: TermIndex,
}

impl CollectionIndex {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            store: DocumentStore::new(),
            terms: TermIndex::new(),
        }
    }
}

/// Immutable, fully built index over every loaded collection
///
/// Readers hold an `Arc<IndexSnapshot>` for the duration of a request; a
/// refresh publishes a new snapshot and never touches an existing one.
pub struct IndexSnapshot {
    pub collections: BTreeMap<String, CollectionIndex>,
    pub registry: CollectionRegistry,
    /// Whole-second build stamp, strictly increasing across publications
    pub built_at: Timestamp,
    pub generation: u64,
    pub tokenizer: Arc<Tokenizer>,
}

impl IndexSnapshot {
    /// Snapshot with no collections, used before anything has been built
    pub fn empty(tokenizer: Arc<Tokenizer>) -> Self {
        Self {
            collections: BTreeMap::new(),
            registry: CollectionRegistry::new(),
            built_at: DateTime::<Utc>::UNIX_EPOCH,
            generation: 0,
            tokenizer,
        }
    }

    pub fn collection(&self, id: &str) -> Option<&CollectionIndex> {
        self.collections.get(id)
    }

    pub fn collection_ids(&self) -> Vec<String> {
        self.registry.list_collections()
    }

    pub fn document_count(&self) -> usize {
        self.collections.values().map(|c| c.store.len()).sum()
    }
}

impl std::fmt::Debug for IndexSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSnapshot")
            .field("collections", &self.collections.keys().collect::<Vec<_>>())
            .field("documents", &self.document_count())
            .field("built_at", &self.built_at)
            .field("generation", &self.generation)
            .finish()
    }
}
