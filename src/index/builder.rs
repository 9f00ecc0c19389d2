use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::{CollectionIndex, CollectionRegistry, IndexSnapshot};
use crate::config::{FieldWeights, SearchSettings};
use crate::error::{DocsiftError, Result};
use crate::models::{join_url, CollectionSource, DocumentId, RawDocument, Timestamp};
use crate::tokenizer::Tokenizer;

/// Identity assigned to a snapshot at publication time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildStamp {
    pub generation: u64,
    pub built_at: Timestamp,
}

/// Turns collection sources into an [`IndexSnapshot`]
///
/// Building is a pure function of the sources, the settings and the stamp;
/// any validation failure aborts the whole build.
pub struct IndexBuilder {
    tokenizer: Arc<Tokenizer>,
    weights: FieldWeights,
}

impl IndexBuilder {
    pub fn new(settings: &SearchSettings) -> Self {
        Self {
            tokenizer: Arc::new(Tokenizer::new(&settings.tokenizer_config)),
            weights: settings.field_weights.clone(),
        }
    }

    pub fn tokenizer(&self) -> Arc<Tokenizer> {
        Arc::clone(&self.tokenizer)
    }

    pub fn build(&self, sources: &[CollectionSource], stamp: BuildStamp) -> Result<IndexSnapshot> {
        let start = Instant::now();
        let mut registry = CollectionRegistry::new();
        let mut collections = BTreeMap::new();

        for source in sources {
            registry.register(&source.id, &source.aliases, source.include_in_global_search)?;
            let collection = self.build_collection(source)?;
            debug!(
                collection = %source.id,
                documents = collection.store.len(),
                terms = collection.terms.term_count(),
                "Indexed collection"
            );
            collections.insert(source.id.clone(), collection);
        }

        let snapshot = IndexSnapshot {
            collections,
            registry,
            built_at: stamp.built_at,
            generation: stamp.generation,
            tokenizer: self.tokenizer(),
        };

        info!(
            generation = stamp.generation,
            collections = snapshot.collections.len(),
            documents = snapshot.document_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built index snapshot"
        );
        Ok(snapshot)
    }

    fn build_collection(&self, source: &CollectionSource) -> Result<CollectionIndex> {
        let mut collection = CollectionIndex::new(&source.id, &source.base_url);

        for raw in &source.documents {
            let url = join_url(&source.base_url, &raw.slug);
            let doc_id = collection
                .store
                .push(
                    raw.title.clone(),
                    raw.preview.clone(),
                    url.clone(),
                    searchable_text(raw),
                )
                .ok_or_else(|| {
                    DocsiftError::malformed(&source.id, format!("duplicate document url '{}'", url))
                })?;

            self.index_document(&mut collection, doc_id, raw);
        }

        Ok(collection)
    }

    fn index_document(
        &self,
        collection: &mut CollectionIndex,
        doc_id: DocumentId,
        raw: &RawDocument,
    ) {
        let headings = raw.headings.join(" ");
        let fields = [
            (raw.title.as_str(), self.weights.title),
            (headings.as_str(), self.weights.headings),
            (raw.tags.as_str(), self.weights.tags),
            (raw.text.as_str(), self.weights.text),
        ];

        let mut surfaces = HashSet::new();
        for (text, weight) in fields {
            for token in self.tokenizer.analyze(text) {
                collection.terms.add_term(&token.term, doc_id, weight);
                surfaces.insert(token.surface);
            }
        }

        for surface in &surfaces {
            collection.terms.record_surface(surface);
        }
    }
}

/// Lowercased, whitespace-normalized fields joined by newlines
///
/// Phrases never contain a newline, so a phrase cannot match across fields.
pub(crate) fn searchable_text(raw: &RawDocument) -> String {
    let mut parts = Vec::with_capacity(3 + raw.headings.len());
    parts.push(normalize_whitespace(&raw.title));
    parts.extend(raw.headings.iter().map(|h| normalize_whitespace(h)));
    parts.push(normalize_whitespace(&raw.tags));
    parts.push(normalize_whitespace(&raw.text));
    parts.join("\n").to_lowercase()
}

pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
