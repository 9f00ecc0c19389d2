use std::collections::HashMap;

use crate::models::{DocumentId, SearchHit, StoredDocument};

/// Immutable set of documents belonging to one collection
///
/// Documents keep the order in which the source delivered them; that order
/// is the final ranking tie-breaker.
#[derive(Clone, Debug, Default)]
pub struct DocumentStore {
    documents: Vec<StoredDocument>,
    by_url: HashMap<String, DocumentId>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document; returns `None` if its url is already present
    pub(crate) fn push(
        &mut self,
        title: String,
        preview: String,
        url: String,
        searchable_text: String,
    ) -> Option<DocumentId> {
        if self.by_url.contains_key(&url) {
            return None;
        }

        let id = self.documents.len() as DocumentId;
        self.by_url.insert(url.clone(), id);
        self.documents.push(StoredDocument {
            id,
            title,
            preview,
            url,
            searchable_text,
        });
        Some(id)
    }

    pub fn get(&self, id: DocumentId) -> Option<&StoredDocument> {
        self.documents.get(id as usize)
    }

    #[cfg(test)]
    pub(crate) fn find_by_url(&self, url: &str) -> Option<&StoredDocument> {
        self.by_url.get(url).and_then(|id| self.get(*id))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Project a stored document into the client-facing hit shape
    pub fn hit(&self, id: DocumentId) -> Option<SearchHit> {
        self.get(id).map(|doc| SearchHit {
            title: doc.title.clone(),
            preview: doc.preview.clone(),
            url: doc.url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_sequential_ids() {
        let mut store = DocumentStore::new();
        let a = store.push("A".into(), "".into(), "https://x/a".into(), "a".into());
        let b = store.push("B".into(), "".into(), "https://x/b".into(), "b".into());

        assert_eq!(a, Some(0));
        assert_eq!(b, Some(1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.find_by_url("https://x/b").unwrap().title, "B");
    }

    #[test]
    fn test_duplicate_url_rejected() {
        let mut store = DocumentStore::new();
        store.push("A".into(), "".into(), "https://x/a".into(), "a".into());
        let dup = store.push("A2".into(), "".into(), "https://x/a".into(), "a".into());

        assert!(dup.is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().title, "A");
    }

    #[test]
    fn test_hit_projection() {
        let mut store = DocumentStore::new();
        store.push(
            "Connect".into(),
            "How to connect".into(),
            "https://x/connect".into(),
            "connect".into(),
        );

        let hit = store.hit(0).unwrap();
        assert_eq!(hit.title, "Connect");
        assert_eq!(hit.preview, "How to connect");
        assert_eq!(hit.url, "https://x/connect");
        assert!(store.hit(1).is_none());
    }
}
