pub mod document;
pub mod search;
pub mod sync;

pub use document::{join_url, CollectionSource, DocumentId, RawDocument, StoredDocument};
pub use search::{SearchHit, SearchResults, SpellingCorrections};
pub use sync::{SyncRecord, Timestamp};
