//! Process-wide search service
//!
//! [`SearchService`] owns the active [`ServiceState`] behind an
//! `arc_swap::ArcSwap`. Readers take a cheap `Arc` to the current state and
//! keep it for the whole request; the refresh worker is the only writer and
//! replaces the state in one store.

mod refresh;
mod search_service;

pub use refresh::RefreshOutcome;
pub use search_service::SearchService;

use std::sync::Arc;

use crate::index::IndexSnapshot;
use crate::models::SyncRecord;

/// Snapshot and sync record, published together
#[derive(Clone, Debug)]
pub struct ServiceState {
    pub snapshot: Arc<IndexSnapshot>,
    pub sync: SyncRecord,
}

impl ServiceState {
    pub fn new(snapshot: Arc<IndexSnapshot>, sync: SyncRecord) -> Self {
        Self { snapshot, sync }
    }

    /// Canonical collection ids, ascending
    pub fn manifests(&self) -> Vec<String> {
        self.snapshot.collection_ids()
    }
}
