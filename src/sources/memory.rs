use parking_lot::RwLock;

use super::SourceLoader;
use crate::error::{DocsiftError, Result};
use crate::models::CollectionSource;

/// In-memory sources that can be swapped at runtime
///
/// Useful for embedding and for driving refreshes in tests. A failure can be
/// injected with [`StaticSourceLoader::fail_with`] to simulate an unreachable
/// manifest store.
#[derive(Default)]
pub struct StaticSourceLoader {
    sources: RwLock<Vec<CollectionSource>>,
    failure: RwLock<Option<String>>,
}

impl StaticSourceLoader {
    pub fn new(sources: Vec<CollectionSource>) -> Self {
        Self {
            sources: RwLock::new(sources),
            failure: RwLock::new(None),
        }
    }

    /// Replace the sources returned by subsequent loads
    pub fn replace(&self, sources: Vec<CollectionSource>) {
        *self.sources.write() = sources;
    }

    /// Make subsequent loads fail with `message`
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write() = Some(message.into());
    }

    pub fn clear_failure(&self) {
        *self.failure.write() = None;
    }
}

impl SourceLoader for StaticSourceLoader {
    fn load(&self) -> Result<Vec<CollectionSource>> {
        if let Some(message) = self.failure.read().as_ref() {
            return Err(DocsiftError::SourceLoad(message.clone()));
        }
        Ok(self.sources.read().clone())
    }

    fn describe(&self) -> String {
        format!("static:{} collections", self.sources.read().len())
    }
}
