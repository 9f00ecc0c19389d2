//! Manifest sources
//!
//! A [`SourceLoader`] produces the raw collections the index is built from.
//! It is called once at startup and again on every refresh.

mod directory;
mod memory;

pub use directory::DirectorySourceLoader;
pub use memory::StaticSourceLoader;

use crate::error::{DocsiftError, Result};
use crate::models::CollectionSource;

/// Provider of raw collection sources
pub trait SourceLoader: Send + Sync {
    /// Load every collection, in a stable order
    fn load(&self) -> Result<Vec<CollectionSource>>;

    /// Human-readable location, used in logs
    fn describe(&self) -> String;
}

/// Build a loader from a `protocol:location` spec such as `dir:./manifests`
pub fn parse_source_spec(spec: &str) -> Result<Box<dyn SourceLoader>> {
    match spec.split_once(':') {
        Some(("dir", path)) if !path.is_empty() => Ok(Box::new(DirectorySourceLoader::new(path))),
        Some((protocol, _)) => Err(DocsiftError::UnknownSourceProtocol(protocol.to_string())),
        None => Err(DocsiftError::UnknownSourceProtocol(spec.to_string())),
    }
}
