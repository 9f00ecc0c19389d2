//! docsift: multi-collection document search with live re-indexing
//!
//! Collections are loaded from manifests by a [`SourceLoader`], indexed into
//! an immutable [`IndexSnapshot`] and served by a [`SearchService`] that
//! swaps in a freshly built snapshot whenever a refresh completes. Readers
//! never block on a rebuild and never observe a partially built index.

pub mod api;
pub mod config;
pub mod error;
pub mod freshness;
pub mod index;
pub mod metrics;
pub mod models;
pub mod query;
pub mod service;
pub mod sources;
pub mod tokenizer;

pub use api::{create_router, AppState};
pub use config::{
    FieldWeights, RefreshSettings, ScopePolicy, SearchSettings, ServiceConfig, TokenizerConfig,
};
pub use error::{DocsiftError, Result};
pub use freshness::Freshness;
pub use index::{IndexBuilder, IndexSnapshot};
pub use metrics::SearchMetrics;
pub use models::*;
pub use query::QueryEngine;
pub use service::{RefreshOutcome, SearchService, ServiceState};
pub use sources::{parse_source_spec, DirectorySourceLoader, SourceLoader, StaticSourceLoader};
pub use tokenizer::Tokenizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
