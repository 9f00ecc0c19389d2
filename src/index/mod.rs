//! In-memory index structures
//!
//! An [`IndexSnapshot`] owns one [`CollectionIndex`] per loaded collection,
//! each pairing a [`DocumentStore`] with its [`TermIndex`], plus the
//! [`CollectionRegistry`] used to resolve names and aliases. Snapshots are
//! produced by the [`IndexBuilder`] and never mutated afterwards.

pub mod builder;
pub mod registry;
pub mod snapshot;
pub mod store;
pub mod term_index;

pub use builder::{BuildStamp, IndexBuilder};
pub use registry::{CollectionRegistry, Scope};
pub use snapshot::{CollectionIndex, IndexSnapshot};
pub use store::DocumentStore;
pub use term_index::{TermIndex, TermPostings};
