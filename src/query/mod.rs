//! Query parsing and evaluation
//!
//! [`QueryParser`] turns a raw query string into words and quoted phrases,
//! [`QueryEngine`] evaluates them with AND semantics over a scoped set of
//! collections in one snapshot, and [`SpellingSuggester`] proposes
//! replacements for words that match nothing.

pub mod engine;
pub mod parser;
pub mod spelling;

pub use engine::QueryEngine;
pub use parser::{ParsedQuery, QueryParser};
pub use spelling::{levenshtein_distance, SpellingSuggester};
