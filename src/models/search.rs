use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query term mapped to its suggested replacement (`None` when nothing is close enough)
pub type SpellingCorrections = BTreeMap<String, Option<String>>;

/// A single search hit as returned to clients
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub preview: String,
    pub url: String,
}

/// Ranked hits plus spelling corrections for one query
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub results: Vec<SearchHit>,
    #[serde(rename = "spellingCorrections")]
    pub spelling_corrections: SpellingCorrections,
}

impl SearchResults {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn urls(&self) -> Vec<&str> {
        self.results.iter().map(|hit| hit.url.as_str()).collect()
    }
}
