use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use stop_words::{get, LANGUAGE};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::TokenizerConfig;

/// A token as it appears in text plus its normalized index term
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyzedToken {
    /// Lowercased word before stemming
    pub surface: String,
    /// Term stored in and looked up from the index
    pub term: String,
}

/// Text tokenizer with optional stemming and stopword removal
pub struct Tokenizer {
    config: TokenizerConfig,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

fn stemmer_algorithm(language: &str) -> Algorithm {
    match language.to_lowercase().as_str() {
        "french" => Algorithm::French,
        "german" => Algorithm::German,
        "spanish" => Algorithm::Spanish,
        "italian" => Algorithm::Italian,
        "portuguese" => Algorithm::Portuguese,
        _ => Algorithm::English,
    }
}

fn stopword_language(language: &str) -> LANGUAGE {
    match language.to_lowercase().as_str() {
        "french" => LANGUAGE::French,
        "german" => LANGUAGE::German,
        "spanish" => LANGUAGE::Spanish,
        "italian" => LANGUAGE::Italian,
        "portuguese" => LANGUAGE::Portuguese,
        _ => LANGUAGE::English,
    }
}

impl Tokenizer {
    /// Create a new tokenizer from configuration
    pub fn new(config: &TokenizerConfig) -> Self {
        let stemmer = if config.stem {
            Some(Stemmer::create(stemmer_algorithm(&config.language)))
        } else {
            None
        };

        let stopwords = if config.remove_stopwords {
            get(stopword_language(&config.language))
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect()
        } else {
            HashSet::new()
        };

        Self {
            config: config.clone(),
            stemmer,
            stopwords,
        }
    }

    /// Normalize a single word; `None` when the word is filtered out
    pub fn analyze_word(&self, word: &str) -> Option<AnalyzedToken> {
        let surface = if self.config.lowercase {
            word.to_lowercase()
        } else {
            word.to_string()
        };

        let len = surface.chars().count();
        if len < self.config.min_token_length || len > self.config.max_token_length {
            return None;
        }

        if self.stopwords.contains(&surface) {
            return None;
        }

        let term = match &self.stemmer {
            Some(stemmer) => stemmer.stem(&surface).to_string(),
            None => surface.clone(),
        };

        Some(AnalyzedToken { surface, term })
    }

    /// Tokenize text keeping both surface words and index terms, in order
    pub fn analyze(&self, text: &str) -> Vec<AnalyzedToken> {
        text.unicode_words()
            .filter_map(|word| self.analyze_word(word))
            .collect()
    }

    /// Tokenize text into a vector of index terms
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.analyze(text).into_iter().map(|token| token.term).collect()
    }
}
