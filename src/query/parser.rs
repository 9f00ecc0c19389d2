//! Raw query string parsing
//!
//! A query is free text with optional double-quoted phrases:
//!
//! ```text
//! replica "read preference" secondary
//! ```
//!
//! yields the words `replica` and `secondary` plus the phrase
//! `read preference`. Parsing never fails: an unterminated quote is dropped
//! and the text after it is read as ordinary words.

use unicode_segmentation::UnicodeSegmentation;

/// Words and phrases extracted from a raw query, lowercased
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub words: Vec<String>,
    pub phrases: Vec<String>,
}

impl ParsedQuery {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.phrases.is_empty()
    }
}

/// Character-level query parser
pub struct QueryParser {
    input: Vec<char>,
    position: usize,
}

impl QueryParser {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Parse `input`, keeping at most `max_chars` characters of it
    pub fn parse(input: &str, max_chars: usize) -> ParsedQuery {
        let truncated: String = input.chars().take(max_chars).collect();
        Self::new(&truncated).run()
    }

    fn run(mut self) -> ParsedQuery {
        let mut query = ParsedQuery::default();
        let mut free_text = String::new();

        while self.position < self.input.len() {
            let ch = self.current_char();
            if ch == '"' {
                self.advance();
                match self.read_phrase() {
                    Some(phrase) => {
                        // Keep neighbouring words apart from the phrase
                        free_text.push(' ');
                        if !phrase.is_empty() && !query.phrases.contains(&phrase) {
                            query.phrases.push(phrase);
                        }
                    }
                    None => free_text.push(' '),
                }
            } else {
                free_text.push(ch);
                self.advance();
            }
        }

        for word in free_text.unicode_words() {
            let word = word.to_lowercase();
            if !query.words.contains(&word) {
                query.words.push(word);
            }
        }
        query
    }

    /// Read up to the closing quote; rewinds and returns `None` when there is none
    fn read_phrase(&mut self) -> Option<String> {
        let start = self.position;
        let mut phrase = String::new();

        while self.position < self.input.len() {
            let ch = self.current_char();
            self.advance();
            if ch == '"' {
                let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
                return Some(normalized.to_lowercase());
            }
            phrase.push(ch);
        }

        self.position = start;
        None
    }

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn advance(&mut self) {
        self.position += 1;
    }
}
