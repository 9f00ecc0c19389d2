mod tokenizer;

pub use tokenizer::{AnalyzedToken, Tokenizer};
