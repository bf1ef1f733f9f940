//! Title matching between catalog entries and search results.

mod similarity;
mod tokenizer;

pub use similarity::{similarity, surname_match, DOWNLOAD_SIMILARITY_THRESHOLD};
pub use tokenizer::tokenize;
