//! Tokenization and sentence segmentation with character offsets

pub mod tokenizer;

pub use tokenizer::{Sentence, Token, Tokenizer};
