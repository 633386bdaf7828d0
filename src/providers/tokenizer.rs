//! Tokenizers paired with a model binding.
//!
//! Memory budgeting only needs an approximate token count, so every binding
//! ships with a [`Tokenizer`]. Backends that know their exact vocabulary can
//! supply their own; the default [`WordPieceTokenizer`] approximates BPE
//! behaviour closely enough for budget decisions.

use crate::error::Result;

/// Splits text into model tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize `text`.
    ///
    /// Implementations may fail (e.g. a remote tokenizer endpoint); callers
    /// fall back to a character heuristic in that case.
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;
}

/// Approximates subword tokenization without a vocabulary.
///
/// Runs of alphanumeric characters become words, every other non-whitespace
/// character is its own token, and words longer than `piece_len` characters
/// are split into `piece_len`-character pieces.
///
/// # Example
/// ```
/// use hermes::providers::{Tokenizer, WordPieceTokenizer};
///
/// let tokens = WordPieceTokenizer::default().tokenize("Hello, tokenizer!").unwrap();
/// assert_eq!(tokens, vec!["Hell", "o", ",", "toke", "nize", "r", "!"]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WordPieceTokenizer {
    piece_len: usize,
}

impl WordPieceTokenizer {
    /// Create a tokenizer that chunks long words into `piece_len` characters.
    pub fn new(piece_len: usize) -> Self {
        Self {
            piece_len: piece_len.max(1),
        }
    }

    fn push_word(&self, word: &mut String, out: &mut Vec<String>) {
        if word.is_empty() {
            return;
        }
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(self.piece_len) {
            out.push(piece.iter().collect());
        }
        word.clear();
    }
}

impl Default for WordPieceTokenizer {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Tokenizer for WordPieceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let mut word = String::new();
        for ch in text.chars() {
            if ch.is_alphanumeric() {
                word.push(ch);
                continue;
            }
            self.push_word(&mut word, &mut out);
            if !ch.is_whitespace() {
                out.push(ch.to_string());
            }
        }
        self.push_word(&mut word, &mut out);
        Ok(out)
    }
}
