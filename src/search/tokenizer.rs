//! Tokenization, token hashing and slot batching
//!
//! Tokens are maximal runs of word characters (Unicode alphanumerics and
//! `_`), lowercased. Every token hashes to a code in `[1, RANGE)`; code 0 is
//! reserved for padding so an unused slot never matches a query.

use std::ops::Range;

/// Exclusive upper bound of token codes; must stay below the plaintext modulus
pub const RANGE: u64 = 1_000_000;

/// Code of padding slots
pub const PADDING: u64 = 0;

/// One fixed-width batch of token codes
pub type TokenBatch = Vec<u64>;

/// A token and the byte range it was cut from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub span: Range<usize>,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lowercased tokens with their byte ranges in `text`
pub fn tokenize_with_spans(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        match (is_word_char(c), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                tokens.push(token(text, s..i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(token(text, s..text.len()));
    }
    tokens
}

fn token(text: &str, span: Range<usize>) -> Token {
    Token {
        text: text[span.clone()].to_lowercase(),
        span,
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with_spans(text)
        .into_iter()
        .map(|t| t.text)
        .collect()
}

/// Stable token code in `[1, RANGE)`
///
/// First eight bytes of the blake3 digest, little-endian, reduced into range.
pub fn hash_token(token: &str) -> u64 {
    let digest = blake3::hash(token.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest.as_bytes()[..8]);
    1 + u64::from_le_bytes(prefix) % (RANGE - 1)
}

/// Split codes into batches of `width`, zero-padding the last one
///
/// # Panics
///
/// Panics if `width` is zero.
pub fn batch(codes: &[u64], width: usize) -> Vec<TokenBatch> {
    assert!(width > 0, "batch width must be positive");
    codes
        .chunks(width)
        .map(|chunk| {
            let mut batch = chunk.to_vec();
            batch.resize(width, PADDING);
            batch
        })
        .collect()
}

/// Tokenize, hash and batch in one step; also returns the token count
pub fn encode_text(text: &str, width: usize) -> (Vec<TokenBatch>, usize) {
    let codes: Vec<u64> = tokenize(text).iter().map(|t| hash_token(t)).collect();
    (batch(&codes, width), codes.len())
}
