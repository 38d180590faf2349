use parley_core::Tokenizer;
use std::sync::LazyLock;
use tiktoken_rs::{cl100k_base, CoreBPE};
use tracing::warn;

static CL100K: LazyLock<Option<CoreBPE>> = LazyLock::new(|| match cl100k_base() {
    Ok(bpe) => Some(bpe),
    Err(e) => {
        warn!(error = %e, "cl100k_base unavailable, counting words instead");
        None
    }
});

/// Counts whitespace-separated words
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// tiktoken's cl100k_base encoding
///
/// The encoder is built once per process on first use.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cl100kTokenizer;

impl Tokenizer for Cl100kTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        match CL100K.as_ref() {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => WhitespaceTokenizer.count_tokens(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace() {
        assert_eq!(WhitespaceTokenizer.count_tokens("  one two\tthree\n"), 3);
        assert_eq!(WhitespaceTokenizer.count_tokens(""), 0);
    }

    #[test]
    fn test_cl100k() {
        let tokenizer = Cl100kTokenizer;
        assert_eq!(tokenizer.count_tokens(""), 0);
        assert_eq!(tokenizer.count_tokens("hello"), 1);
        assert!(tokenizer.count_tokens("The quick brown fox jumps over the lazy dog") >= 9);
    }
}
