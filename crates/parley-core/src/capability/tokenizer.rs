/// Tokenizer provider
pub trait Tokenizer: Send + Sync {
    /// Count the tokens in `text`
    fn count_tokens(&self, text: &str) -> usize;
}
