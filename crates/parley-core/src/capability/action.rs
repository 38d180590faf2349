use async_trait::async_trait;

use crate::error::Result;

/// Action inference provider: produces the next response for a prompt
#[async_trait]
pub trait ActionInference: Send + Sync {
    /// Generate a response for `prompt`
    async fn infer(&self, prompt: &str) -> Result<String>;
}
