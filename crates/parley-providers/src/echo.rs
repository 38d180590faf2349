use async_trait::async_trait;
use parley_core::{ActionInference, Result};

/// Answers every prompt with its last non-empty line
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoInference;

#[async_trait]
impl ActionInference for EchoInference {
    async fn infer(&self, prompt: &str) -> Result<String> {
        let last = prompt
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();
        Ok(last.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_last_line() {
        let reply = EchoInference
            .infer("system: be brief\n\nuser: hello there\n")
            .await
            .unwrap();
        assert_eq!(reply, "user: hello there");
    }

    #[tokio::test]
    async fn test_echo_empty_prompt() {
        assert_eq!(EchoInference.infer("  \n").await.unwrap(), "");
    }
}
