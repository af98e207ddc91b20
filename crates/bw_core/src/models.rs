use async_trait::async_trait;
use crate::Result;

/// A single system/user exchange with a language model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 800,
            temperature: 0.3,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Send one request and return the raw reply text.
    ///
    /// Implementations make no promise about the shape of the reply; callers
    /// normalize it and decide how to fall back when it cannot be parsed.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
