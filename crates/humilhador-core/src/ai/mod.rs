pub mod openai;

pub use openai::OpenAIClient;

use anyhow::Result;
use async_trait::async_trait;

/// One chat-style completion: a persona plus the user prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatRequest {
    pub fn new(system: &str, prompt: &str) -> Self {
        Self {
            system: system.to_string(),
            prompt: prompt.to_string(),
            temperature: 0.9,
            max_tokens: 500,
        }
    }
}

/// A text-generation backend. `Ok(None)` means the service answered without usable text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<Option<String>>;
}
