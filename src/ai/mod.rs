//! AI service integration for text and image generation
//!
//! Provides interfaces to OpenAI's Chat Completions and Image APIs. The rest
//! of the crate only sees the traits below, so tests swap in the mocks.

pub mod mock;
pub mod openai;

pub use mock::{MockChatClient, MockImageGenerationClient};
pub use openai::{OpenAiChatClient, OpenAiImageClient};

use crate::Result;
use async_trait::async_trait;

/// A single-turn chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub prompt: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    /// Provider-assigned completion id, when the provider returns one.
    pub id: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub id: Option<String>,
    pub url: Option<String>,
}

#[async_trait]
pub trait ChatService: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_image(&self, prompt: &str, model: &str) -> Result<GeneratedImage>;
}
