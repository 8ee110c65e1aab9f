use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// One chat-style text generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    /// System role instructions.
    pub system: String,
    /// User prompt.
    pub prompt: String,
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("text generation is not configured: {0}")]
    NotConfigured(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("generated text was empty")]
    Empty,

    #[error("timed out after {0}s")]
    Timeout(u64),
}

/// Hosted language model boundary.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Generator used when no model is configured; always declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured("no model credentials".to_string()))
    }
}
