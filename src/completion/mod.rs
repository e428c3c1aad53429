//! Text-completion collaborator used by note processing.

pub mod openai;
pub mod scripted;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

pub use openai::OpenAiCompletion;
pub use scripted::ScriptedCompletion;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion service not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Completion transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Unexpected completion response: {0}")]
    Decode(String),

    #[error("Completion failed: {0}")]
    Failed(String),
}

/// One completion call: instructions plus the user's note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self { system: system.into(), user: user.into() }
    }
}

pub type CompletionStream = BoxStream<'static, Result<String, CompletionError>>;

#[async_trait]
pub trait Completion: Send + Sync {
    /// Whole response text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;

    /// Response text in upstream order. Dropping the stream releases the
    /// upstream connection.
    async fn complete_stream(&self, request: CompletionRequest) -> Result<CompletionStream, CompletionError>;
}
