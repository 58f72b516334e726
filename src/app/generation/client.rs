//! Generation collaborator interface

use async_trait::async_trait;
use thiserror::Error;

/// Why a generation request produced no document
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API key configured (set GEMINI_API_KEY or generation.api_key)")]
    MissingApiKey,

    #[error("invalid generation endpoint: {0}")]
    Endpoint(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no content generated")]
    EmptyResponse,

    #[error("request cancelled")]
    Cancelled,
}

/// Turns a natural-language prompt into a raw HTML document.
///
/// Implementations return the collaborator's text untouched; fence stripping
/// and emptiness checks happen in [`super::response::clean_generated_markup`].
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Short label for logs and the UI footer
    fn describe(&self) -> String;
}

/// Stand-in used when the real client could not be built; every request fails
pub struct UnavailableClient {
    reason: String,
}

impl UnavailableClient {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl GenerationClient for UnavailableClient {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Endpoint(self.reason.clone()))
    }

    fn describe(&self) -> String {
        "Generation unavailable".to_string()
    }
}
