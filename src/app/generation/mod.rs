//! Prompt-to-document generation
//!
//! - [`client`] - the collaborator interface and its error type
//! - [`gemini`] - the Gemini REST implementation
//! - [`response`] - fence stripping and emptiness checks on raw output
//! - [`coordinator`] - request lifecycle and hand-off to the edit buffer

pub mod client;
pub mod coordinator;
pub mod gemini;
pub mod prompts;
pub mod response;

pub use client::{GenerationClient, GenerationError, UnavailableClient};
pub use coordinator::{
    CompletionListener, GenerationCoordinator, GenerationEvent, GenerationStatus, TriggerOutcome,
    TriggerRejection,
};
pub use gemini::GeminiClient;
pub use prompts::{INITIAL_DOCUMENT, SUGGESTIONS, SYSTEM_INSTRUCTION};
pub use response::clean_generated_markup;
