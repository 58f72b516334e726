//! Generation Request Coordinator
//!
//! State machine for the "Generate" action:
//!
//! ```text
//! Idle/Succeeded/Failed --trigger(prompt)--> InFlight --ok(doc)--> Succeeded
//!                                               └------err-------> Failed
//! ```
//!
//! The request runs on the shared tokio runtime; its outcome comes back over
//! a channel and is applied on the UI thread in [`GenerationCoordinator::poll`],
//! where the edit buffer and the published preview are replaced in one step.

#![warn(clippy::all, rust_2018_idioms)]

use super::client::{GenerationClient, GenerationError};
use super::response::clean_generated_markup;
use crate::app::preview::{EditBuffer, RenderEpoch};
use std::sync::mpsc;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Lifecycle of the most recent generation request
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationStatus {
    Idle,
    InFlight { request_id: Uuid },
    Succeeded,
    Failed(String),
}

impl GenerationStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, GenerationStatus::InFlight { .. })
    }
}

/// Why a trigger was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerRejection {
    EmptyPrompt,
    AlreadyInFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started(Uuid),
    Rejected(TriggerRejection),
}

/// What [`GenerationCoordinator::poll`] applied, if anything
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    Succeeded { epoch: RenderEpoch },
    Failed { message: String },
}

/// Called when a request finishes, e.g. to wake the UI
pub type CompletionListener = Arc<dyn Fn() + Send + Sync>;

struct Completion {
    request_id: Uuid,
    result: Result<String, GenerationError>,
}

pub struct GenerationCoordinator {
    client: Arc<dyn GenerationClient>,
    runtime: Handle,
    status: GenerationStatus,
    sender: mpsc::Sender<Completion>,
    receiver: mpsc::Receiver<Completion>,
    shutdown: CancellationToken,
    listener: Option<CompletionListener>,
    requests_issued: u64,
}

impl GenerationCoordinator {
    pub fn new(client: Arc<dyn GenerationClient>, runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            client,
            runtime,
            status: GenerationStatus::Idle,
            sender,
            receiver,
            shutdown: CancellationToken::new(),
            listener: None,
            requests_issued: 0,
        }
    }

    pub fn with_listener(mut self, listener: CompletionListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn status(&self) -> &GenerationStatus {
        &self.status
    }

    /// Whether a trigger with `prompt` would start a request
    pub fn can_trigger(&self, prompt: &str) -> bool {
        !prompt.trim().is_empty() && !self.status.is_in_flight()
    }

    /// Number of requests sent to the collaborator so far
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    pub fn client_description(&self) -> String {
        self.client.describe()
    }

    /// Start generating a document for `prompt`.
    ///
    /// Empty prompts and triggers while a request is running are ignored.
    pub fn trigger(&mut self, prompt: &str) -> TriggerOutcome {
        if prompt.trim().is_empty() {
            debug!("Ignoring generation trigger with empty prompt");
            return TriggerOutcome::Rejected(TriggerRejection::EmptyPrompt);
        }
        if self.status.is_in_flight() {
            debug!("Ignoring generation trigger while a request is in flight");
            return TriggerOutcome::Rejected(TriggerRejection::AlreadyInFlight);
        }

        let request_id = Uuid::new_v4();
        self.status = GenerationStatus::InFlight { request_id };
        self.requests_issued += 1;
        info!(
            "Generation {} started with {} ({} chars)",
            request_id,
            self.client.describe(),
            prompt.len()
        );

        let client = Arc::clone(&self.client);
        let sender = self.sender.clone();
        let shutdown = self.shutdown.clone();
        let listener = self.listener.clone();
        let prompt = prompt.to_string();

        self.runtime.spawn(async move {
            let result = tokio::select! {
                result = client.generate(&prompt) => result,
                _ = shutdown.cancelled() => Err(GenerationError::Cancelled),
            };
            let result = result.and_then(|raw| clean_generated_markup(&raw));

            // The receiver is gone only when the coordinator was dropped.
            if sender.send(Completion { request_id, result }).is_ok() {
                if let Some(listener) = listener {
                    listener();
                }
            }
        });

        TriggerOutcome::Started(request_id)
    }

    /// Apply a finished request, if one is waiting.
    ///
    /// On success the source document and the published document are
    /// replaced together, skipping the debounce. On failure neither changes.
    pub fn poll(&mut self, buffer: &mut EditBuffer) -> Option<GenerationEvent> {
        let mut applied = None;

        while let Ok(completion) = self.receiver.try_recv() {
            match &self.status {
                GenerationStatus::InFlight { request_id } if *request_id == completion.request_id => {}
                _ => {
                    debug!("Discarding stale generation result {}", completion.request_id);
                    continue;
                }
            }

            applied = Some(match completion.result {
                Ok(document) => {
                    let epoch = buffer.replace(document);
                    info!(
                        "Generation {} succeeded, preview epoch {}",
                        completion.request_id, epoch
                    );
                    self.status = GenerationStatus::Succeeded;
                    GenerationEvent::Succeeded { epoch }
                }
                Err(e) => {
                    error!("Generation {} failed: {}", completion.request_id, e);
                    let message = e.to_string();
                    self.status = GenerationStatus::Failed(message.clone());
                    GenerationEvent::Failed { message }
                }
            });
        }

        applied
    }
}

impl Drop for GenerationCoordinator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
