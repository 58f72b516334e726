//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use codecraft::app::generation::{
    GenerationClient, GenerationCoordinator, GenerationError, GenerationEvent,
};
use codecraft::app::preview::{DebouncedPublisher, EditBuffer, DEFAULT_QUIET_PERIOD};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Notify;

/// Client that returns a fixed reply, optionally held until a gate opens
pub struct ScriptedClient {
    calls: AtomicUsize,
    reply: Result<String, String>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedClient {
    pub fn replying(text: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: Ok(text.to_string()),
            gate: None,
        }
    }

    pub fn failing(body: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: Err(body.to_string()),
            gate: None,
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(body) => Err(GenerationError::Status {
                status: 500,
                body: body.clone(),
            }),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

pub fn new_buffer(initial: &str) -> EditBuffer {
    EditBuffer::new(DebouncedPublisher::new(
        initial,
        DEFAULT_QUIET_PERIOD,
        Handle::current(),
    ))
}

/// Let spawned tasks run until the coordinator has something to apply
pub async fn wait_for_event(
    coordinator: &mut GenerationCoordinator,
    buffer: &mut EditBuffer,
) -> GenerationEvent {
    for _ in 0..1000 {
        if let Some(event) = coordinator.poll(buffer) {
            return event;
        }
        tokio::task::yield_now().await;
    }
    panic!("generation did not finish");
}

pub async fn let_tasks_run() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
