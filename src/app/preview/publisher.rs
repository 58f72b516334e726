//! Debounced Publisher
//!
//! Owns the published document and the render epoch. Edits are republished
//! only after a quiet period so the sandbox does not reload on every
//! keystroke, while generation results and manual refreshes bypass the timer.
//!
//! Each pending publish is a tokio task tagged with a ticket. A new edit or a
//! forced publish aborts the task and clears the ticket, so a timer that
//! already fired but lost the race for the lock can never publish stale text.

#![warn(clippy::all, rust_2018_idioms)]

use super::document::{PublishedSnapshot, RenderEpoch};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Default quiet period between the last edit and the publish
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

/// Called after every publish or refresh, e.g. to wake the UI
pub type PublishListener = Arc<dyn Fn(RenderEpoch) + Send + Sync>;

struct PendingPublish {
    ticket: u64,
    task: JoinHandle<()>,
}

struct PublisherState {
    published: Arc<str>,
    epoch: RenderEpoch,
    pending: Option<PendingPublish>,
    next_ticket: u64,
}

impl PublisherState {
    fn cancel_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.task.abort();
                true
            }
            None => false,
        }
    }
}

/// Shared between the publisher handle and its scheduled tasks
struct Shared {
    state: Mutex<PublisherState>,
    listener: Option<PublishListener>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PublisherState> {
        // The state is plain data; a panic elsewhere cannot leave it half-written.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self, epoch: RenderEpoch) {
        if let Some(listener) = &self.listener {
            listener(epoch);
        }
    }

    /// Timer callback: publish only if this ticket is still the pending one
    fn fire(&self, ticket: u64, text: Arc<str>) {
        let epoch = {
            let mut state = self.lock();
            match &state.pending {
                Some(pending) if pending.ticket == ticket => {}
                _ => {
                    debug!("Dropping superseded publish ticket {}", ticket);
                    return;
                }
            }
            state.pending = None;
            state.published = text;
            state.epoch.bump()
        };

        debug!("Debounced publish settled at epoch {}", epoch);
        self.notify(epoch);
    }
}

/// Republishes edited text after a quiet period
pub struct DebouncedPublisher {
    shared: Arc<Shared>,
    quiet_period: Duration,
    runtime: Handle,
}

impl DebouncedPublisher {
    /// Create a publisher whose initial document is published at [`RenderEpoch::INITIAL`]
    pub fn new(initial: impl Into<Arc<str>>, quiet_period: Duration, runtime: Handle) -> Self {
        Self::build(initial.into(), quiet_period, runtime, None)
    }

    /// Same as [`DebouncedPublisher::new`] with a listener invoked after each publish
    pub fn with_listener(
        initial: impl Into<Arc<str>>,
        quiet_period: Duration,
        runtime: Handle,
        listener: PublishListener,
    ) -> Self {
        Self::build(initial.into(), quiet_period, runtime, Some(listener))
    }

    fn build(
        initial: Arc<str>,
        quiet_period: Duration,
        runtime: Handle,
        listener: Option<PublishListener>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PublisherState {
                    published: initial,
                    epoch: RenderEpoch::INITIAL,
                    pending: None,
                    next_ticket: 0,
                }),
                listener,
            }),
            quiet_period,
            runtime,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Schedule `text` for publishing once no further update arrives within
    /// the quiet period. Any previously scheduled publish is cancelled.
    pub fn update(&self, text: impl Into<Arc<str>>) {
        let text = text.into();
        let mut state = self.shared.lock();
        state.cancel_pending();

        let ticket = state.next_ticket;
        state.next_ticket += 1;

        let shared = Arc::clone(&self.shared);
        let delay = self.quiet_period;
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            shared.fire(ticket, text);
        });

        state.pending = Some(PendingPublish { ticket, task });
    }

    /// Publish `text` immediately, cancelling any pending debounced publish.
    pub fn force_publish(&self, text: impl Into<Arc<str>>) -> RenderEpoch {
        let epoch = {
            let mut state = self.shared.lock();
            if state.cancel_pending() {
                debug!("Forced publish superseded a pending edit");
            }
            state.published = text.into();
            state.epoch.bump()
        };

        info!("Forced publish at epoch {}", epoch);
        self.shared.notify(epoch);
        epoch
    }

    /// Start a new epoch for the current document without changing it.
    pub fn refresh(&self) -> RenderEpoch {
        let epoch = self.shared.lock().epoch.bump();
        info!("Preview refresh requested, epoch {}", epoch);
        self.shared.notify(epoch);
        epoch
    }

    pub fn snapshot(&self) -> PublishedSnapshot {
        let state = self.shared.lock();
        PublishedSnapshot {
            document: Arc::clone(&state.published),
            epoch: state.epoch,
        }
    }

    pub fn epoch(&self) -> RenderEpoch {
        self.shared.lock().epoch
    }

    /// Whether an edit is waiting for its quiet period to elapse
    pub fn has_pending(&self) -> bool {
        self.shared.lock().pending.is_some()
    }
}

impl Drop for DebouncedPublisher {
    fn drop(&mut self) {
        self.shared.lock().cancel_pending();
    }
}
