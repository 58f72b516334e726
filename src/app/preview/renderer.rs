//! Document Sandbox Renderer
//!
//! Keeps exactly one sandboxed rendering context alive, keyed by render
//! epoch. When the epoch changes the old context is destroyed before the new
//! one is constructed, so no scripts, timers or DOM state survive a reload.
//! Hosts report failures as [`SandboxError`]; the renderer logs them and
//! carries on, nothing reaches the caller.

#![warn(clippy::all, rust_2018_idioms)]

use super::document::{PublishedSnapshot, RenderEpoch};
use super::policy::SandboxPolicy;
use super::protocol::{PreviewFrame, ScreenPoint};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to start sandbox process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("sandbox process is not accepting commands: {0}")]
    Channel(#[source] std::io::Error),

    #[error("failed to encode sandbox command: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Something able to host isolated rendering contexts
pub trait SandboxHost {
    /// Build a fresh context for `document`. Any previous context has already
    /// been destroyed by the time this is called.
    fn mount(
        &mut self,
        epoch: RenderEpoch,
        document: &str,
        policy: &SandboxPolicy,
    ) -> Result<(), SandboxError>;

    /// Destroy the context created for `epoch`.
    fn unmount(&mut self, epoch: RenderEpoch) -> Result<(), SandboxError>;

    fn present(&mut self, frame: PreviewFrame) -> Result<(), SandboxError>;

    /// Move the rendering surface over the host's preview area.
    fn place(&mut self, _origin: ScreenPoint) -> Result<(), SandboxError> {
        Ok(())
    }
}

/// Drives a [`SandboxHost`] from published snapshots
pub struct SandboxRenderer<H: SandboxHost> {
    host: H,
    policy: SandboxPolicy,
    /// Epoch of the live context, if mounting succeeded
    mounted: Option<RenderEpoch>,
    /// Last epoch a reload was attempted for, successful or not
    attempted: Option<RenderEpoch>,
    frame: Option<PreviewFrame>,
    origin: Option<ScreenPoint>,
    reloads: u64,
}

impl<H: SandboxHost> SandboxRenderer<H> {
    pub fn new(host: H, policy: SandboxPolicy) -> Self {
        Self {
            host,
            policy,
            mounted: None,
            attempted: None,
            frame: None,
            origin: None,
            reloads: 0,
        }
    }

    /// Reload if `snapshot` carries an epoch this renderer has not seen.
    ///
    /// Returns the epoch that was reloaded, if any.
    pub fn sync(&mut self, snapshot: &PublishedSnapshot) -> Option<RenderEpoch> {
        if self.attempted == Some(snapshot.epoch) {
            return None;
        }
        self.reload(snapshot);
        Some(snapshot.epoch)
    }

    /// Destroy the current context and construct a new one from `snapshot`.
    pub fn reload(&mut self, snapshot: &PublishedSnapshot) {
        self.teardown();

        self.attempted = Some(snapshot.epoch);
        self.reloads += 1;

        match self
            .host
            .mount(snapshot.epoch, &snapshot.document, &self.policy)
        {
            Ok(()) => {
                info!(
                    "Sandbox mounted for epoch {} ({} bytes)",
                    snapshot.epoch,
                    snapshot.document.len()
                );
                self.mounted = Some(snapshot.epoch);
            }
            Err(e) => {
                warn!("Sandbox mount failed for epoch {}: {}", snapshot.epoch, e);
            }
        }
    }

    /// Destroy the live context, if there is one.
    pub fn teardown(&mut self) {
        if let Some(epoch) = self.mounted.take() {
            debug!("Tearing down sandbox context for epoch {}", epoch);
            if let Err(e) = self.host.unmount(epoch) {
                warn!("Sandbox teardown for epoch {} failed: {}", epoch, e);
            }
        }
    }

    /// Forward the preview geometry when it changed since the last call.
    pub fn present(&mut self, frame: PreviewFrame) {
        if self.frame == Some(frame) {
            return;
        }
        match self.host.present(frame) {
            Ok(()) => self.frame = Some(frame),
            Err(e) => warn!("Failed to present sandbox frame {:?}: {}", frame, e),
        }
    }

    /// Forward the preview position when it changed since the last call.
    pub fn place(&mut self, origin: ScreenPoint) {
        if self.origin == Some(origin) {
            return;
        }
        match self.host.place(origin) {
            Ok(()) => self.origin = Some(origin),
            Err(e) => warn!("Failed to place sandbox window at {:?}: {}", origin, e),
        }
    }

    pub fn mounted_epoch(&self) -> Option<RenderEpoch> {
        self.mounted
    }

    /// Number of reloads performed so far
    pub fn reload_count(&self) -> u64 {
        self.reloads
    }

    pub fn policy(&self) -> &SandboxPolicy {
        &self.policy
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    enum HostEvent {
        Mount(u64, String),
        Unmount(u64),
        Present(PreviewFrame),
        Place(ScreenPoint),
    }

    #[derive(Default)]
    struct RecordingHost {
        events: Vec<HostEvent>,
        live: Option<RenderEpoch>,
        fail_mounts: bool,
    }

    impl SandboxHost for RecordingHost {
        fn mount(
            &mut self,
            epoch: RenderEpoch,
            document: &str,
            _policy: &SandboxPolicy,
        ) -> Result<(), SandboxError> {
            assert!(self.live.is_none(), "previous context still alive");
            if self.fail_mounts {
                return Err(SandboxError::Spawn(std::io::Error::other("no display")));
            }
            self.events
                .push(HostEvent::Mount(epoch.value(), document.to_string()));
            self.live = Some(epoch);
            Ok(())
        }

        fn unmount(&mut self, epoch: RenderEpoch) -> Result<(), SandboxError> {
            assert_eq!(self.live, Some(epoch));
            self.events.push(HostEvent::Unmount(epoch.value()));
            self.live = None;
            Ok(())
        }

        fn present(&mut self, frame: PreviewFrame) -> Result<(), SandboxError> {
            self.events.push(HostEvent::Present(frame));
            Ok(())
        }

        fn place(&mut self, origin: ScreenPoint) -> Result<(), SandboxError> {
            self.events.push(HostEvent::Place(origin));
            Ok(())
        }
    }

    fn snapshot(document: &str, epoch: u64) -> PublishedSnapshot {
        PublishedSnapshot::new(document, RenderEpoch::new(epoch))
    }

    #[test]
    fn test_each_epoch_gets_fresh_context() {
        let mut renderer = SandboxRenderer::new(RecordingHost::default(), SandboxPolicy::PREVIEW);

        assert_eq!(renderer.sync(&snapshot("a", 0)), Some(RenderEpoch::new(0)));
        assert_eq!(renderer.sync(&snapshot("a", 0)), None);
        assert_eq!(renderer.sync(&snapshot("b", 1)), Some(RenderEpoch::new(1)));
        // Same text, new epoch (manual refresh)
        assert_eq!(renderer.sync(&snapshot("b", 2)), Some(RenderEpoch::new(2)));

        assert_eq!(
            renderer.host().events,
            vec![
                HostEvent::Mount(0, "a".into()),
                HostEvent::Unmount(0),
                HostEvent::Mount(1, "b".into()),
                HostEvent::Unmount(1),
                HostEvent::Mount(2, "b".into()),
            ]
        );
        assert_eq!(renderer.reload_count(), 3);
        assert_eq!(renderer.mounted_epoch(), Some(RenderEpoch::new(2)));
    }

    #[test]
    fn test_mount_failure_is_contained() {
        let host = RecordingHost {
            fail_mounts: true,
            ..Default::default()
        };
        let mut renderer = SandboxRenderer::new(host, SandboxPolicy::PREVIEW);

        assert_eq!(renderer.sync(&snapshot("<p", 4)), Some(RenderEpoch::new(4)));
        assert_eq!(renderer.mounted_epoch(), None);

        // No retry storm on the same epoch
        assert_eq!(renderer.sync(&snapshot("<p", 4)), None);
        assert_eq!(renderer.reload_count(), 1);
    }

    #[test]
    fn test_teardown_without_context_is_noop() {
        let mut renderer = SandboxRenderer::new(RecordingHost::default(), SandboxPolicy::PREVIEW);

        renderer.teardown();

        assert!(renderer.host().events.is_empty());
    }

    #[test]
    fn test_present_forwards_changes_only() {
        let mut renderer = SandboxRenderer::new(RecordingHost::default(), SandboxPolicy::PREVIEW);
        let mobile = PreviewFrame::Sized {
            width: 375,
            height: 667,
        };

        renderer.present(mobile);
        renderer.present(mobile);
        renderer.present(PreviewFrame::Hidden);

        assert_eq!(
            renderer.host().events,
            vec![
                HostEvent::Present(mobile),
                HostEvent::Present(PreviewFrame::Hidden),
            ]
        );
    }

    #[test]
    fn test_place_forwards_moves_only() {
        let mut renderer = SandboxRenderer::new(RecordingHost::default(), SandboxPolicy::PREVIEW);
        let left = ScreenPoint { x: 340, y: 96 };
        let moved = ScreenPoint { x: 400, y: 96 };

        renderer.place(left);
        renderer.place(left);
        renderer.place(moved);

        assert_eq!(
            renderer.host().events,
            vec![HostEvent::Place(left), HostEvent::Place(moved)]
        );
    }
}
