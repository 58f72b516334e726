//! Published document snapshots and render epochs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifies one independent instantiation of the sandboxed preview.
///
/// Epochs only ever move forward. Every publish (debounced or forced) and
/// every explicit refresh produces a new epoch, and every new epoch gets a
/// freshly constructed sandbox.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct RenderEpoch(u64);

impl RenderEpoch {
    pub const INITIAL: RenderEpoch = RenderEpoch(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Advance to the following epoch.
    pub(crate) fn bump(&mut self) -> RenderEpoch {
        self.0 += 1;
        *self
    }
}

impl fmt::Display for RenderEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The settled document paired with the epoch it was published under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedSnapshot {
    pub document: Arc<str>,
    pub epoch: RenderEpoch,
}

impl PublishedSnapshot {
    pub fn new(document: impl Into<Arc<str>>, epoch: RenderEpoch) -> Self {
        Self {
            document: document.into(),
            epoch,
        }
    }
}
