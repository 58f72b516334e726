//! Commands sent from the host window to the sandbox process
//!
//! One JSON object per line on the sandbox process' stdin.

use super::document::RenderEpoch;
use super::policy::SandboxPolicy;
use serde::{Deserialize, Serialize};

/// Geometry of the preview surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreviewFrame {
    Hidden,
    Sized { width: u32, height: u32 },
}

/// Top-left corner of the preview area in screen coordinates (logical pixels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SandboxCommand {
    /// Tear down the current webview and build a new one for `html`
    Mount {
        epoch: RenderEpoch,
        policy: SandboxPolicy,
        html: String,
    },
    /// Destroy the current webview without building a replacement
    Unmount { epoch: RenderEpoch },
    Present { frame: PreviewFrame },
    /// Move the preview window so it covers the host's preview area
    Place { origin: ScreenPoint },
    Shutdown,
}

impl SandboxCommand {
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim_end())
    }
}
