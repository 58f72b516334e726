//! Layout mode and viewport preset
//!
//! Two independent pieces of presentation state. The viewport preset only
//! changes the preview geometry in preview-only layout; split layout always
//! gives the preview half the width, and code-only hides it.

use crate::app::preview::{PreviewFrame, ScreenPoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    #[default]
    Preview,
    Split,
    Code,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 3] = [LayoutMode::Preview, LayoutMode::Split, LayoutMode::Code];

    pub fn label(self) -> &'static str {
        match self {
            LayoutMode::Preview => "Preview",
            LayoutMode::Split => "Split",
            LayoutMode::Code => "Code",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewportPreset {
    #[default]
    Desktop,
    Mobile,
}

impl ViewportPreset {
    pub fn label(self) -> &'static str {
        match self {
            ViewportPreset::Desktop => "Desktop",
            ViewportPreset::Mobile => "Mobile",
        }
    }
}

/// Preview dimensions used by the mobile preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MobileSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub layout: LayoutMode,
    pub viewport: ViewportPreset,
}

impl ViewState {
    pub fn shows_preview(&self) -> bool {
        matches!(self.layout, LayoutMode::Preview | LayoutMode::Split)
    }

    pub fn shows_code(&self) -> bool {
        matches!(self.layout, LayoutMode::Code | LayoutMode::Split)
    }

    /// Viewport toggles and the refresh button only make sense with a preview on screen
    pub fn shows_preview_controls(&self) -> bool {
        self.shows_preview()
    }

    /// Geometry of the preview given the space the host window offers
    pub fn preview_frame(
        &self,
        available_width: u32,
        available_height: u32,
        mobile: MobileSize,
    ) -> PreviewFrame {
        match (self.layout, self.viewport) {
            (LayoutMode::Code, _) => PreviewFrame::Hidden,
            (LayoutMode::Split, _) => PreviewFrame::Sized {
                width: (available_width / 2).max(1),
                height: available_height.max(1),
            },
            (LayoutMode::Preview, ViewportPreset::Desktop) => PreviewFrame::Sized {
                width: available_width.max(1),
                height: available_height.max(1),
            },
            (LayoutMode::Preview, ViewportPreset::Mobile) => PreviewFrame::Sized {
                width: mobile.width,
                height: mobile.height,
            },
        }
    }
}

/// Screen position for the preview window: the host window's inner origin
/// plus the preview area's offset inside it, both in logical pixels.
pub fn preview_origin(window_origin: (f32, f32), area_offset: (f32, f32)) -> ScreenPoint {
    ScreenPoint {
        x: (window_origin.0 + area_offset.0).round() as i32,
        y: (window_origin.1 + area_offset.1).round() as i32,
    }
}
