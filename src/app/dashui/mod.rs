//! Desktop user interface
//!
//! - [`app`] - the main window and per-frame wiring
//! - [`prompt_panel`] - prompt entry, suggestions and generation status
//! - [`code_view`] - the editable source with HTML highlighting
//! - [`view_state`] - layout mode and viewport preset
//! - [`theme`] - Catppuccin theme selection

pub mod app;
pub mod code_view;
pub mod html_syntax;
pub mod prompt_panel;
pub mod theme;
pub mod view_state;

pub use app::{AppServices, CodeCraftApp, UiPreferences};
pub use prompt_panel::{PromptAction, PromptPanel};
pub use theme::ThemeChoice;
pub use view_state::{preview_origin, LayoutMode, MobileSize, ViewState, ViewportPreset};
