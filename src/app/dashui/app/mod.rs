//! Main application window
//!
//! One frame of [`CodeCraftApp`]:
//! 1. apply a finished generation request, if any
//! 2. draw the prompt panel, toolbar and code view
//! 3. tell the sandbox renderer where the preview goes and what it shows;
//!    the preview window is moved over the area the layout reserves for it

mod initialization;
mod rendering;

use super::prompt_panel::PromptPanel;
use super::theme::ThemeChoice;
use super::view_state::{preview_origin, ViewState};
use crate::app::config::AppConfig;
use crate::app::generation::{GenerationClient, GenerationCoordinator};
use crate::app::preview::{EditBuffer, ProcessSandboxHost, SandboxRenderer};
use eframe::egui;
use std::sync::Arc;
use tokio::runtime::Handle;

/// UI preferences. Only the theme outlives the session; every start opens
/// in preview layout with the desktop viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct UiPreferences {
    pub theme: ThemeChoice,
    #[serde(skip)]
    pub view: ViewState,
}

/// Long-lived collaborators created in `main`
pub struct AppServices {
    pub runtime: Handle,
    pub client: Arc<dyn GenerationClient>,
    pub config: AppConfig,
}

pub struct CodeCraftApp {
    prefs: UiPreferences,
    config: AppConfig,
    prompt_panel: PromptPanel,
    buffer: EditBuffer,
    coordinator: GenerationCoordinator,
    renderer: SandboxRenderer<ProcessSandboxHost>,
    applied_theme: Option<ThemeChoice>,
}

impl eframe::App for CodeCraftApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.prefs);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_theme(ctx);
        self.handle_generation_results();

        self.render_prompt_panel(ctx);
        self.render_status_bar(ctx);
        let (frame, anchor) = self.render_central_panel(ctx);

        self.renderer.present(frame);
        if let (Some(anchor), Some(window)) = (anchor, ctx.input(|i| i.viewport().inner_rect)) {
            self.renderer
                .place(preview_origin((window.min.x, window.min.y), (anchor.x, anchor.y)));
        }
        self.renderer.sync(&self.buffer.published());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::dashui::view_state::{LayoutMode, ViewportPreset};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_only_theme_is_persisted() {
        let prefs = UiPreferences {
            theme: ThemeChoice::Mocha,
            view: ViewState {
                layout: LayoutMode::Split,
                viewport: ViewportPreset::Mobile,
            },
        };

        let stored = serde_json::to_value(prefs).unwrap();
        assert_eq!(stored, serde_json::json!({ "theme": "Mocha" }));

        let restored: UiPreferences = serde_json::from_value(stored).unwrap();
        assert_eq!(restored.theme, ThemeChoice::Mocha);
        assert_eq!(restored.view, ViewState::default());
    }
}
