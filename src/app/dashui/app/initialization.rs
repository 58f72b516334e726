//! Application construction

use super::{AppServices, CodeCraftApp, UiPreferences};
use crate::app::dashui::prompt_panel::PromptPanel;
use crate::app::generation::{GenerationCoordinator, INITIAL_DOCUMENT};
use crate::app::preview::{
    DebouncedPublisher, EditBuffer, ProcessSandboxHost, SandboxPolicy, SandboxRenderer,
};
use std::sync::Arc;
use tracing::info;

const PREVIEW_WINDOW_TITLE: &str = "CodeCraft Preview";

impl CodeCraftApp {
    pub fn new(cc: &eframe::CreationContext<'_>, services: AppServices) -> Self {
        let prefs: UiPreferences = if let Some(storage) = cc.storage {
            eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default()
        } else {
            Default::default()
        };
        info!("Restored theme {}", prefs.theme);

        let AppServices {
            runtime,
            client,
            config,
        } = services;

        let publish_ctx = cc.egui_ctx.clone();
        let publisher = DebouncedPublisher::with_listener(
            INITIAL_DOCUMENT,
            config.preview.quiet_period(),
            runtime.clone(),
            Arc::new(move |_epoch| publish_ctx.request_repaint()),
        );

        let completion_ctx = cc.egui_ctx.clone();
        let coordinator = GenerationCoordinator::new(client, runtime)
            .with_listener(Arc::new(move || completion_ctx.request_repaint()));

        let renderer = SandboxRenderer::new(
            ProcessSandboxHost::new(PREVIEW_WINDOW_TITLE),
            SandboxPolicy::PREVIEW,
        );

        Self {
            prefs,
            config,
            prompt_panel: PromptPanel::new(),
            buffer: EditBuffer::new(publisher),
            coordinator,
            renderer,
            applied_theme: None,
        }
    }
}
