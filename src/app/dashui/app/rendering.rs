//! Panels and per-frame bookkeeping

use super::CodeCraftApp;
use crate::app::dashui::code_view::show_code_view;
use crate::app::dashui::prompt_panel::PromptAction;
use crate::app::dashui::theme::ThemeChoice;
use crate::app::dashui::view_state::{LayoutMode, MobileSize, ViewportPreset};
use crate::app::generation::{GenerationEvent, GenerationStatus, TriggerOutcome};
use crate::app::preview::PreviewFrame;
use eframe::egui;
use tracing::{debug, info};

impl CodeCraftApp {
    pub(super) fn apply_theme(&mut self, ctx: &egui::Context) {
        if self.applied_theme == Some(self.prefs.theme) {
            return;
        }
        self.prefs.theme.apply(ctx);
        self.applied_theme = Some(self.prefs.theme);
    }

    /// Apply a finished request and switch away from a code-only layout on success
    pub(super) fn handle_generation_results(&mut self) {
        if let Some(GenerationEvent::Succeeded { epoch }) = self.coordinator.poll(&mut self.buffer) {
            if self.prefs.view.layout == LayoutMode::Code {
                info!("Showing preview for generated document {}", epoch);
                self.prefs.view.layout = LayoutMode::Preview;
            }
        }
    }

    pub(super) fn render_prompt_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("prompt_panel")
            .resizable(true)
            .default_width(320.0)
            .min_width(240.0)
            .show(ctx, |ui| {
                let status = self.coordinator.status().clone();
                if let PromptAction::Generate(prompt) = self.prompt_panel.show(ui, &status) {
                    match self.coordinator.trigger(&prompt) {
                        TriggerOutcome::Started(request_id) => {
                            debug!("Generation request {} queued from UI", request_id)
                        }
                        TriggerOutcome::Rejected(reason) => {
                            debug!("Generation trigger rejected: {:?}", reason)
                        }
                    }
                }
            });
    }

    pub(super) fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.coordinator.client_description());
                ui.separator();
                let published = self.buffer.published();
                ui.label(format!("Preview {}", published.epoch));
                ui.label(format!("{} bytes", published.document.len()));
                if self.buffer.publisher().has_pending() {
                    ui.label("(pending)");
                }
                ui.separator();
                match self.coordinator.status() {
                    GenerationStatus::Failed(message) => {
                        ui.label(egui::RichText::new(message).small().weak());
                    }
                    _ => {
                        ui.label(format!("{} requests", self.coordinator.requests_issued()));
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    egui::ComboBox::from_id_salt("theme_choice")
                        .selected_text(self.prefs.theme.to_string())
                        .show_ui(ui, |ui| {
                            for theme in ThemeChoice::ALL {
                                ui.selectable_value(&mut self.prefs.theme, theme, theme.to_string());
                            }
                        });
                    ui.label(format!(
                        "{} ({})",
                        env!("GIT_BRANCH"),
                        env!("GIT_COMMIT")
                    ));
                });
            });
        });
    }

    /// Draws the toolbar and workspace, returning the preview geometry and the
    /// top-left corner of the area reserved for it
    pub(super) fn render_central_panel(
        &mut self,
        ctx: &egui::Context,
    ) -> (PreviewFrame, Option<egui::Pos2>) {
        let mut frame = PreviewFrame::Hidden;
        let mut anchor = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_toolbar(ui);
            ui.separator();

            let available = ui.available_size();
            let mobile = MobileSize {
                width: self.config.preview.mobile_width,
                height: self.config.preview.mobile_height,
            };
            frame = self.prefs.view.preview_frame(
                available.x.max(0.0) as u32,
                available.y.max(0.0) as u32,
                mobile,
            );

            match self.prefs.view.layout {
                LayoutMode::Preview => {
                    anchor = Some(ui.available_rect_before_wrap().min);
                    self.render_preview_card(ui);
                }
                LayoutMode::Code => {
                    show_code_view(ui, &mut self.buffer, self.prefs.theme);
                }
                LayoutMode::Split => {
                    ui.columns(2, |columns| {
                        anchor = Some(columns[0].available_rect_before_wrap().min);
                        self.render_preview_card(&mut columns[0]);
                        show_code_view(&mut columns[1], &mut self.buffer, self.prefs.theme);
                    });
                }
            }
        });

        (frame, anchor)
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for layout in LayoutMode::ALL {
                ui.selectable_value(&mut self.prefs.view.layout, layout, layout.label());
            }

            if self.prefs.view.shows_preview_controls() {
                ui.separator();
                for viewport in [ViewportPreset::Desktop, ViewportPreset::Mobile] {
                    ui.selectable_value(&mut self.prefs.view.viewport, viewport, viewport.label());
                }
                ui.separator();
                if ui.button("Refresh").clicked() {
                    let epoch = self.buffer.refresh();
                    info!("Preview refreshed at {}", epoch);
                }
            }
        });
    }

    fn render_preview_card(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.heading("Live preview");
            ui.label("The page runs in the sandboxed preview window placed over this area.");
            ui.add_space(8.0);
            match self.renderer.mounted_epoch() {
                Some(epoch) => ui.label(format!("Showing {}", epoch)),
                None => ui.label("Preview not mounted"),
            };
            if self.prefs.view.layout == LayoutMode::Preview
                && self.prefs.view.viewport == ViewportPreset::Mobile
            {
                ui.label(format!(
                    "Mobile viewport {}x{}",
                    self.config.preview.mobile_width, self.config.preview.mobile_height
                ));
            }
            ui.label(format!("{} reloads", self.renderer.reload_count()));
        });
    }
}
