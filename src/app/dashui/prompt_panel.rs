//! Prompt entry side panel

use crate::app::generation::{GenerationStatus, SUGGESTIONS};
use eframe::egui;

const PROMPT_ID: &str = "codecraft_prompt";
const FAILURE_BANNER: &str = "Failed to generate. Please try again.";

/// What the user asked for this frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    None,
    Generate(String),
}

#[derive(Default)]
pub struct PromptPanel {
    pub prompt: String,
}

impl PromptPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status line shown under the prompt
    pub fn status_text(status: &GenerationStatus) -> &'static str {
        if status.is_in_flight() {
            "Dreaming up code..."
        } else {
            "Ready to create"
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, status: &GenerationStatus) -> PromptAction {
        let prompt_id = egui::Id::new(PROMPT_ID);
        let in_flight = status.is_in_flight();
        let mut action = PromptAction::None;

        ui.heading("CodeCraft");
        ui.label("Describe a page and it will be built for you.");
        ui.add_space(8.0);

        // Consume Ctrl/Cmd+Enter before the text edit turns it into a newline
        let had_focus = ui.memory(|m| m.has_focus(prompt_id));
        let submit_shortcut =
            had_focus && ui.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Enter));

        ui.add(
            egui::TextEdit::multiline(&mut self.prompt)
                .id(prompt_id)
                .hint_text("A pomodoro timer with a dark theme...")
                .desired_rows(6)
                .desired_width(f32::INFINITY)
                .interactive(!in_flight),
        );

        let can_generate = !in_flight && !self.prompt.trim().is_empty();
        ui.horizontal(|ui| {
            let button = ui.add_enabled(can_generate, egui::Button::new("Generate"));
            if button.clicked() || (submit_shortcut && can_generate) {
                action = PromptAction::Generate(self.prompt.clone());
            }
            if in_flight {
                ui.spinner();
            }
            ui.label(Self::status_text(status));
        });

        if matches!(status, GenerationStatus::Failed(_)) {
            ui.add_space(4.0);
            ui.colored_label(ui.visuals().error_fg_color, FAILURE_BANNER);
        }

        ui.add_space(12.0);
        ui.separator();
        ui.label(egui::RichText::new("Try one of these").strong());
        for suggestion in SUGGESTIONS {
            let button = ui.add_enabled(!in_flight, egui::Button::new(*suggestion).wrap());
            if button.clicked() {
                self.prompt = suggestion.to_string();
                ui.memory_mut(|m| m.request_focus(prompt_id));
            }
        }

        action
    }
}
