//! Editable source view

use super::html_syntax::html_syntax;
use super::theme::ThemeChoice;
use crate::app::preview::EditBuffer;
use eframe::egui;
use egui_code_editor::CodeEditor;

/// Shows the source document and feeds every keystroke to the publisher.
///
/// Returns true when the text changed this frame.
pub fn show_code_view(ui: &mut egui::Ui, buffer: &mut EditBuffer, theme: ThemeChoice) -> bool {
    let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
    let rows = ((ui.available_height() / row_height.max(1.0)) as usize).max(10);
    let before = buffer.source().to_owned();

    egui::ScrollArea::vertical()
        .id_salt("code_view_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            CodeEditor::default()
                .id_source("code_view")
                .with_rows(rows)
                .with_fontsize(14.0)
                .with_theme(theme.code_theme())
                .with_syntax(html_syntax())
                .with_numlines(true)
                .show(ui, buffer.source_mut());
        });

    let changed = buffer.source() != before;
    if changed {
        buffer.commit_edit();
    }
    changed
}
