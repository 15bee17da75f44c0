// ICT Parser - ui/panels/folder_picker.rs
//
// First screen: explains what to pick and offers the Choose Folder button.
// Writes `state.request_choose_folder`; gui.rs opens the dialog.

use crate::app::state::AppState;
use crate::ui::theme;

/// Render the folder picker.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.3);

        ui.scope(|ui| {
            ui.set_max_width(theme::FOLDER_PICKER_TEXT_WIDTH);
            ui.label(
                "Select the folder containing your ICT log files.\n\
                 All log files to be parsed should be stored in this folder.",
            );
        });

        ui.add_space(10.0);

        if ui.button("Choose Folder").clicked() {
            state.request_choose_folder = true;
        }

        if let Some(ref err) = state.error_message {
            ui.add_space(10.0);
            ui.colored_label(theme::ERROR_TEXT, err);
        }
    });
}
