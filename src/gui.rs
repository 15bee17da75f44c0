// ICT Parser - gui.rs
//
// Top-level eframe::App implementation.
// Routes between the two screens and services the flags panels set:
// native dialogs (rfd) and the synchronous folder load / export.

use crate::app::state::{AppState, Screen};
use crate::ui;

/// The ICT Parser application.
pub struct IctParserApp {
    pub state: AppState,
}

impl IctParserApp {
    /// Create a new application instance with the given state.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    fn handle_requests(&mut self) {
        if self.state.request_choose_folder {
            self.state.request_choose_folder = false;
            let mut dialog = rfd::FileDialog::new().set_title("Select folder with log files");
            if let Some(ref current) = self.state.folder {
                dialog = dialog.set_directory(current);
            }
            if let Some(path) = dialog.pick_folder() {
                self.state.pending_folder = Some(path);
            }
        }

        if let Some(folder) = self.state.pending_folder.take() {
            self.state.load_folder(&folder);
        }

        if self.state.request_export {
            self.state.request_export = false;
            self.export();
        }
    }

    fn export(&mut self) {
        if self.state.selection.is_empty() {
            let msg = "Please select at least one test.".to_string();
            self.state.status_message = msg.clone();
            self.state.error_message = Some(msg);
            return;
        }

        let mut dialog = rfd::FileDialog::new()
            .set_title("Save CSV as...")
            .add_filter("CSV files", &["csv"])
            .set_file_name(&self.state.config.default_file_name);
        if let Some(ref folder) = self.state.folder {
            dialog = dialog.set_directory(folder);
        }

        let Some(dest) = dialog.save_file() else {
            return;
        };
        if let Err(e) = self.state.export_to(&dest) {
            tracing::warn!(path = %dest.display(), error = %e, "Export failed");
        }
    }
}

impl eframe::App for IctParserApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_requests();

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match self.state.error_message {
                    Some(ref err) => {
                        ui.colored_label(ui::theme::ERROR_TEXT, err);
                    }
                    None => {
                        ui.label(&self.state.status_message);
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if !self.state.warnings.is_empty() {
                        ui.colored_label(
                            ui::theme::WARNING_TEXT,
                            format!("{} config warning(s)", self.state.warnings.len()),
                        )
                        .on_hover_text(self.state.warnings.join("\n"));
                    }
                    if self.state.debug_mode {
                        ui.label(egui::RichText::new("DEBUG").small().weak());
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.state.screen {
            Screen::FolderPicker => ui::panels::folder_picker::render(ui, &mut self.state),
            Screen::ColumnPicker => ui::panels::column_picker::render(ui, &mut self.state),
        });
    }
}
