// ICT Parser - ui/panels/column_picker.rs
//
// Second screen: "Available Tests" and "Selected Tests" lists with search
// boxes, the four move buttons, the failed-tests notice, and the export
// footer.
//
// Click toggles an item's highlight; double-click moves it straight across.
// Writes `state.request_export` / `state.request_choose_folder`; gui.rs
// consumes them each frame.

use crate::app::state::AppState;
use crate::ui::theme;

/// Which list is being drawn.
#[derive(Clone, Copy)]
enum Side {
    Available,
    Selected,
}

/// Render the column picker.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    if state.show_failure_notice {
        render_failure_notice(ui, state);
        ui.add_space(4.0);
    }

    let list_height = (ui.available_height() - theme::FOOTER_HEIGHT).max(0.0);
    let list_width = ((ui.available_width() - theme::MOVE_BUTTON_COLUMN_WIDTH) / 2.0
        - ui.spacing().item_spacing.x * 2.0)
        .max(theme::LIST_MIN_WIDTH);

    ui.horizontal_top(|ui| {
        ui.vertical(|ui| {
            ui.set_width(list_width);
            render_list(ui, state, Side::Available, list_height);
        });

        ui.vertical(|ui| {
            ui.set_width(theme::MOVE_BUTTON_COLUMN_WIDTH);
            ui.add_space(list_height * 0.3);
            render_move_buttons(ui, state);
        });

        ui.vertical(|ui| {
            ui.set_width(list_width);
            render_list(ui, state, Side::Selected, list_height);
        });
    });

    ui.separator();
    render_footer(ui, state);
}

fn render_failure_notice(ui: &mut egui::Ui, state: &mut AppState) {
    let n = state.result.failures.len();
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(format!(
                " There are {n} failed tests. \
                 Failed tests can be optionally exported to another CSV. "
            ))
            .color(theme::WARNING_TEXT)
            .background_color(theme::WARNING_BG),
        );
        if ui.small_button("Dismiss").clicked() {
            state.show_failure_notice = false;
        }
    });
}

fn render_list(ui: &mut egui::Ui, state: &mut AppState, side: Side, height: f32) {
    let (title, hint, salt) = match side {
        Side::Available => ("Available Tests", "Search Available...", "available_list"),
        Side::Selected => ("Selected Tests", "Search Selected...", "selected_list"),
    };

    let search = match side {
        Side::Available => &mut state.available_search,
        Side::Selected => &mut state.selected_search,
    };
    ui.add(
        egui::TextEdit::singleline(search)
            .hint_text(hint)
            .desired_width(f32::INFINITY),
    );

    ui.label(title);

    // Collect first so the loop below can mutate state.
    let items: Vec<String> = match side {
        Side::Available => state.selection.available(&state.available_search),
        Side::Selected => state.selection.selected(&state.selected_search),
    }
    .into_iter()
    .map(str::to_string)
    .collect();

    let mut double_clicked: Option<String> = None;

    egui::Frame::group(ui.style()).show(ui, |ui| {
        egui::ScrollArea::vertical()
            .id_salt(salt)
            .max_height(height)
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                if items.is_empty() {
                    ui.label(egui::RichText::new("(none)").color(theme::HINT_TEXT));
                }
                for name in &items {
                    let marked = match side {
                        Side::Available => state.available_marked.contains(name),
                        Side::Selected => state.selected_marked.contains(name),
                    };
                    let response = ui.selectable_label(marked, name);
                    if response.double_clicked() {
                        double_clicked = Some(name.clone());
                    } else if response.clicked() {
                        match side {
                            Side::Available => state.toggle_available_mark(name),
                            Side::Selected => state.toggle_selected_mark(name),
                        }
                    }
                }
            });
    });

    if let Some(name) = double_clicked {
        match side {
            Side::Available => {
                state.available_marked.remove(&name);
                state.selection.select([&name]);
            }
            Side::Selected => {
                state.selected_marked.remove(&name);
                state.selection.deselect([&name]);
            }
        }
    }

    let count = match side {
        Side::Available => state.selection.available("").len(),
        Side::Selected => state.selection.selected_count(),
    };
    ui.label(egui::RichText::new(format!("{count} test(s)")).small().weak());
}

fn render_move_buttons(ui: &mut egui::Ui, state: &mut AppState) {
    let button = |text: &str| egui::Button::new(text).min_size(egui::vec2(theme::MOVE_BUTTON_WIDTH, 0.0));

    ui.vertical_centered(|ui| {
        if ui
            .add_enabled(!state.available_marked.is_empty(), button(">"))
            .on_hover_text("Move highlighted tests to Selected")
            .clicked()
        {
            state.move_marked_right();
        }
        ui.add_space(5.0);
        if ui
            .add(button(">>"))
            .on_hover_text("Select every test")
            .clicked()
        {
            state.move_all_right();
        }
        ui.add_space(5.0);
        if ui
            .add_enabled(!state.selected_marked.is_empty(), button("<"))
            .on_hover_text("Move highlighted tests back to Available")
            .clicked()
        {
            state.move_marked_left();
        }
        ui.add_space(5.0);
        if ui
            .add(button("<<"))
            .on_hover_text("Clear the selection")
            .clicked()
        {
            state.move_all_left();
        }
    });
}

fn render_footer(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.checkbox(&mut state.export_failures, "Export failures to CSV");

        if ui.button("Change Folder\u{2026}").clicked() {
            state.request_choose_folder = true;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Export CSV").clicked() {
                state.request_export = true;
            }
            if let Some(ref folder) = state.folder {
                ui.label(
                    egui::RichText::new(format!(
                        "{} file(s) from {}",
                        state.files.len(),
                        folder.display()
                    ))
                    .color(theme::HINT_TEXT),
                );
            }
        });
    });
}
