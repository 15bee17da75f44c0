// ICT Parser - ui/theme.rs
//
// Colours and layout constants.
// No dependencies on app state or business logic.

use egui::Color32;

/// Error text (status bar, load/export failures).
pub const ERROR_TEXT: Color32 = Color32::from_rgb(220, 38, 38); // Red 600

/// Failed-tests notice.
pub const WARNING_TEXT: Color32 = Color32::from_rgb(217, 119, 6); // Amber 600
pub const WARNING_BG: Color32 = Color32::from_rgba_premultiplied(217, 119, 6, 25);

/// Muted helper text.
pub const HINT_TEXT: Color32 = Color32::from_rgb(156, 163, 175); // Gray 400

/// Layout constants.
pub const MOVE_BUTTON_COLUMN_WIDTH: f32 = 44.0;
pub const MOVE_BUTTON_WIDTH: f32 = 32.0;
pub const FOOTER_HEIGHT: f32 = 40.0;
pub const LIST_MIN_WIDTH: f32 = 120.0;
pub const FOLDER_PICKER_TEXT_WIDTH: f32 = 300.0;
pub const WINDOW_SIZE: [f32; 2] = [800.0, 500.0];
pub const WINDOW_MIN_SIZE: [f32; 2] = [560.0, 360.0];
