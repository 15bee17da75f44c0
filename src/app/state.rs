// ICT Parser - app/state.rs
//
// Application state management. Holds the aggregated results of the chosen
// folder, the column selection, and the flags panels use to request work.
// Owned by the eframe::App implementation.

use crate::app::pipeline::{self, ExportOutcome, ExportRequest};
use crate::core::model::AggregateResult;
use crate::core::selection::ColumnSelection;
use crate::platform::config::AppConfig;
use crate::util::error::IctError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Waiting for the user to choose a log folder.
    #[default]
    FolderPicker,
    /// Folder aggregated; the user picks columns and exports.
    ColumnPicker,
}

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Validated configuration.
    pub config: AppConfig,

    /// Current screen.
    pub screen: Screen,

    /// Folder whose files were aggregated.
    pub folder: Option<PathBuf>,

    /// Files read from `folder`, in processing order.
    pub files: Vec<PathBuf>,

    /// Aggregated results of `files`.
    pub result: AggregateResult,

    /// Available/selected split of the discovered tests.
    pub selection: ColumnSelection,

    /// Search text above the "Available Tests" list.
    pub available_search: String,

    /// Search text above the "Selected Tests" list.
    pub selected_search: String,

    /// Items highlighted in the "Available Tests" list.
    pub available_marked: BTreeSet<String>,

    /// Items highlighted in the "Selected Tests" list.
    pub selected_marked: BTreeSet<String>,

    /// "Export failures to CSV" checkbox.
    pub export_failures: bool,

    /// Whether the failed-tests notice is still shown.
    pub show_failure_notice: bool,

    /// Status message for the status bar.
    pub status_message: String,

    /// Last error worth showing prominently (cleared on the next action).
    pub error_message: Option<String>,

    /// Non-fatal warnings (config problems).
    pub warnings: Vec<String>,

    /// A panel asked for the folder dialog.
    pub request_choose_folder: bool,

    /// A panel asked for the save dialog.
    pub request_export: bool,

    /// Folder to load on the next frame (dialog result or CLI argument).
    pub pending_folder: Option<PathBuf>,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,
}

impl AppState {
    /// Create initial state.
    pub fn new(config: AppConfig, warnings: Vec<String>, debug_mode: bool) -> Self {
        let export_failures = config.export_failures;
        Self {
            config,
            screen: Screen::FolderPicker,
            folder: None,
            files: Vec::new(),
            result: AggregateResult::default(),
            selection: ColumnSelection::default(),
            available_search: String::new(),
            selected_search: String::new(),
            available_marked: BTreeSet::new(),
            selected_marked: BTreeSet::new(),
            export_failures,
            show_failure_notice: false,
            status_message: "Ready. Choose a folder containing ICT log files.".to_string(),
            error_message: None,
            warnings,
            request_choose_folder: false,
            request_export: false,
            pending_folder: None,
            debug_mode,
        }
    }

    /// List and aggregate `folder`, then switch to column selection.
    ///
    /// On failure the previous results are kept and the error is shown.
    pub fn load_folder(&mut self, folder: &Path) {
        self.error_message = None;
        match pipeline::aggregate_folder(folder) {
            Ok((files, result)) => {
                self.selection = ColumnSelection::new(result.tests().iter().cloned());
                self.status_message = format!(
                    "Parsed {} file(s): {} test(s), {} failure(s).",
                    files.len(),
                    result.tests().len(),
                    result.failures.len()
                );
                self.show_failure_notice = !result.failures.is_empty();
                self.folder = Some(folder.to_path_buf());
                self.files = files;
                self.result = result;
                self.available_search.clear();
                self.selected_search.clear();
                self.clear_marks();
                self.screen = Screen::ColumnPicker;
            }
            Err(e) => {
                tracing::warn!(folder = %folder.display(), error = %e, "Folder load failed");
                let msg = if e.is_user_input() {
                    e.to_string()
                } else {
                    format!("Failed to aggregate: {e}")
                };
                self.status_message = msg.clone();
                self.error_message = Some(msg);
            }
        }
    }

    /// Toggle an item's highlight in the available list.
    pub fn toggle_available_mark(&mut self, name: &str) {
        toggle(&mut self.available_marked, name);
    }

    /// Toggle an item's highlight in the selected list.
    pub fn toggle_selected_mark(&mut self, name: &str) {
        toggle(&mut self.selected_marked, name);
    }

    /// `>`: move the highlighted available tests to the selection.
    pub fn move_marked_right(&mut self) {
        let marked = std::mem::take(&mut self.available_marked);
        self.selection.select(&marked);
    }

    /// `>>`: select every test.
    pub fn move_all_right(&mut self) {
        self.selection.select_all();
        self.clear_marks();
    }

    /// `<`: move the highlighted selected tests back.
    pub fn move_marked_left(&mut self) {
        let marked = std::mem::take(&mut self.selected_marked);
        self.selection.deselect(&marked);
    }

    /// `<<`: clear the selection.
    pub fn move_all_left(&mut self) {
        self.selection.deselect_all();
        self.clear_marks();
    }

    fn clear_marks(&mut self) {
        self.available_marked.clear();
        self.selected_marked.clear();
    }

    /// Export the current selection to `path`, plus failures when ticked.
    pub fn export_to(&mut self, path: &Path) -> Result<ExportOutcome, IctError> {
        self.error_message = None;
        let columns = self.selection.export_columns();
        let request = ExportRequest {
            path,
            columns: &columns,
            with_failures: self.export_failures,
            failures_suffix: &self.config.failures_suffix,
        };
        let outcome = pipeline::export_all(&self.result, &request);
        match &outcome {
            Ok(done) => {
                self.status_message = match &done.failures_path {
                    Some(fp) => format!(
                        "CSV exported to {} ({} rows). Failures logged to {}.",
                        done.table_path.display(),
                        done.rows,
                        fp.display()
                    ),
                    None => format!(
                        "CSV exported to {} ({} rows).",
                        done.table_path.display(),
                        done.rows
                    ),
                };
            }
            Err(e) => {
                let msg = e.to_string();
                self.status_message = msg.clone();
                self.error_message = Some(msg);
            }
        }
        outcome
    }

    /// Return to the folder picker and drop all results.
    pub fn clear(&mut self) {
        self.screen = Screen::FolderPicker;
        self.folder = None;
        self.files.clear();
        self.result = AggregateResult::default();
        self.selection = ColumnSelection::default();
        self.available_search.clear();
        self.selected_search.clear();
        self.clear_marks();
        self.show_failure_notice = false;
        self.error_message = None;
        self.status_message = "Ready.".to_string();
    }
}

fn toggle(set: &mut BTreeSet<String>, name: &str) {
    if !set.remove(name) {
        set.insert(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), Vec::new(), false)
    }

    fn folder_with_logs() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.log"),
            "{@BTEST|SA}\n{@BLOCK|R1\n{@A-RES|0|10{@LIM2|11|9}}\n{@BLOCK|R2\n{@A-RES|1|99{@LIM2|11|9}}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.log"),
            "{@BTEST|SB}\n{@BLOCK|R2\n{@A-RES|0|10.5{@LIM2|11|9}}\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_load_folder_switches_screen() {
        let dir = folder_with_logs();
        let mut state = state();
        state.load_folder(dir.path());
        assert_eq!(state.screen, Screen::ColumnPicker);
        assert_eq!(state.files.len(), 2);
        assert_eq!(state.selection.available(""), vec!["R1", "R2"]);
        assert!(state.show_failure_notice);
        assert!(state.error_message.is_none());
    }

    #[test]
    fn test_load_empty_folder_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state();
        state.load_folder(dir.path());
        assert_eq!(state.screen, Screen::FolderPicker);
        assert!(state
            .error_message
            .as_deref()
            .unwrap()
            .contains("cannot be empty"));
    }

    #[test]
    fn test_marked_moves() {
        let dir = folder_with_logs();
        let mut state = state();
        state.load_folder(dir.path());

        state.toggle_available_mark("R2");
        state.move_marked_right();
        assert_eq!(state.selection.selected(""), vec!["R2"]);
        assert!(state.available_marked.is_empty());

        state.move_all_right();
        assert_eq!(state.selection.selected_count(), 2);

        state.toggle_selected_mark("R1");
        state.move_marked_left();
        assert_eq!(state.selection.selected(""), vec!["R2"]);

        state.move_all_left();
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_export_with_failures() {
        let dir = folder_with_logs();
        let mut state = state();
        state.load_folder(dir.path());
        state.move_all_right();

        let out = dir.path().join("result.csv");
        let outcome = state.export_to(&out).unwrap();
        assert_eq!(outcome.rows, 2);
        assert_eq!(outcome.failures, 1);
        assert_eq!(
            outcome.failures_path,
            Some(dir.path().join("result_failures.csv"))
        );
        assert!(out.exists());
    }

    #[test]
    fn test_export_requires_selection() {
        let dir = folder_with_logs();
        let mut state = state();
        state.load_folder(dir.path());
        let out = dir.path().join("result.csv");
        assert!(state.export_to(&out).is_err());
        assert_eq!(
            state.error_message.as_deref(),
            Some("Export error: Please select at least one test.")
        );
    }
}
