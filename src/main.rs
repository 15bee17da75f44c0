// ICT Parser - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading
// 3. Logging initialisation (debug mode support)
// 4. Headless export (--output / --list) or eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` can keep using
// `crate::app::...`, `crate::ui::...` etc.
pub use ict_parser::app;
pub use ict_parser::core;
pub use ict_parser::platform;
pub use ict_parser::ui;
pub use ict_parser::util;

use crate::app::pipeline::{self, ExportRequest};
use clap::Parser;
use crate::core::selection::ColumnSelection;
use std::path::PathBuf;
use std::process::ExitCode;
use crate::util::error::{ExportError, IctError};

/// ICT Parser - in-circuit-test log extractor.
///
/// Reads every log file in a folder, collects passing measurements into one
/// CSV row per board (plus UL/LL/TOL rows), and writes failing measurements
/// to a separate failures CSV. Without --output or --list the GUI opens.
#[derive(Parser, Debug)]
#[command(name = "ict-parser", version, about)]
struct Cli {
    /// Folder containing the ICT log files.
    folder: Option<PathBuf>,

    /// Write the CSV here instead of opening the GUI.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Test column to export (exact name or glob, repeatable). Default: all.
    #[arg(short = 'c', long = "columns", value_delimiter = ',')]
    columns: Vec<String>,

    /// Print the discovered test columns and exit.
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// Do not write the failures CSV.
    #[arg(long = "no-failures")]
    no_failures: bool,

    /// Also dump the whole aggregate as JSON to this file.
    #[arg(long = "json")]
    json: Option<PathBuf>,

    /// Use this config file instead of the platform default.
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Write a timestamped debug log file into the current directory.
    #[arg(long = "debug-log")]
    debug_log: bool,
}

/// Exit status for errors caused by what the user supplied.
const EXIT_USER_INPUT: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config first so its logging section can shape the subscriber.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform::config::PlatformPaths::resolve().config_file());
    let (config, config_warnings) = platform::config::load_config(&config_path);

    let log_file = if cli.debug_log {
        Some(util::logging::debug_log_path(
            std::path::Path::new("."),
            chrono::Local::now(),
        ))
    } else {
        config.log_file.clone()
    };
    util::logging::init(
        cli.debug || cli.debug_log,
        config.log_level.as_deref(),
        log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "ICT Parser starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    if cli.list || cli.output.is_some() {
        return match run_headless(&cli, &config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "Headless run failed");
                eprintln!("Error: {e}");
                if e.is_user_input() {
                    ExitCode::from(EXIT_USER_INPUT)
                } else {
                    ExitCode::FAILURE
                }
            }
        };
    }

    let mut state = app::state::AppState::new(config, config_warnings, cli.debug);
    if let Some(ref folder) = cli.folder {
        state.pending_folder = Some(folder.clone());
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size(ui::theme::WINDOW_SIZE)
            .with_min_inner_size(ui::theme::WINDOW_MIN_SIZE),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |_cc| Ok(Box::new(gui::IctParserApp::new(state)))),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch ICT Parser GUI: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Aggregate the folder and either list the tests or write the exports.
fn run_headless(cli: &Cli, config: &platform::config::AppConfig) -> Result<(), IctError> {
    let folder = cli.folder.clone().unwrap_or_else(|| PathBuf::from("."));
    let (files, result) = pipeline::aggregate_folder(&folder)?;

    if cli.list {
        for test in result.tests() {
            println!("{test}");
        }
        return Ok(());
    }

    let Some(ref output) = cli.output else {
        return Ok(());
    };

    let selection = if cli.columns.is_empty() {
        let mut all = ColumnSelection::new(result.tests().iter().cloned());
        all.select_all();
        all
    } else {
        let (selection, unmatched) =
            ColumnSelection::from_patterns(result.tests().iter().cloned(), &cli.columns);
        for pattern in &unmatched {
            tracing::warn!(pattern = %pattern, "Column pattern matched no test");
            eprintln!("Warning: '{pattern}' matched no test column");
        }
        selection
    };
    if selection.is_empty() {
        return Err(ExportError::EmptySelection.into());
    }

    let columns = selection.export_columns();
    let request = ExportRequest {
        path: output,
        columns: &columns,
        with_failures: config.export_failures && !cli.no_failures,
        failures_suffix: &config.failures_suffix,
    };
    let outcome = pipeline::export_all(&result, &request)?;

    println!(
        "Parsed {} file(s); exported {} row(s) x {} test(s) to {}",
        files.len(),
        outcome.rows,
        selection.selected_count(),
        outcome.table_path.display()
    );
    if !result.failures.is_empty() {
        match outcome.failures_path {
            Some(ref path) => println!(
                "There are {} failed tests. Failures logged to {}",
                outcome.failures,
                path.display()
            ),
            None => println!(
                "There are {} failed tests (failures export disabled).",
                result.failures.len()
            ),
        }
    }

    if let Some(ref json) = cli.json {
        pipeline::export_json(json, &result)?;
        println!("Aggregate written to {}", json.display());
    }

    Ok(())
}
