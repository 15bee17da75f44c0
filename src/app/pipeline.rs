// ICT Parser - app/pipeline.rs
//
// Path-based orchestration shared by the CLI and the GUI:
//   folder -> file list -> read + extract each file -> aggregate -> exports.
//
// Files are processed strictly in the given order; an unreadable file aborts
// the whole aggregation so that a partial table is never exported silently.

use crate::core::aggregate::Aggregator;
use crate::core::extractor;
use crate::core::export;
use crate::core::model::{AggregateResult, FailureEntry};
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::{ExportError, IctError, Result};
use std::path::{Path, PathBuf};

/// Read, extract, and aggregate the given files in order.
pub fn aggregate_files<P: AsRef<Path>>(paths: &[P]) -> Result<AggregateResult> {
    let mut aggregator = Aggregator::new();

    for path in paths {
        let path = path.as_ref();
        let text = fs::read_file_lossy(path).map_err(|e| IctError::Io {
            path: path.to_path_buf(),
            operation: "read log file",
            source: e,
        })?;
        let record = extractor::extract(&text, path);
        aggregator.push(&record);
    }

    let result = aggregator.finish();
    tracing::info!(
        files = result.rows.len(),
        tests = result.tests().len(),
        failures = result.failures.len(),
        "Logs aggregated"
    );
    Ok(result)
}

/// List `dir` and aggregate every visible file in it.
pub fn aggregate_folder(dir: &Path) -> Result<(Vec<PathBuf>, AggregateResult)> {
    let files = fs::list_log_files(dir)?;
    let result = aggregate_files(&files)?;
    Ok((files, result))
}

/// Failures file written beside `export_path`: `<stem><suffix>.csv`.
pub fn failures_path_for(export_path: &Path, suffix: &str) -> PathBuf {
    let stem = export_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    export_path.with_file_name(format!(
        "{stem}{suffix}.{}",
        constants::EXPORT_EXTENSION
    ))
}

fn create(path: &Path) -> std::result::Result<std::io::BufWriter<std::fs::File>, ExportError> {
    std::fs::File::create(path)
        .map(std::io::BufWriter::new)
        .map_err(|e| ExportError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Write the primary table for `columns` to `path`.
pub fn export_table<S: AsRef<str>>(
    path: &Path,
    columns: &[S],
    result: &AggregateResult,
) -> Result<usize> {
    let file = create(path)?;
    let rows = export::write_table(columns, &result.rows, &result.limits, file, path)?;
    Ok(rows)
}

/// Write the failures log to `path`.
pub fn export_failures(path: &Path, failures: &[FailureEntry]) -> Result<usize> {
    let file = create(path)?;
    let count = export::write_failures(failures, file, path)?;
    Ok(count)
}

/// Write the whole aggregate as JSON to `path`.
pub fn export_json(path: &Path, result: &AggregateResult) -> Result<()> {
    let file = create(path)?;
    export::write_json(result, file, path)?;
    Ok(())
}

/// What a complete export should produce.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    /// Primary table destination.
    pub path: &'a Path,
    /// Export schema; identity columns first.
    pub columns: &'a [String],
    /// Also write the failures file (only when there are failures).
    pub with_failures: bool,
    /// Suffix for the failures file name.
    pub failures_suffix: &'a str,
}

/// What a complete export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub table_path: PathBuf,
    pub rows: usize,
    pub failures_path: Option<PathBuf>,
    pub failures: usize,
}

/// Primary table plus, when requested and non-empty, the failures file.
///
/// A request with no measurement columns is refused before anything is
/// written.
pub fn export_all(result: &AggregateResult, request: &ExportRequest<'_>) -> Result<ExportOutcome> {
    if request.columns.len() <= constants::IDENTITY_COLUMNS.len() {
        return Err(ExportError::EmptySelection.into());
    }

    let rows = export_table(request.path, request.columns, result)?;
    tracing::info!(path = %request.path.display(), rows, "Table exported");

    let mut outcome = ExportOutcome {
        table_path: request.path.to_path_buf(),
        rows,
        failures_path: None,
        failures: 0,
    };

    if request.with_failures && !result.failures.is_empty() {
        let failures_path = failures_path_for(request.path, request.failures_suffix);
        outcome.failures = export_failures(&failures_path, &result.failures)?;
        tracing::info!(
            path = %failures_path.display(),
            failures = outcome.failures,
            "Failures exported"
        );
        outcome.failures_path = Some(failures_path);
    }

    Ok(outcome)
}
