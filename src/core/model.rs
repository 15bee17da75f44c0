// ICT Parser - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// Every structure here is value-like: produced by one stage, copied (never
// mutated in place) by the next.

use crate::util::constants;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

// =============================================================================
// Limits
// =============================================================================

/// Upper/lower bound pair attached to a measurement column.
///
/// Both bounds keep the textual form found in the log. Either may be empty
/// when the limit spec was missing fields or used an unknown layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Limits {
    pub upper: String,
    pub lower: String,
}

impl Limits {
    pub fn new(upper: impl Into<String>, lower: impl Into<String>) -> Self {
        Self {
            upper: upper.into(),
            lower: lower.into(),
        }
    }

    /// `upper - lower`, or `None` when either bound is empty or not a number.
    pub fn tolerance(&self) -> Option<f64> {
        if self.upper.is_empty() || self.lower.is_empty() {
            return None;
        }
        let upper: f64 = self.upper.parse().ok()?;
        let lower: f64 = self.lower.parse().ok()?;
        Some(upper - lower)
    }
}

// =============================================================================
// Failure entry
// =============================================================================

/// One failing measurement, recorded at the moment it was seen.
///
/// Failures form an append-only event log: a later passing reading of the
/// same column does not remove the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    /// Log file the measurement came from.
    pub source_file: PathBuf,
    /// Block name with any `|NN` suffix removed.
    pub block: String,
    /// Column name (`block` or `block_subname`).
    pub test: String,
    /// Measured value as written in the log.
    pub value: String,
}

// =============================================================================
// Per-file record
// =============================================================================

/// Everything extracted from a single log file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogRecord {
    /// Tester id from field 8 of the `{@BATCH|...}` header.
    pub tester: Option<String>,
    /// Board serial from field 0 of the `{@BTEST|...}` header.
    pub serial: Option<String>,
    /// Passing measurements, column name -> value. A repeated column takes
    /// the latest value.
    pub measurements: BTreeMap<String, String>,
    /// Limits per column, pass or fail, latest spec wins.
    pub limits: BTreeMap<String, Limits>,
    /// Failing measurements in the order they appear in the file.
    pub failures: Vec<FailureEntry>,
}

// =============================================================================
// Aggregated output
// =============================================================================

/// One output row: the board identity plus its passing measurements.
///
/// Identity values are kept apart from the measurements so that a
/// measurement literally named `Tester` or `Serial` can never shadow them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowRecord {
    pub tester: Option<String>,
    pub serial: Option<String>,
    pub values: BTreeMap<String, String>,
}

impl RowRecord {
    /// Seed a row from an extracted record.
    pub fn from_record(record: &LogRecord) -> Self {
        Self {
            tester: record.tester.clone(),
            serial: record.serial.clone(),
            values: record.measurements.clone(),
        }
    }

    /// Value rendered under `column`, `None` when the row has nothing there.
    pub fn get(&self, column: &str) -> Option<&str> {
        match column {
            constants::TESTER_COLUMN => self.tester.as_deref(),
            constants::SERIAL_COLUMN => self.serial.as_deref(),
            other => self.values.get(other).map(String::as_str),
        }
    }
}

/// Result of aggregating any number of log files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    /// `Tester`, `Serial`, then every measurement name sorted ordinally.
    pub columns: Vec<String>,
    /// One row per input file, in input order.
    pub rows: Vec<RowRecord>,
    /// Limits per column; a later file overrides an earlier one.
    pub limits: BTreeMap<String, Limits>,
    /// Failures of every file, file order then within-file order.
    pub failures: Vec<FailureEntry>,
}

impl AggregateResult {
    /// Measurement columns only (everything after the identity columns).
    pub fn tests(&self) -> &[String] {
        let skip = constants::IDENTITY_COLUMNS.len().min(self.columns.len());
        &self.columns[skip..]
    }
}

impl Default for AggregateResult {
    fn default() -> Self {
        Self {
            columns: constants::IDENTITY_COLUMNS
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
            rows: Vec::new(),
            limits: BTreeMap::new(),
            failures: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_of_numeric_limits() {
        assert_eq!(Limits::new("5.0", "1.0").tolerance(), Some(4.0));
        assert_eq!(Limits::new("30", "10").tolerance(), Some(20.0));
    }

    #[test]
    fn tolerance_absent_for_empty_or_garbage() {
        assert_eq!(Limits::new("", "1.0").tolerance(), None);
        assert_eq!(Limits::new("5.0", "").tolerance(), None);
        assert_eq!(Limits::new("5V", "1").tolerance(), None);
        assert_eq!(Limits::default().tolerance(), None);
    }

    #[test]
    fn identity_columns_cannot_be_shadowed() {
        let mut record = LogRecord {
            tester: Some("T1".to_string()),
            serial: None,
            ..Default::default()
        };
        record
            .measurements
            .insert("Tester".to_string(), "bogus".to_string());
        record.measurements.insert("R1".to_string(), "10".to_string());

        let row = RowRecord::from_record(&record);
        assert_eq!(row.get("Tester"), Some("T1"));
        assert_eq!(row.get("Serial"), None);
        assert_eq!(row.get("R1"), Some("10"));
        assert_eq!(row.get("R2"), None);
    }

    #[test]
    fn default_result_has_identity_columns_only() {
        let result = AggregateResult::default();
        assert_eq!(result.columns, vec!["Tester", "Serial"]);
        assert!(result.tests().is_empty());
    }
}
