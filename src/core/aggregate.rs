// ICT Parser - core/aggregate.rs
//
// Merges per-file records into one column space.
// Core layer: works on already-extracted `LogRecord`s; reading the files is
// the app layer's job (app::pipeline).
//
// Records are merged strictly in the order they are pushed, so row order,
// failure order, and limit precedence are reproducible.

use crate::core::model::{AggregateResult, FailureEntry, Limits, LogRecord, RowRecord};
use crate::util::constants;
use std::collections::{BTreeMap, BTreeSet};

/// Incremental aggregator. Push one record per input file, then `finish`.
#[derive(Debug, Default)]
pub struct Aggregator {
    names: BTreeSet<String>,
    rows: Vec<RowRecord>,
    limits: BTreeMap<String, Limits>,
    failures: Vec<FailureEntry>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one file's record. Later records override earlier limits.
    pub fn push(&mut self, record: &LogRecord) {
        self.failures.extend(record.failures.iter().cloned());

        for name in record.measurements.keys() {
            if !self.names.contains(name) {
                self.names.insert(name.clone());
            }
        }

        for (name, limits) in &record.limits {
            self.limits.insert(name.clone(), limits.clone());
        }

        self.rows.push(RowRecord::from_record(record));
    }

    /// Number of records merged so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build the final result. Identity columns come first and are never
    /// repeated, even when a file reported a measurement under that name.
    pub fn finish(self) -> AggregateResult {
        let mut columns: Vec<String> = constants::IDENTITY_COLUMNS
            .iter()
            .map(|c| (*c).to_string())
            .collect();
        columns.extend(
            self.names
                .into_iter()
                .filter(|name| !constants::IDENTITY_COLUMNS.contains(&name.as_str())),
        );

        tracing::debug!(
            rows = self.rows.len(),
            columns = columns.len(),
            limits = self.limits.len(),
            failures = self.failures.len(),
            "Aggregation complete"
        );

        AggregateResult {
            columns,
            rows: self.rows,
            limits: self.limits,
            failures: self.failures,
        }
    }
}

/// Aggregate records already held in memory, in iteration order.
pub fn aggregate_records<'a, I>(records: I) -> AggregateResult
where
    I: IntoIterator<Item = &'a LogRecord>,
{
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.push(record);
    }
    aggregator.finish()
}
