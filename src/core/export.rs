// ICT Parser - core/export.rs
//
// CSV export of aggregated rows (with UL/LL/TOL trailer rows) and of the
// failures log, plus a JSON dump of the whole aggregate.
// Core layer: writes to any Write trait object.

use crate::core::model::{AggregateResult, FailureEntry, Limits, RowRecord};
use crate::util::constants;
use crate::util::error::ExportError;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// CSV writer shared by both exports. Records end in CRLF, and trailer rows
/// may be shorter than the header when fewer than two columns are requested.
fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer)
}

/// Export rows under the given columns, followed by the UL, LL, and TOL
/// trailer rows.
///
/// `columns` may be any subset and order of the aggregated columns as long as
/// the two identity columns come first; the trailers skip them. A column a
/// row has no value for is written empty. Returns the number of data rows.
pub fn write_table<W, S>(
    columns: &[S],
    rows: &[RowRecord],
    limits: &BTreeMap<String, Limits>,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError>
where
    W: Write,
    S: AsRef<str>,
{
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv_writer(writer);

    csv_writer
        .write_record(columns.iter().map(|col| col.as_ref()))
        .map_err(csv_err)?;

    let mut count = 0;
    for row in rows {
        csv_writer
            .write_record(
                columns
                    .iter()
                    .map(|col| row.get(col.as_ref()).unwrap_or("")),
            )
            .map_err(csv_err)?;
        count += 1;
    }

    let measured = || {
        columns
            .iter()
            .skip(constants::IDENTITY_COLUMNS.len())
            .map(|col| limits.get(col.as_ref()))
    };
    let trailer = |label: &str, cells: Vec<String>| {
        let mut record = vec![String::new(), label.to_string()];
        record.extend(cells);
        record
    };

    let upper = measured()
        .map(|l| l.map(|l| l.upper.clone()).unwrap_or_default())
        .collect();
    let lower = measured()
        .map(|l| l.map(|l| l.lower.clone()).unwrap_or_default())
        .collect();
    let tolerance = measured()
        .map(|l| {
            l.and_then(Limits::tolerance)
                .map(format_float)
                .unwrap_or_default()
        })
        .collect();

    csv_writer
        .write_record(trailer(constants::UPPER_LIMIT_LABEL, upper))
        .map_err(csv_err)?;
    csv_writer
        .write_record(trailer(constants::LOWER_LIMIT_LABEL, lower))
        .map_err(csv_err)?;
    csv_writer
        .write_record(trailer(constants::TOLERANCE_LABEL, tolerance))
        .map_err(csv_err)?;

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(
        path = %export_path.display(),
        columns = columns.len(),
        rows = count,
        "Table written"
    );

    Ok(count)
}

/// Export failures as `File,Block,Test,Value`, in stored order.
pub fn write_failures<W: Write>(
    failures: &[FailureEntry],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv_writer(writer);

    csv_writer
        .write_record(constants::FAILURES_HEADER)
        .map_err(csv_err)?;

    let mut count = 0;
    for failure in failures {
        let file = failure.source_file.display().to_string();
        csv_writer
            .write_record([
                file.as_str(),
                failure.block.as_str(),
                failure.test.as_str(),
                failure.value.as_str(),
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export the whole aggregate (columns, rows, limits, failures) as JSON.
pub fn write_json<W: Write>(
    result: &AggregateResult,
    mut writer: W,
    export_path: &Path,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, result).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })
}

/// Render a float in the report format: shortest round-trip
/// digits, a trailing `.0` on integral values, and `e+NN`/`e-NN` exponents.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let debug = format!("{value:?}");
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => debug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LogRecord;
    use std::path::PathBuf;

    fn row(tester: &str, serial: &str, values: &[(&str, &str)]) -> RowRecord {
        let mut record = LogRecord {
            tester: Some(tester.to_string()),
            serial: Some(serial.to_string()),
            ..Default::default()
        };
        for (k, v) in values {
            record.measurements.insert(k.to_string(), v.to_string());
        }
        RowRecord::from_record(&record)
    }

    fn read_back(buf: &[u8]) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(buf)
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_table_export() {
        let columns = ["Tester", "Serial", "R1", "TEMP"];
        let rows = vec![
            row("T1", "S1", &[("TEMP", "23.5"), ("R1", "100")]),
            row("T1", "S2", &[("R1", "101")]),
        ];
        let mut limits = BTreeMap::new();
        limits.insert("TEMP".to_string(), Limits::new("30", "10"));
        limits.insert("R1".to_string(), Limits::new("", "90"));

        let mut buf = Vec::new();
        let count =
            write_table(&columns, &rows, &limits, &mut buf, &PathBuf::from("out.csv")).unwrap();
        assert_eq!(count, 2);

        let records = read_back(&buf);
        assert_eq!(
            records,
            vec![
                vec!["Tester", "Serial", "R1", "TEMP"],
                vec!["T1", "S1", "100", "23.5"],
                vec!["T1", "S2", "101", ""],
                vec!["", "UL", "", "30"],
                vec!["", "LL", "90", "10"],
                vec!["", "TOL", "", "20.0"],
            ]
        );
        assert!(String::from_utf8(buf).unwrap().contains("\r\n"));
    }

    #[test]
    fn test_header_round_trips_custom_order() {
        let columns = vec![
            "Tester".to_string(),
            "Serial".to_string(),
            "Z, quoted".to_string(),
            "A".to_string(),
        ];
        let mut buf = Vec::new();
        write_table(
            &columns,
            &[],
            &BTreeMap::new(),
            &mut buf,
            &PathBuf::from("out.csv"),
        )
        .unwrap();
        let records = read_back(&buf);
        assert_eq!(records[0], columns);
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_tolerance_cells() {
        let columns = ["Tester", "Serial", "A", "B", "C"];
        let mut limits = BTreeMap::new();
        limits.insert("A".to_string(), Limits::new("5.0", "1.0"));
        limits.insert("B".to_string(), Limits::new("", "1.0"));
        limits.insert("C".to_string(), Limits::new("high", "1.0"));

        let mut buf = Vec::new();
        write_table(&columns, &[], &limits, &mut buf, &PathBuf::from("out.csv")).unwrap();
        let records = read_back(&buf);
        assert_eq!(records.last().unwrap(), &vec!["", "TOL", "4.0", "", ""]);
    }

    #[test]
    fn test_failures_export() {
        let failures = vec![
            FailureEntry {
                source_file: PathBuf::from("b.log"),
                block: "TEMP".to_string(),
                test: "TEMP".to_string(),
                value: "50".to_string(),
            },
            FailureEntry {
                source_file: PathBuf::from("a.log"),
                block: "U5".to_string(),
                test: "U5_GND".to_string(),
                value: "0.25".to_string(),
            },
        ];
        let mut buf = Vec::new();
        let count = write_failures(&failures, &mut buf, &PathBuf::from("f.csv")).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            read_back(&buf),
            vec![
                vec!["File", "Block", "Test", "Value"],
                vec!["b.log", "TEMP", "TEMP", "50"],
                vec!["a.log", "U5", "U5_GND", "0.25"],
            ]
        );
    }

    #[test]
    fn test_json_export() {
        let result = AggregateResult::default();
        let mut buf = Vec::new();
        write_json(&result, &mut buf, &PathBuf::from("out.json")).unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("\"Tester\""));
        assert!(output.contains("\"failures\""));
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(4.0), "4.0");
        assert_eq!(format_float(-2.0), "-2.0");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(3.6 - 3.0), "0.6000000000000001");
        assert_eq!(format_float(f64::NAN), "nan");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
    }
}
