// ICT Parser - core/extractor.rs
//
// Record extraction from one ICT log text.
// Core layer: accepts the full file content as a string, never touches the
// filesystem directly.
//
// Grammar (all markers are ASCII, so the scanner works on byte offsets and
// every offset it produces is a valid char boundary):
//
//   {@BATCH|f0|f1|...|f8|...}         tester id = f8
//   {@BTEST|f0|...}                    serial    = f0
//   {@BLOCK|NAME|NN\n ...content...    one block per marker
//   {@A-KIND|F|VALUE[|SUBNAME]{@LIMt|l0|l1|...}}
//
// Nothing in here fails: missing or malformed markers simply produce absent
// values, so a damaged file still yields whatever could be read.

use crate::core::model::{FailureEntry, Limits, LogRecord};
use crate::util::constants;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

// =============================================================================
// Public entry point
// =============================================================================

/// Extract tester, serial, passing measurements, limits, and failures from
/// the text of one log file.
///
/// `file_path` is only recorded in failure entries and log events.
pub fn extract(text: &str, file_path: &Path) -> LogRecord {
    let mut record = LogRecord {
        tester: tester_id(text),
        serial: serial_id(text),
        ..Default::default()
    };

    let mut block_count = 0usize;
    let mut measurement_count = 0usize;

    for block in blocks(text) {
        block_count += 1;
        tracing::trace!(
            file = %file_path.display(),
            block = block.name,
            "Block found"
        );

        for m in measurements(block.content) {
            measurement_count += 1;
            let column = m.column_name(block.name);

            if m.passed() {
                record
                    .measurements
                    .insert(column.clone(), m.value.to_string());
            } else {
                tracing::debug!(
                    file = %file_path.display(),
                    block = block.name,
                    test = %column,
                    value = m.value,
                    "Test failed"
                );
                record.failures.push(FailureEntry {
                    source_file: file_path.to_path_buf(),
                    block: block.name.to_string(),
                    test: column.clone(),
                    value: m.value.to_string(),
                });
            }

            record.limits.insert(column, m.limits());
        }
    }

    tracing::debug!(
        file = %file_path.display(),
        tester = ?record.tester,
        serial = ?record.serial,
        blocks = block_count,
        measurements = measurement_count,
        columns = record.measurements.len(),
        failures = record.failures.len(),
        "Extraction complete"
    );

    record
}

// =============================================================================
// Header markers
// =============================================================================

/// `{@NAME|...}` with the interior captured; stops at the first `}`.
fn header_regex(marker: &str) -> Regex {
    Regex::new(&format!(r"{}([^}}]*)\}}", regex::escape(marker))).expect("header regex is valid")
}

fn batch_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| header_regex(constants::BATCH_MARKER))
}

fn btest_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| header_regex(constants::BTEST_MARKER))
}

/// Tester id: field 8 of the first `{@BATCH|...}` marker, trimmed.
///
/// `None` when the marker is missing or has 8 fields or fewer.
pub fn tester_id(text: &str) -> Option<String> {
    let interior = batch_regex().captures(text)?.get(1)?.as_str();
    interior
        .split('|')
        .nth(constants::BATCH_TESTER_FIELD)
        .map(|field| field.trim().to_string())
}

/// Serial id: field 0 of the first `{@BTEST|...}` marker, trimmed.
///
/// Splitting always yields at least one field, so an empty marker interior
/// produces `Some("")` rather than `None`.
pub fn serial_id(text: &str) -> Option<String> {
    let interior = btest_regex().captures(text)?.get(1)?.as_str();
    interior.split('|').next().map(|field| field.trim().to_string())
}

// =============================================================================
// Block segmentation
// =============================================================================

/// One `{@BLOCK|...}` section of a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Block name with any `|NN` suffix dropped.
    pub name: &'a str,
    /// Everything after the block's first line, trimmed.
    pub content: &'a str,
}

/// Split `text` into blocks. The text before the first block marker is the
/// header region and is skipped.
pub fn blocks(text: &str) -> impl Iterator<Item = Block<'_>> {
    text.split(constants::BLOCK_MARKER).skip(1).map(|segment| {
        let (raw_name, content) = match segment.find('\n') {
            Some(nl) => (segment[..nl].trim(), segment[nl + 1..].trim()),
            None => (segment.trim(), ""),
        };
        // `split` always yields at least one item.
        let name = raw_name.split('|').next().unwrap_or(raw_name);
        Block { name, content }
    })
}

// =============================================================================
// Measurement scanning
// =============================================================================

/// A single `{@A-...}` reading found inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement<'a> {
    /// `'0'` for a pass; any other digit is a failure.
    pub pass_fail: char,
    /// Measured value, trimmed.
    pub value: &'a str,
    /// Sub-test name, trimmed. Present whenever the `|SUBNAME` field exists,
    /// even if it is blank after trimming.
    pub sub_name: Option<&'a str>,
    /// Digit after `{@LIM`, selecting the limit field layout.
    pub limit_type: char,
    /// Raw `|`-separated fields of the limit marker.
    pub limit_fields: Vec<&'a str>,
}

impl Measurement<'_> {
    pub fn passed(&self) -> bool {
        self.pass_fail == constants::PASS_FLAG
    }

    /// Column under which this reading is aggregated.
    pub fn column_name(&self, block: &str) -> String {
        match self.sub_name {
            Some(sub) => format!("{block}_{sub}"),
            None => block.to_string(),
        }
    }

    /// Upper/lower limits decoded according to the limit type.
    pub fn limits(&self) -> Limits {
        let field = |i: usize| self.limit_fields[i].trim();
        match self.limit_type {
            constants::LIMIT_TYPE_UPPER_LOWER if self.limit_fields.len() >= 2 => {
                Limits::new(field(0), field(1))
            }
            constants::LIMIT_TYPE_NOMINAL_LOWER_UPPER if self.limit_fields.len() >= 3 => {
                Limits::new(field(2), field(1))
            }
            _ => Limits::default(),
        }
    }
}

/// Iterate over every non-overlapping measurement in a block's content,
/// left to right.
pub fn measurements(content: &str) -> Measurements<'_> {
    Measurements { content, pos: 0 }
}

/// Iterator returned by [`measurements`].
#[derive(Debug, Clone)]
pub struct Measurements<'a> {
    content: &'a str,
    pos: usize,
}

impl<'a> Iterator for Measurements<'a> {
    type Item = Measurement<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(offset) = self.content[self.pos..].find(constants::MEASUREMENT_MARKER) {
            let start = self.pos + offset;
            if let Some((measurement, end)) = match_measurement(self.content, start) {
                self.pos = end;
                return Some(measurement);
            }
            // No match anchored here; retry from the next marker.
            self.pos = start + 1;
        }
        self.pos = self.content.len();
        None
    }
}

/// Byte cursor over the text being scanned.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn at(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.text[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn digit(&mut self) -> Option<char> {
        let b = self.peek().filter(u8::is_ascii_digit)?;
        self.pos += 1;
        Some(b as char)
    }

    /// Consume the longest run of bytes accepted by `keep` and return it.
    /// Only ASCII bytes are ever rejected, so the run ends on a char boundary.
    fn run(&mut self, keep: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&keep) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }
}

/// Match one measurement anchored at `start` (which points at `{@A-`).
/// Returns the measurement and the offset just past its closing `}`.
///
/// Every variable-length field is bounded by a delimiter that the field itself
/// cannot contain, so each field has exactly one candidate end and the scan
/// never backtracks. The optional sub-name is tried before the plain form.
fn match_measurement(text: &str, start: usize) -> Option<(Measurement<'_>, usize)> {
    let mut cur = Cursor::at(text, start);
    if !cur.eat_str(constants::MEASUREMENT_MARKER) {
        return None;
    }

    let kind = cur.run(|b| b != b'|' && b != b'}');
    if kind.is_empty() || !cur.eat(b'|') {
        return None;
    }

    let pass_fail = cur.digit()?;
    if !cur.eat(b'|') {
        return None;
    }

    let value = cur.run(|b| !matches!(b, b'|' | b'{' | b'}'));
    if value.is_empty() {
        return None;
    }
    let after_value = cur.pos;

    if cur.eat(b'|') {
        let sub_name = cur.run(|b| b != b'{' && b != b'@');
        if !sub_name.is_empty() {
            if let Some((limit_type, limit_fields, end)) = match_limit(text, cur.pos) {
                let measurement = Measurement {
                    pass_fail,
                    value: value.trim(),
                    sub_name: Some(sub_name.trim()),
                    limit_type,
                    limit_fields,
                };
                return Some((measurement, end));
            }
        }
    }

    let (limit_type, limit_fields, end) = match_limit(text, after_value)?;
    let measurement = Measurement {
        pass_fail,
        value: value.trim(),
        sub_name: None,
        limit_type,
        limit_fields,
    };
    Some((measurement, end))
}

/// Match `{@LIMt|fields}}` at `pos`: the limit marker plus the closing brace
/// of the enclosing measurement.
fn match_limit(text: &str, pos: usize) -> Option<(char, Vec<&str>, usize)> {
    let mut cur = Cursor::at(text, pos);
    if !cur.eat_str(constants::LIMIT_MARKER) {
        return None;
    }
    let limit_type = cur.digit()?;
    if !cur.eat(b'|') {
        return None;
    }
    let fields = cur.run(|b| b != b'}');
    if fields.is_empty() || !cur.eat(b'}') || !cur.eat(b'}') {
        return None;
    }
    Some((limit_type, fields.split('|').collect(), cur.pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = "\
{@BATCH|PCB-100|A|1|2|3|4|5|6| ICT-07 |x}
{@BTEST| SN0001 |00|240115093000}
{@BLOCK|R101|00
{@A-RES|0|1.002E+03{@LIM3|1000|900|1100}}
}
{@BLOCK|U5|01
{@A-DCV|0|3.31|VCC{@LIM2|3.6|3.0}}
{@A-DCV|1|0.25|GND{@LIM2|0.1|-0.1}}
}
{@BLOCK|C7
}
";

    fn path() -> PathBuf {
        PathBuf::from("logs/board1.log")
    }

    #[test]
    fn test_extract_sample() {
        let record = extract(SAMPLE, &path());

        assert_eq!(record.tester.as_deref(), Some("ICT-07"));
        assert_eq!(record.serial.as_deref(), Some("SN0001"));

        let names: Vec<_> = record.measurements.keys().cloned().collect();
        assert_eq!(names, vec!["R101", "U5_VCC"]);
        assert_eq!(record.measurements["R101"], "1.002E+03");
        assert_eq!(record.measurements["U5_VCC"], "3.31");

        assert_eq!(record.limits["R101"], Limits::new("1100", "900"));
        assert_eq!(record.limits["U5_VCC"], Limits::new("3.6", "3.0"));
        assert_eq!(record.limits["U5_GND"], Limits::new("0.1", "-0.1"));

        assert_eq!(
            record.failures,
            vec![FailureEntry {
                source_file: path(),
                block: "U5".to_string(),
                test: "U5_GND".to_string(),
                value: "0.25".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_headers_are_unset() {
        let text = "{@BLOCK|R1\n{@A-RES|0|10{@LIM2|11|9}}\n";
        let record = extract(text, &path());
        assert_eq!(record.tester, None);
        assert_eq!(record.serial, None);
        assert_eq!(record.measurements["R1"], "10");
    }

    #[test]
    fn test_short_batch_has_no_tester() {
        assert_eq!(tester_id("{@BATCH|a|b|c|d|e|f|g|h}"), None);
        assert_eq!(
            tester_id("{@BATCH|a|b|c|d|e|f|g|h|T9}").as_deref(),
            Some("T9")
        );
        assert_eq!(tester_id("{@BATCH|a|b|c|d|e|f|g|h|T9"), None);
    }

    #[test]
    fn test_only_first_header_marker_used() {
        let text = "{@BTEST|FIRST}\n{@BTEST|SECOND}\n";
        assert_eq!(serial_id(text).as_deref(), Some("FIRST"));
        assert_eq!(serial_id("{@BTEST|}").as_deref(), Some(""));
    }

    #[test]
    fn test_no_blocks_still_reads_headers() {
        let text = "{@BATCH|0|1|2|3|4|5|6|7|T1}\n{@BTEST|SN}\n{@A-RES|0|1{@LIM2|2|0}}";
        let record = extract(text, &path());
        assert_eq!(record.tester.as_deref(), Some("T1"));
        assert_eq!(record.serial.as_deref(), Some("SN"));
        assert!(record.measurements.is_empty());
        assert!(record.limits.is_empty());
        assert!(record.failures.is_empty());
    }

    #[test]
    fn test_block_name_suffix_and_single_line_block() {
        let found: Vec<_> = blocks("hdr{@BLOCK| Q3|07 \nbody\n{@BLOCK|LAST").collect();
        assert_eq!(
            found,
            vec![
                Block {
                    name: "Q3",
                    content: "body",
                },
                Block {
                    name: "LAST",
                    content: "",
                },
            ]
        );
    }

    #[test]
    fn test_last_write_wins_within_file() {
        let text = "\
{@BLOCK|TEMP|00
{@A-THM|0|20.0{@LIM2|30|10}}
}
{@BLOCK|TEMP|01
{@A-THM|1|55.0{@LIM2|50|10}}
}
{@BLOCK|TEMP|02
{@A-THM|0|21.5{@LIM2|40|5}}
}
";
        let record = extract(text, &path());
        // Latest passing value wins; the failure stays logged.
        assert_eq!(record.measurements["TEMP"], "21.5");
        assert_eq!(record.limits["TEMP"], Limits::new("40", "5"));
        assert_eq!(record.failures.len(), 1);
        assert_eq!(record.failures[0].value, "55.0");
    }

    #[test]
    fn test_failure_keeps_earlier_pass() {
        let text = "{@BLOCK|V1\n{@A-DCV|0|5.0{@LIM2|6|4}}\n{@A-DCV|3|9.9{@LIM2|6|4}}\n";
        let record = extract(text, &path());
        assert_eq!(record.measurements["V1"], "5.0");
        assert_eq!(record.failures.len(), 1);
    }

    #[test]
    fn test_failure_only_column_is_absent() {
        let text = "{@BLOCK|V1\n{@A-DCV|1|9.9{@LIM2|6|4}}\n";
        let record = extract(text, &path());
        assert!(record.measurements.is_empty());
        assert_eq!(record.limits["V1"], Limits::new("6", "4"));
    }

    #[test]
    fn test_limit_layouts() {
        let limits = |text: &str| measurements(text).next().map(|m| m.limits());
        assert_eq!(limits("{@A-X|0|1{@LIM2|5|1}}"), Some(Limits::new("5", "1")));
        assert_eq!(limits("{@A-X|0|1{@LIM2|5}}"), Some(Limits::default()));
        assert_eq!(
            limits("{@A-X|0|1{@LIM3| 3 | 1 | 5 }}"),
            Some(Limits::new("5", "1"))
        );
        assert_eq!(limits("{@A-X|0|1{@LIM3|3|1}}"), Some(Limits::default()));
        assert_eq!(limits("{@A-X|0|1{@LIM7|5|1|2}}"), Some(Limits::default()));
    }

    #[test]
    fn test_value_and_sub_name_trimmed_only_at_ends() {
        let m: Vec<_> = measurements("{@A-X|0|  1.5 mV |  pin 3 {@LIM2|2|1}}").collect();
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].value, "1.5 mV");
        assert_eq!(m[0].sub_name, Some("pin 3"));
        assert_eq!(m[0].column_name("U1"), "U1_pin 3");
    }

    #[test]
    fn test_blank_sub_name_still_suffixes_column() {
        let m: Vec<_> = measurements("{@A-X|0|1|  {@LIM2|2|1}}").collect();
        assert_eq!(m[0].sub_name, Some(""));
        assert_eq!(m[0].column_name("U1"), "U1_");
    }

    #[test]
    fn test_malformed_measurement_skipped() {
        let content = "{@A-BROKEN}{@A-X|x|1{@LIM2|2|1}}{@A-OK|0|7{@LIM2|9|1}}";
        let m: Vec<_> = measurements(content).collect();
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].value, "7");
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(measurements("{@a-X|0|1{@LIM2|2|1}}").count(), 0);
        assert_eq!(measurements("{@A-X|0|1{@lim2|2|1}}").count(), 0);
        assert_eq!(blocks("{@block|R1\n{@A-X|0|1{@LIM2|2|1}}").count(), 0);
    }

    /// The scanner must agree with the backtracking form of the measurement
    /// grammar, including its lazy quantifiers.
    #[test]
    fn test_scanner_agrees_with_reference_pattern() {
        let reference = Regex::new(
            r"\{@A-[^|}]+\|([0-9])\|([^|{}]+?)(?:\|([^{@]+?))?\{@LIM([0-9])\|([^}]+)\}\}",
        )
        .unwrap();

        let inputs = [
            "{@A-X|0|1 2 3|sub name{@LIM2|1|0}}",
            "{@A-BAD}{@A-X|1|5{@LIM9|a}}",
            "{@A-X|0|5|sub@x{@LIM2|1|0}} {@A-Y|0|6{@LIM3|1|2|3}}",
            "{@A-X|a|5{@LIM2|1|0}}",
            "{@A-X|0|5{@LIM2|}}",
            "{@A-X|0|5{@LIM2|1|0}",
            "{@A-X|0|5|s{@A-Y|0|6{@LIM2|1|0}}",
            "{@A-X|0|5|a|b}c{@LIM2|1|0}}",
            "{@A-X|0|multi\nline|sub\nname{@LIM3|0|1|2}}",
            "{@A-X|0| 5 |  sub {@LIM3| 1 | 2 | 3 }}",
            "{@A-X|0|5||{@LIM2|1|0}}",
            "{@A-{X|0|5{@LIM2|1|0}}tail{@A-Z|2|9|q{@LIM2|1|0}}}",
            "{@A-X|0|µ5|Ω{@LIM2|1|0}}{@A-W|0|1{@LIM2|1}}",
            "",
            "no markers here",
        ];

        for input in inputs {
            let expected: Vec<_> = reference
                .captures_iter(input)
                .map(|c| {
                    (
                        c[1].chars().next().unwrap(),
                        c[2].trim().to_string(),
                        c.get(3).map(|s| s.as_str().trim().to_string()),
                        c[4].chars().next().unwrap(),
                        c[5].split('|').map(str::to_string).collect::<Vec<_>>(),
                    )
                })
                .collect();
            let actual: Vec<_> = measurements(input)
                .map(|m| {
                    (
                        m.pass_fail,
                        m.value.to_string(),
                        m.sub_name.map(str::to_string),
                        m.limit_type,
                        m.limit_fields.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                    )
                })
                .collect();
            assert_eq!(actual, expected, "input: {input:?}");
        }
    }
}
