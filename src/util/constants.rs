// ICT Parser - util/constants.rs
//
// Single source of truth for named constants, grammar markers, export labels,
// and configuration defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ICT Parser";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ICTParser";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Log grammar markers
// =============================================================================

/// Header marker carrying the tester id in field 8.
pub const BATCH_MARKER: &str = "{@BATCH|";

/// Header marker carrying the board serial in field 0.
pub const BTEST_MARKER: &str = "{@BTEST|";

/// Marker that opens every block section.
pub const BLOCK_MARKER: &str = "{@BLOCK|";

/// Marker that opens a single analog measurement.
pub const MEASUREMENT_MARKER: &str = "{@A-";

/// Marker that opens the limit spec nested in a measurement.
pub const LIMIT_MARKER: &str = "{@LIM";

/// Field index of the tester id inside the `{@BATCH|...}` marker.
pub const BATCH_TESTER_FIELD: usize = 8;

/// Pass/fail flag value that means "passed".
pub const PASS_FLAG: char = '0';

/// Limit layout `UL|LL`.
pub const LIMIT_TYPE_UPPER_LOWER: char = '2';

/// Limit layout `nominal|LL|UL`.
pub const LIMIT_TYPE_NOMINAL_LOWER_UPPER: char = '3';

// =============================================================================
// Tabular output
// =============================================================================

/// Reserved identity column holding the tester id.
pub const TESTER_COLUMN: &str = "Tester";

/// Reserved identity column holding the board serial.
pub const SERIAL_COLUMN: &str = "Serial";

/// Identity columns, always first in every export.
pub const IDENTITY_COLUMNS: [&str; 2] = [TESTER_COLUMN, SERIAL_COLUMN];

/// Trailer row labels appended after the data rows.
pub const UPPER_LIMIT_LABEL: &str = "UL";
pub const LOWER_LIMIT_LABEL: &str = "LL";
pub const TOLERANCE_LABEL: &str = "TOL";

/// Fixed header of the failures export.
pub const FAILURES_HEADER: [&str; 4] = ["File", "Block", "Test", "Value"];

// =============================================================================
// Export defaults
// =============================================================================

/// Default file name offered by the save dialog and used by the CLI.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "ICT_Parser_Result.csv";

/// Suffix appended to the primary export's stem for the failures file.
pub const DEFAULT_FAILURES_SUFFIX: &str = "_failures";

/// Extension of both exports.
pub const EXPORT_EXTENSION: &str = "csv";

/// Maximum length of a configured failures suffix.
pub const MAX_FAILURES_SUFFIX_LEN: usize = 64;

// =============================================================================
// Input limits
// =============================================================================

/// Log files above this size are still read whole, but a warning is logged.
pub const LARGE_LOG_FILE_THRESHOLD: u64 = 64 * 1024 * 1024; // 64 MB

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG nor --debug is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Prefix of the optional debug log file written next to the working directory.
pub const DEBUG_LOG_FILE_PREFIX: &str = "ICTParser_debug";

/// chrono format used to stamp debug log file names.
pub const DEBUG_LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

// =============================================================================
// File names
// =============================================================================

/// Configuration file name within the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
