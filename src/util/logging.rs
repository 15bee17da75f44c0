// ICT Parser - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug (sets level to debug)
//   - Config file: [logging] level = "debug"
//
// Output: stderr always. Optionally also to a plain-text log file, either the
// configured `[logging] file` or a timestamped `ICTParser_debug <stamp>.txt`
// when --debug-log is passed. Without an installed subscriber every tracing
// call in the library is a no-op.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the level from config.toml (if present).
/// `log_file` is an additional file that receives a copy of every event.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
pub fn init(debug_flag: bool, config_level: Option<&str>, log_file: Option<&Path>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .compact();

    // A log file that cannot be created is reported on stderr once the
    // subscriber is up; it never prevents startup.
    let mut file_error = None;
    let file_layer = log_file.and_then(|path| match std::fs::File::create(path) {
        Ok(file) => Some(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        ),
        Err(e) => {
            file_error = Some((path.to_path_buf(), e));
            None
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some((path, e)) = file_error {
        tracing::warn!(path = %path.display(), error = %e, "Could not create log file");
    }

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        log_file = ?log_file.map(Path::display).map(|d| d.to_string()),
        "Logging initialised"
    );
}

/// Name of the timestamped debug log written by `--debug-log`.
pub fn debug_log_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    let stamp = now.format(super::constants::DEBUG_LOG_TIMESTAMP_FORMAT);
    dir.join(format!("{} {stamp}.txt", super::constants::DEBUG_LOG_FILE_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn debug_log_path_is_stamped() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let path = debug_log_path(Path::new("out"), now);
        assert_eq!(
            path,
            Path::new("out").join("ICTParser_debug 2024-03-09_07-05-01.txt")
        );
    }
}
