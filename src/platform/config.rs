// ICT Parser - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ICT Parser configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/ictparser/ or %APPDATA%\ICTParser\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Location of `config.toml`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[export]` section.
    pub export: ExportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// File name proposed for the primary export.
    pub default_file_name: Option<String>,
    /// Whether failures are exported alongside the table.
    pub export_failures: Option<bool>,
    /// Suffix added to the primary export's stem to name the failures file.
    pub failures_suffix: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// File name proposed for the primary export.
    pub default_file_name: String,
    /// Export failures next to the table by default.
    pub export_failures: bool,
    /// Suffix for the failures file (`<stem><suffix>.csv`).
    pub failures_suffix: String,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_file_name: constants::DEFAULT_EXPORT_FILE_NAME.to_string(),
            export_failures: true,
            failures_suffix: constants::DEFAULT_FAILURES_SUFFIX.to_string(),
            log_level: None,
            log_file: None,
        }
    }
}

/// Read and deserialise a config file without validating it.
pub fn read_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unreadable or unparseable, returns defaults with a warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let raw = match read_raw_config(config_path) {
        Ok(raw) => raw,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let (config, mut field_warnings) = validate(raw);
    warnings.append(&mut field_warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Validate each field, accumulating every problem rather than stopping at
/// the first.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();
    let mut reject = |field: &str, value: &str, expected: &str| {
        let e = ConfigError::ValueOutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        };
        warnings.push(format!("{e}. Using default."));
    };

    // -- Export: default_file_name --
    if let Some(name) = raw.export.default_file_name {
        if is_plain_file_name(&name) {
            config.default_file_name = name;
        } else {
            reject(
                "export.default_file_name",
                &name,
                "a non-empty file name without path separators",
            );
        }
    }

    // -- Export: export_failures --
    if let Some(flag) = raw.export.export_failures {
        config.export_failures = flag;
    }

    // -- Export: failures_suffix --
    if let Some(suffix) = raw.export.failures_suffix {
        if is_plain_file_name(&suffix) && suffix.len() <= constants::MAX_FAILURES_SUFFIX_LEN {
            config.failures_suffix = suffix;
        } else {
            reject(
                "export.failures_suffix",
                &suffix,
                &format!(
                    "1-{} characters without path separators",
                    constants::MAX_FAILURES_SUFFIX_LEN
                ),
            );
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            reject("logging.level", &level, "error, warn, info, debug, or trace");
        }
    }

    // -- Logging: file --
    if let Some(file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(PathBuf::from(file));
        }
    }

    (config, warnings)
}

fn is_plain_file_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(['/', '\\'])
}
