// ICT Parser - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Only I/O-class failures are errors: malformed log text is never an error,
// it degrades to absent values inside the extractor.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all ICT Parser operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum IctError {
    /// Listing the input folder failed.
    Discovery(DiscoveryError),

    /// Writing an export failed.
    Export(ExportError),

    /// Configuration loading failed.
    Config(ConfigError),

    /// I/O error with path context (e.g. an unreadable log file).
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for IctError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for IctError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl IctError {
    /// True for errors caused by what the user picked (empty folder, no
    /// columns) rather than by the filesystem.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Self::Discovery(DiscoveryError::EmptyFolder { .. })
                | Self::Export(ExportError::EmptySelection)
        )
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to listing the log folder.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The folder does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The path is not a directory.
    NotADirectory { path: PathBuf },

    /// The folder holds no (non-hidden) files.
    EmptyFolder { path: PathBuf },

    /// Walkdir traversal error.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Folder '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "'{}' is not a folder", path.display())
            }
            Self::EmptyFolder { path } => write!(
                f,
                "Folder '{}' cannot be empty. Please select another.",
                path.display()
            ),
            Self::Traversal { path, source } => {
                write!(f, "Error listing '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Traversal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for IctError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error creating or writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// No measurement columns were chosen for the export.
    EmptySelection,
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::EmptySelection => f.write_str("Please select at least one test."),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::EmptySelection => None,
        }
    }
}

impl From<ExportError> for IctError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for IctError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for ICT Parser results.
pub type Result<T> = std::result::Result<T, IctError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display_names_path_and_operation() {
        let err = IctError::Io {
            path: PathBuf::from("logs/board1.txt"),
            operation: "read",
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        let text = err.to_string();
        assert!(text.contains("read"), "{text}");
        assert!(text.contains("board1.txt"), "{text}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn user_input_errors_are_classified() {
        let empty: IctError = DiscoveryError::EmptyFolder {
            path: PathBuf::from("x"),
        }
        .into();
        assert!(empty.is_user_input());
        let none_selected: IctError = ExportError::EmptySelection.into();
        assert!(none_selected.is_user_input());
        let missing: IctError = DiscoveryError::RootNotFound {
            path: PathBuf::from("x"),
        }
        .into();
        assert!(!missing.is_user_input());
    }
}
