// ICT Parser - platform/fs.rs
//
// Filesystem access: listing the chosen log folder and reading whole files.

use crate::util::constants;
use crate::util::error::DiscoveryError;
use std::io;
use std::path::{Path, PathBuf};

/// List the log files directly inside `dir`.
///
/// Non-recursive. Hidden entries (names starting with `.`) and directories
/// are skipped. The result is sorted by file name so that rows and failures
/// come out in the same order on every platform.
pub fn list_log_files(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !dir.exists() {
        return Err(DiscoveryError::RootNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let walker = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| DiscoveryError::Traversal {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if hidden || !entry.file_type().is_file() {
            tracing::trace!(path = %entry.path().display(), hidden, "Skipping entry");
            continue;
        }
        files.push(entry.into_path());
    }

    if files.is_empty() {
        return Err(DiscoveryError::EmptyFolder {
            path: dir.to_path_buf(),
        });
    }

    tracing::info!(
        dir = %dir.display(),
        files = files.len(),
        "Log folder listed"
    );
    Ok(files)
}

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8, uses lossy conversion. Unusually large files
/// are still read whole; a warning is logged.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    if bytes.len() as u64 > constants::LARGE_LOG_FILE_THRESHOLD {
        tracing::warn!(
            path = %path.display(),
            size = bytes.len(),
            "Log file is unusually large"
        );
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
