//! Utilities for input path collection and display formatting.

use crate::{Result, error::PdfStageError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand command-line inputs into concrete file paths, preserving order.
///
/// Each input is handled on its own:
/// - glob patterns (`*`, `?`, `[`) are expanded in the order `glob` yields,
/// - directories are walked recursively, files sorted by name,
/// - anything else must be an existing regular file.
///
/// Media-type filtering does not happen here; it is the staging list's job.
pub fn collect_input_paths<T>(inputs: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for input in inputs.into_iter() {
        let input = input.as_ref();
        let path = Path::new(input);

        if is_glob_pattern(input) {
            resolved_paths.extend(collect_paths_for_pattern(input)?);
        } else if path.is_dir() {
            resolved_paths.extend(collect_paths_in_dir(path)?);
        } else {
            check_path_is_file(path)?;
            resolved_paths.push(path.to_path_buf());
        }
    }

    Ok(resolved_paths)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./docs/*.pdf"`
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern).map_err(|err| PdfStageError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason: err.to_string(),
    })?;

    for entry in paths {
        let path = entry.map_err(|err| PdfStageError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: err.to_string(),
        })?;
        if path.is_file() {
            resolved_paths.push(path);
        }
    }

    Ok(resolved_paths)
}

fn collect_paths_in_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|err| PdfStageError::FileNotAccessible {
            path: err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| dir.to_path_buf()),
            source: err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected")),
        })?;
        if entry.file_type().is_file() {
            resolved_paths.push(entry.into_path());
        }
    }

    Ok(resolved_paths)
}

/// Ensure `path` exists and is a regular file.
pub fn check_path_is_file(path: &Path) -> Result<()> {
    let exists = path
        .try_exists()
        .map_err(|source| PdfStageError::FileNotAccessible {
            path: path.to_path_buf(),
            source,
        })?;
    if !exists {
        return Err(PdfStageError::file_not_found(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(PdfStageError::not_a_file(path.to_path_buf()));
    }
    Ok(())
}

/// Format a byte count with binary units (`0 B`, `512 B`, `1.50 KB`, ...).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    const K: f64 = 1024.0;

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= K && unit < UNITS.len() - 1 {
        value /= K;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}
