//! Saving a published document to disk.
//!
//! Writes are atomic: the bytes go to a uniquely named temporary file in the
//! destination directory, which is then renamed over the destination. The
//! temporary file is removed if any step fails.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstage::io::OutputWriter;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example(bytes: Arc<[u8]>) -> pdfstage::Result<()> {
//! let writer = OutputWriter::new();
//! let stats = writer.save(bytes, Path::new("merged.pdf")).await?;
//! println!("wrote {} bytes", stats.file_size);
//! # Ok(())
//! # }
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tokio::task;
use tracing::debug;

use crate::error::{PdfStageError, Result};

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

/// Writes document bytes to disk.
#[derive(Debug, Clone, Default)]
pub struct OutputWriter {
    overwrite: bool,
}

impl OutputWriter {
    /// Writer that refuses to replace existing files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer that replaces existing files.
    pub fn overwriting() -> Self {
        Self { overwrite: true }
    }

    /// Save `bytes` to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStageError::OutputExists`] if the destination exists and
    /// overwriting is off, or [`PdfStageError::FailedToWrite`] if any step of
    /// the write fails.
    pub async fn save(&self, bytes: Arc<[u8]>, path: &Path) -> Result<WriteStatistics> {
        if !self.overwrite && self.exists(path).await {
            return Err(PdfStageError::output_exists(path.to_path_buf()));
        }

        let path_buf = path.to_path_buf();
        let overwrite = self.overwrite;

        let stats = task::spawn_blocking(move || write_blocking(&bytes, path_buf, overwrite))
            .await
            .map_err(|e| PdfStageError::other(format!("Write task failed: {e}")))??;

        debug!(
            path = %stats.output_path.display(),
            size = stats.file_size,
            elapsed_ms = stats.write_time.as_millis(),
            "output written"
        );
        Ok(stats)
    }

    /// Whether something already exists at `path`.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }

    /// Check that `path`'s directory exists and is writable, without writing.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStageError::InvalidConfig`] when the directory is missing
    /// or read-only.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        let metadata = tokio::fs::metadata(parent).await.map_err(|_| {
            PdfStageError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            ))
        })?;

        if metadata.permissions().readonly() {
            return Err(PdfStageError::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }
}

fn write_blocking(bytes: &[u8], path: PathBuf, overwrite: bool) -> Result<WriteStatistics> {
    let start = Instant::now();

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let failed = |source| PdfStageError::FailedToWrite {
        path: path.clone(),
        source,
    };

    // Dropping the temp file on any early return deletes it.
    let mut temp = NamedTempFile::new_in(dir).map_err(failed)?;
    temp.write_all(bytes).map_err(failed)?;
    temp.as_file().sync_all().map_err(failed)?;

    let persisted = if overwrite {
        temp.persist(&path)
    } else {
        temp.persist_noclobber(&path)
    };
    if let Err(err) = persisted {
        return Err(match err.error.kind() {
            io::ErrorKind::AlreadyExists => PdfStageError::output_exists(path.clone()),
            _ => failed(err.error),
        });
    }

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size: bytes.len() as u64,
        output_path: path,
    })
}
