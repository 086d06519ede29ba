//! Input acquisition: handles to file bytes that are read lazily.
//!
//! A [`FileSource`] carries the display metadata captured when it was picked
//! and only touches the underlying bytes when the merge asks for them.

use futures::future::{self, FutureExt, LocalBoxFuture};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Result;
use crate::error::PdfStageError;
use crate::utils::check_path_is_file;

/// Media type of PDF documents.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A user-picked file whose bytes are pulled on demand.
pub trait FileSource: fmt::Debug {
    /// Display name, usually the file name without directories.
    fn name(&self) -> &str;

    /// Size in bytes as reported when the file was picked.
    fn size_bytes(&self) -> u64;

    /// Declared media type, e.g. `application/pdf`.
    fn media_type(&self) -> &str;

    /// Read the complete contents.
    fn read_all(&self) -> LocalBoxFuture<'_, io::Result<Vec<u8>>>;
}

/// A file on local disk.
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
    size_bytes: u64,
    media_type: &'static str,
}

impl DiskFile {
    /// Capture metadata for `path` without reading its contents.
    ///
    /// # Errors
    ///
    /// Fails if the path does not exist, is not a regular file, or its
    /// metadata cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        check_path_is_file(path)?;

        let metadata = std::fs::metadata(path).map_err(|source| {
            PdfStageError::FileNotAccessible {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            name,
            size_bytes: metadata.len(),
            media_type: media_type_for_path(path),
        })
    }

    /// Location on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    fn media_type(&self) -> &str {
        self.media_type
    }

    fn read_all(&self) -> LocalBoxFuture<'_, io::Result<Vec<u8>>> {
        tokio::fs::read(&self.path).boxed_local()
    }
}

/// A file whose bytes are already in memory (drops, pastes, tests).
#[derive(Clone)]
pub struct MemoryFile {
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
}

impl MemoryFile {
    /// Wrap `bytes` under `name` with the given media type.
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Shorthand for a PDF-typed in-memory file.
    pub fn pdf(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(name, PDF_MEDIA_TYPE, bytes)
    }
}

impl fmt::Debug for MemoryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn read_all(&self) -> LocalBoxFuture<'_, io::Result<Vec<u8>>> {
        future::ready(Ok(self.bytes.to_vec())).boxed_local()
    }
}

/// Infer a declared media type from the file extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => PDF_MEDIA_TYPE,
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Open every path as a [`DiskFile`], keeping the given order.
pub fn open_disk_files(paths: &[PathBuf]) -> Result<Vec<Arc<dyn FileSource>>> {
    paths
        .iter()
        .map(|path| DiskFile::open(path).map(|f| Arc::new(f) as Arc<dyn FileSource>))
        .collect()
}
