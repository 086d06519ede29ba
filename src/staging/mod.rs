//! The ordered staging list.
//!
//! List order is merge order. Every entry gets an identity when it is staged
//! and keeps it through reorders; entries are never edited in place. All
//! operations are total: bad indices are no-ops, overshooting move targets
//! pin to the end.

pub mod source;

pub use source::{DiskFile, FileSource, MemoryFile, PDF_MEDIA_TYPE};

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::utils::format_bytes;

/// Minimum number of staged files for a merge to be offered.
pub const MIN_MERGE_FILES: usize = 2;

/// Stable identity of a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FileId(u64);

impl FileId {
    /// Raw value, unique within the list that issued it.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file-{}", self.0)
    }
}

/// One file awaiting assembly.
#[derive(Debug, Clone)]
pub struct StagedFile {
    id: FileId,
    handle: Arc<dyn FileSource>,
    name: String,
    size_bytes: u64,
}

impl StagedFile {
    /// Identity assigned at staging time.
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Handle to the underlying bytes.
    pub fn handle(&self) -> &Arc<dyn FileSource> {
        &self.handle
    }

    /// Display name captured at staging time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size captured at staging time.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

/// Files in merge order.
#[derive(Debug, Clone)]
pub struct StagingList {
    files: Vec<StagedFile>,
    next_id: u64,
    accepted_media_type: String,
}

impl Default for StagingList {
    fn default() -> Self {
        Self::new(PDF_MEDIA_TYPE)
    }
}

impl StagingList {
    /// Create an empty list admitting only `accepted_media_type`.
    pub fn new(accepted_media_type: impl Into<String>) -> Self {
        Self {
            files: Vec::new(),
            next_id: 0,
            accepted_media_type: accepted_media_type.into(),
        }
    }

    /// Media type candidates must declare to be admitted.
    pub fn accepted_media_type(&self) -> &str {
        &self.accepted_media_type
    }

    /// Stage candidates after the existing entries, in the order given.
    ///
    /// Candidates of any other media type are skipped silently. Returns the
    /// identities of the admitted entries.
    pub fn append<I>(&mut self, candidates: I) -> Vec<FileId>
    where
        I: IntoIterator<Item = Arc<dyn FileSource>>,
    {
        let mut admitted = Vec::new();

        for handle in candidates {
            if !handle
                .media_type()
                .eq_ignore_ascii_case(&self.accepted_media_type)
            {
                debug!(
                    name = handle.name(),
                    media_type = handle.media_type(),
                    "skipping file of unaccepted type"
                );
                continue;
            }

            let id = FileId(self.next_id);
            self.next_id += 1;

            debug!(%id, name = handle.name(), "staged file");
            self.files.push(StagedFile {
                id,
                name: handle.name().to_owned(),
                size_bytes: handle.size_bytes(),
                handle,
            });
            admitted.push(id);
        }

        admitted
    }

    /// Remove the entry at `index`; out-of-range indices are ignored.
    pub fn remove_at(&mut self, index: usize) -> Option<StagedFile> {
        if index >= self.files.len() {
            return None;
        }
        let removed = self.files.remove(index);
        debug!(id = %removed.id, index, "removed staged file");
        Some(removed)
    }

    /// Move the entry at `from` to `to`.
    ///
    /// `to` is interpreted against the list with the entry already taken out
    /// and is pinned to its last position. Returns where the entry ended up,
    /// or `None` when `from` is out of range.
    pub fn move_item(&mut self, from: usize, to: usize) -> Option<usize> {
        if from >= self.files.len() {
            return None;
        }
        let item = self.files.remove(from);
        let target = to.min(self.files.len());
        self.files.insert(target, item);
        Some(target)
    }

    /// Swap the entry at `index` with its predecessor; inert at the top.
    pub fn move_up(&mut self, index: usize) -> Option<usize> {
        let to = index.checked_sub(1)?;
        self.move_item(index, to)
    }

    /// Swap the entry at `index` with its successor; inert at the bottom.
    pub fn move_down(&mut self, index: usize) -> Option<usize> {
        if index + 1 >= self.files.len() {
            return None;
        }
        self.move_item(index, index + 1)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Number of staged entries.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Entries in merge order.
    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&StagedFile> {
        self.files.get(index)
    }

    /// Current position of the entry with identity `id`.
    pub fn position(&self, id: FileId) -> Option<usize> {
        self.files.iter().position(|f| f.id == id)
    }

    /// Sum of the staged sizes.
    pub fn total_size_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }

    /// Whether enough files are staged to merge.
    pub fn has_enough_to_merge(&self) -> bool {
        self.files.len() >= MIN_MERGE_FILES
    }

    /// One-line summary such as `3 file(s) • 1.20 MB`.
    pub fn summary(&self) -> String {
        format!(
            "{} file(s) • {}",
            self.files.len(),
            format_bytes(self.total_size_bytes())
        )
    }
}
