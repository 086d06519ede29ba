//! Merge orchestration.
//!
//! The orchestrator walks the staging list in order, pulls each file's
//! bytes, opens it through the [`DocumentAssembler`](crate::assembly::DocumentAssembler)
//! and appends its pages to one output document. It fails fast: the first
//! input that cannot be read or opened aborts the whole merge and nothing
//! partial is ever returned.

mod orchestrator;

pub use orchestrator::{MergeOrchestrator, MergePhase};

use serde::Serialize;

use crate::staging::FileId;

/// Per-input accounting for a successful merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedInput {
    /// Identity of the staged entry.
    pub id: FileId,
    /// Display name of the staged entry.
    pub name: String,
    /// Number of pages it contributed.
    pub pages: usize,
}

/// The assembled document and what went into it.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// Serialized output document.
    pub bytes: Vec<u8>,
    /// Inputs in merge order.
    pub inputs: Vec<MergedInput>,
}

impl MergeOutput {
    /// Page count of the output document.
    pub fn total_pages(&self) -> usize {
        self.inputs.iter().map(|i| i.pages).sum()
    }
}

/// Why a merge did not produce output.
///
/// The `Display` text is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeFailure {
    /// Nothing was staged.
    #[error("Add at least one PDF to merge.")]
    Empty,

    /// Another merge is still running; the request was dropped.
    #[error("A merge is already in progress.")]
    AlreadyMerging,

    /// The input declares encryption.
    #[error("Cannot open “{name}”. Encrypted PDFs are not supported.")]
    EncryptedInput {
        /// Offending file.
        name: String,
    },

    /// The input could not be parsed.
    #[error("Cannot open “{name}”. It may be encrypted or corrupted.")]
    UnsupportedInput {
        /// Offending file.
        name: String,
        /// Backend detail, for logs.
        reason: String,
    },

    /// The input's bytes could not be read.
    #[error("Cannot read “{name}”: {reason}")]
    UnreadableInput {
        /// Offending file.
        name: String,
        /// I/O detail.
        reason: String,
    },

    /// Anything else the backend reported.
    #[error("Failed to merge. Please try different files.")]
    Assembly {
        /// Backend detail, for logs.
        reason: String,
    },
}

impl MergeFailure {
    /// Name of the input that caused the failure, when one did.
    pub fn offending_file(&self) -> Option<&str> {
        match self {
            Self::EncryptedInput { name }
            | Self::UnsupportedInput { name, .. }
            | Self::UnreadableInput { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether the request was refused before any work started.
    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::Empty | Self::AlreadyMerging)
    }
}

impl From<MergeFailure> for crate::PdfStageError {
    fn from(failure: MergeFailure) -> Self {
        crate::PdfStageError::merge_failed(failure.to_string())
    }
}
