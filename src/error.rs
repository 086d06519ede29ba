//! Error types for pdfstage.
//!
//! Staging-list and geometry operations are total and never produce errors.
//! What remains is resolving inputs, talking to the filesystem, validating
//! configuration and reporting a failed merge. Merge failures are produced
//! by the orchestrator as a [`MergeFailure`](crate::merge::MergeFailure) and
//! only become a [`PdfStageError`] at the application boundary.

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfstage operations.
pub type Result<T> = std::result::Result<T, PdfStageError>;

/// Main error type for pdfstage operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfStageError {
    /// Input path was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Input path exists but is neither a file nor a directory we can walk.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// Input file cannot be accessed (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {source}", .path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A glob pattern could not be parsed or walked.
    #[error("Invalid input pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Fewer files than a merge needs ended up staged.
    #[error("At least {required} PDF files are required to merge, {staged} staged")]
    NotEnoughFiles {
        /// Minimum number of files.
        required: usize,
        /// Number actually staged.
        staged: usize,
    },

    /// The merge itself failed; the message is user-facing.
    #[error("{message}")]
    MergeFailed {
        /// Human-readable reason, naming the offending file when known.
        message: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to write the merged document.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The user declined to overwrite the output file.
    #[error("Operation cancelled")]
    Cancelled,

    /// There is no live output resource to save.
    #[error("No merged document is available")]
    NoOutput,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<serde_json::Error> for PdfStageError {
    fn from(err: serde_json::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PdfStageError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(message: impl Into<String>) -> Self {
        Self::MergeFailed {
            message: message.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::InvalidPattern { .. } => 1,
            Self::NotEnoughFiles { .. } => 1,
            Self::MergeFailed { .. } => 3,
            Self::OutputExists { .. } => 4,
            Self::FailedToWrite { .. } => 5,
            Self::Cancelled => 130,
            Self::NoOutput => 6,
            Self::InvalidConfig { .. } => 1,
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_file_not_found_display() {
        let err = PdfStageError::file_not_found(PathBuf::from("/tmp/missing.pdf"));
        let msg = err.to_string();
        assert!(msg.contains("File not found"));
        assert!(msg.contains("missing.pdf"));
    }

    #[test]
    fn test_output_exists_display() {
        let err = PdfStageError::output_exists(PathBuf::from("existing.pdf"));
        let msg = err.to_string();
        assert!(msg.contains("already exists"));
        assert!(msg.contains("--force"));
    }

    #[test]
    fn test_merge_failed_is_passed_through() {
        let err = PdfStageError::merge_failed("Cannot open “a.pdf”.");
        assert_eq!(err.to_string(), "Cannot open “a.pdf”.");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            PdfStageError::file_not_found(PathBuf::from("x")).exit_code(),
            2
        );
        assert_eq!(PdfStageError::merge_failed("x").exit_code(), 3);
        assert_eq!(
            PdfStageError::output_exists(PathBuf::from("x")).exit_code(),
            4
        );
        assert_eq!(PdfStageError::invalid_config("x").exit_code(), 1);
    }

    #[test]
    fn test_from_io_error_keeps_source() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: PdfStageError = io_err.into();
        assert!(matches!(err, PdfStageError::Io { .. }));
        assert!(err.source().is_some());
    }
}
