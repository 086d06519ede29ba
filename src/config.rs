//! Configuration for a pdfstage run.
//!
//! The CLI is translated into a [`Config`] that has been validated and carries
//! parsed values only: staging edits, viewport and window settings, output
//! location and overwrite policy.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::PdfStageError;
use crate::geometry::{Viewport, WindowConstraints};
use crate::staging::PDF_MEDIA_TYPE;
use crate::window::WindowDefaults;

/// What to do when the output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Ask before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite.
    Force,
    /// Never overwrite; fail if the file exists.
    NoClobber,
}

/// Format of the final report on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON document.
    Json,
}

/// A change to the staging list, applied before merging.
///
/// Positions are 1-based on the command line and 0-based here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StagingEdit {
    /// Move the entry at `from` to `to`.
    Move {
        /// Current position.
        from: usize,
        /// Target position; pinned to the end when past it.
        to: usize,
    },
    /// Remove the entry at `index`.
    Remove {
        /// Position to remove.
        index: usize,
    },
}

fn parse_position(s: &str) -> crate::Result<usize> {
    let value: usize = s.trim().parse().map_err(|_| {
        PdfStageError::invalid_config(format!("Invalid position: '{s}'. Expected a number"))
    })?;
    value
        .checked_sub(1)
        .ok_or_else(|| PdfStageError::invalid_config("Positions start at 1"))
}

impl StagingEdit {
    /// Parse a `FROM:TO` move.
    ///
    /// # Errors
    ///
    /// Fails when either side is not a positive integer.
    pub fn parse_move(s: &str) -> crate::Result<Self> {
        let (from, to) = s.split_once(':').ok_or_else(|| {
            PdfStageError::invalid_config(format!("Invalid move: '{s}'. Expected FROM:TO"))
        })?;
        Ok(Self::Move {
            from: parse_position(from)?,
            to: parse_position(to)?,
        })
    }

    /// Parse a single position to remove.
    ///
    /// # Errors
    ///
    /// Fails when the value is not a positive integer.
    pub fn parse_remove(s: &str) -> crate::Result<Self> {
        Ok(Self::Remove {
            index: parse_position(s)?,
        })
    }
}

impl FromStr for Viewport {
    type Err = PdfStageError;

    /// Parse `WIDTHxHEIGHT`, e.g. `1280x800`.
    fn from_str(s: &str) -> crate::Result<Self> {
        let invalid = || {
            PdfStageError::invalid_config(format!(
                "Invalid viewport: '{s}'. Expected WIDTHxHEIGHT, e.g. 1280x800"
            ))
        };

        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: f64 = w.trim().parse().map_err(|_| invalid())?;
        let height: f64 = h.trim().parse().map_err(|_| invalid())?;

        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(invalid());
        }
        Ok(Viewport::new(width, height))
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Where the merged document goes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputTarget {
    /// Keep the document in memory only.
    #[default]
    None,
    /// Write to this exact path.
    File(PathBuf),
    /// Write into this directory under the suggested filename.
    Directory(PathBuf),
}

/// Complete configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input files, directories or glob patterns, in order.
    pub inputs: Vec<String>,

    /// Where to write the merged document.
    pub output: OutputTarget,

    /// Overwrite policy for the output file.
    pub overwrite_mode: OverwriteMode,

    /// Staging edits; moves are applied in order, then removals in order.
    pub edits: Vec<StagingEdit>,

    /// Only show the staging list.
    pub dry_run: bool,

    /// Media type admitted to the staging list.
    pub accept: String,

    /// Viewport the preview window is laid out in.
    pub viewport: Viewport,

    /// Initial window placement.
    pub window: WindowDefaults,

    /// Window limits.
    pub constraints: WindowConstraints,

    /// Report format.
    pub report: ReportFormat,

    /// Verbosity count (`-v`, `-vv`, ...).
    pub verbosity: u8,

    /// Show detailed output.
    pub verbose: bool,

    /// Suppress non-error output.
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: OutputTarget::None,
            overwrite_mode: OverwriteMode::default(),
            edits: Vec::new(),
            dry_run: false,
            accept: PDF_MEDIA_TYPE.to_owned(),
            viewport: Viewport::default(),
            window: WindowDefaults::default(),
            constraints: WindowConstraints::default(),
            report: ReportFormat::default(),
            verbosity: 0,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if self.accept.trim().is_empty() || !self.accept.contains('/') {
            bail!("Invalid media type: '{}'", self.accept);
        }

        let c = &self.constraints;
        if c.min_width <= 0.0 || c.min_height <= 0.0 || c.edge_padding < 0.0 {
            bail!("Window limits must be positive");
        }

        if let OutputTarget::File(output) = &self.output {
            let output_str = output.to_string_lossy();
            if self.inputs.iter().any(|input| *input == output_str) {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    output.display()
                );
            }
        }

        Ok(())
    }

    /// Destination for a document whose suggested name is `suggested`.
    pub fn output_path(&self, suggested: &str) -> Option<PathBuf> {
        match &self.output {
            OutputTarget::None => None,
            OutputTarget::File(path) => Some(path.clone()),
            OutputTarget::Directory(dir) => Some(dir.join(suggested)),
        }
    }
}
