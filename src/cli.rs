//! CLI argument parsing for pdfstage.
//!
//! This module defines the command-line interface structure using `clap`
//! and its translation into a validated [`Config`].
//!
//! # Examples
//!
//! ```no_run
//! use pdfstage::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Staging {} inputs", cli.inputs.len());
//! ```

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::{Config, OutputTarget, OverwriteMode, ReportFormat, StagingEdit};
use crate::error::{PdfStageError, Result};
use crate::geometry::Viewport;
use crate::staging::PDF_MEDIA_TYPE;

/// Stage, reorder and merge PDF files.
///
/// Inputs are staged in the order given; directories contribute their files
/// sorted by name and glob patterns are expanded. The staging list can be
/// edited with --move and --remove before the merge.
#[derive(Parser, Debug)]
#[command(name = "pdfstage")]
#[command(version)]
#[command(about = "Stage, reorder and merge PDF files", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input files, directories or glob patterns (in order)
    ///
    /// Examples:
    ///   pdfstage a.pdf b.pdf -o out.pdf
    ///   pdfstage 'chapters/*.pdf' -d exports/
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<String>,

    /// Write the merged PDF to this file
    #[arg(short, long, value_name = "FILE", conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Write the merged PDF into this directory as merged-<timestamp>.pdf
    #[arg(short = 'd', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Show the staging list after edits without merging
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Move the entry at position FROM to position TO (1-based, repeatable)
    ///
    /// Targets past the end pin to the last position.
    #[arg(long = "move", value_name = "FROM:TO", action = ArgAction::Append)]
    pub moves: Vec<String>,

    /// Remove the entry at INDEX (1-based, repeatable, applied after moves)
    #[arg(long = "remove", value_name = "INDEX", action = ArgAction::Append)]
    pub removals: Vec<String>,

    /// Media type admitted to the staging list
    #[arg(long, value_name = "TYPE", default_value = PDF_MEDIA_TYPE)]
    pub accept: String,

    /// Viewport the preview window is laid out in
    #[arg(long, value_name = "WxH", default_value = "1280x800", env = "PDFSTAGE_VIEWPORT")]
    pub viewport: String,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// More output; repeat for more diagnostics (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if a staging edit or the viewport cannot be parsed,
    /// or if the resulting configuration fails validation.
    pub fn to_config(&self) -> Result<Config> {
        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let output = match (&self.output, &self.output_dir) {
            (Some(file), _) => OutputTarget::File(file.clone()),
            (None, Some(dir)) => OutputTarget::Directory(dir.clone()),
            (None, None) => OutputTarget::None,
        };

        let mut edits = self
            .moves
            .iter()
            .map(|m| StagingEdit::parse_move(m))
            .collect::<Result<Vec<_>>>()?;
        for removal in &self.removals {
            edits.push(StagingEdit::parse_remove(removal)?);
        }

        let viewport: Viewport = self.viewport.parse()?;

        let config = Config {
            inputs: self.inputs.clone(),
            output,
            overwrite_mode,
            edits,
            dry_run: self.dry_run,
            accept: self.accept.clone(),
            viewport,
            report: if self.json {
                ReportFormat::Json
            } else {
                ReportFormat::Text
            },
            verbosity: self.verbose,
            verbose: self.verbose > 0,
            quiet: self.quiet,
            ..Default::default()
        };

        config.validate().map_err(|e| {
            PdfStageError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }
}
