//! # pdfstage
//!
//! Stage PDF files in an ordered list, merge them into one document, and
//! keep the result behind a single live resource shown in a floating
//! preview window.
//!
//! The pieces are usable on their own:
//!
//! - [`staging`]: the ordered, editable list of picked files
//! - [`merge`]: the fail-fast merge orchestrator
//! - [`output`]: the live output resource and its revocation
//! - [`window`] and [`geometry`]: the drag/resize preview window
//! - [`session`]: all of the above behind one state container
//!
//! The binary drives one [`session::Session`] per run through [`ops::execute`].

pub mod assembly;
pub mod cli;
pub mod config;
mod error;
pub use error::*;
pub mod geometry;
pub mod io;
pub mod logging;
pub mod merge;
pub mod ops;
pub mod output;
pub mod session;
pub mod staging;
pub(crate) mod utils;
pub mod window;

#[cfg(test)]
mod test_support;

use std::io::Write;
use std::path::Path;

use crate::config::{Config, ReportFormat};
use crate::ops::RunReport;
use crate::output::OutputFormatter;
use crate::utils::format_bytes;

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Execute a validated configuration and print the report.
///
/// # Errors
///
/// Returns the first error from staging, merging or saving.
pub async fn run(config: Config) -> Result<()> {
    let formatter = OutputFormatter::from_config(&config);

    if config.report == ReportFormat::Text && formatter.is_verbose() {
        formatter.section(&format!("{NAME} v{VERSION}"));
    }

    let report = ops::execute(&config, |path| prompt_overwrite(&formatter, path)).await?;

    match config.report {
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ReportFormat::Text => print_report(&formatter, &config, &report),
    }

    Ok(())
}

fn prompt_overwrite(formatter: &OutputFormatter, path: &Path) -> Result<bool> {
    formatter.warning(&format!("Output file already exists: {}", path.display()));

    print!("Overwrite? [y/N]: ");
    std::io::stdout().flush().ok();

    let mut response = String::new();
    std::io::stdin()
        .read_line(&mut response)
        .map_err(|err| PdfStageError::other(format!("Failed to read input: {err}")))?;

    let response = response.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

fn print_report(formatter: &OutputFormatter, config: &Config, report: &RunReport) {
    formatter.section("Staged files");
    for entry in &report.staged {
        formatter.staged_file(entry);
    }
    formatter.detail("Total", &format_bytes(report.staged_size_bytes()));

    if report.skipped > 0 {
        formatter.warning(&format!(
            "Skipped {} input(s) that are not {}",
            report.skipped, config.accept
        ));
    }
    if report.ignored_edits > 0 {
        formatter.warning(&format!(
            "Ignored {} edit(s) outside the staging list",
            report.ignored_edits
        ));
    }

    if report.dry_run {
        formatter.success("Dry run completed; nothing was merged");
        if let Some(path) = config.output_path("merged-<timestamp>.pdf") {
            formatter.info(&format!("  Output would be: {}", path.display()));
        }
        return;
    }

    let Some(receipt) = &report.merge else {
        return;
    };

    formatter.success(&format!(
        "Merged {} files ({} pages)",
        receipt.inputs.len(),
        receipt.total_pages
    ));
    if formatter.is_verbose() {
        for input in &receipt.inputs {
            formatter.debug(&format!("{}: {} page(s)", input.name, input.pages));
        }
    }

    match &report.saved {
        Some(saved) => formatter.success(&format!(
            "Saved {} ({})",
            saved.path.display(),
            format_bytes(saved.file_size)
        )),
        None => formatter.info(&format!(
            "Output {} kept in memory; use --output or --output-dir to save it",
            receipt.resource.filename
        )),
    }

    if let Some(geometry) = report.preview {
        formatter.info(&format!(
            "  Preview window: {}x{} at ({}, {}) in {}",
            geometry.size.width,
            geometry.size.height,
            geometry.position.x,
            geometry.position.y,
            report.viewport
        ));
    }
}
