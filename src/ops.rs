//! One end-to-end run: resolve inputs, stage, edit, merge, save.
//!
//! [`execute`] does the work and returns a [`RunReport`]; it prints nothing.
//! Rendering the report is left to the caller.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::assembly::{DocumentAssembler, LopdfAssembler};
use crate::config::{Config, OverwriteMode, StagingEdit};
use crate::error::{PdfStageError, Result};
use crate::geometry::{Viewport, WindowGeometry};
use crate::io::OutputWriter;
use crate::output::{MemoryResourceStore, ResourceStore};
use crate::session::{MergeReceipt, PreviewSettings, Session};
use crate::staging::source::open_disk_files;
use crate::staging::{MIN_MERGE_FILES, StagedFile};
use crate::utils::collect_input_paths;

/// A staged entry as it stood when the merge started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedEntry {
    /// 1-based position in the staging list.
    pub position: usize,
    /// Display name.
    pub name: String,
    /// Size when staged.
    pub size_bytes: u64,
}

impl StagedEntry {
    fn from_staged(index: usize, file: &StagedFile) -> Self {
        Self {
            position: index + 1,
            name: file.name().to_owned(),
            size_bytes: file.size_bytes(),
        }
    }
}

/// Where the merged document was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedOutput {
    /// Destination path.
    pub path: PathBuf,
    /// Bytes written.
    pub file_size: u64,
}

/// Outcome of [`execute`].
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Staging list after edits, in merge order.
    pub staged: Vec<StagedEntry>,
    /// Inputs not admitted because of their media type.
    pub skipped: usize,
    /// Edits that referred to positions outside the list.
    pub ignored_edits: usize,
    /// Whether the run stopped before merging.
    pub dry_run: bool,
    /// Merge result, absent on a dry run.
    pub merge: Option<MergeReceipt>,
    /// Saved file, absent when the output stayed in memory.
    pub saved: Option<SavedOutput>,
    /// Preview window placement after the merge.
    pub preview: Option<WindowGeometry>,
    /// Viewport the preview was laid out in.
    pub viewport: Viewport,
}

impl RunReport {
    /// Total size of the staged files.
    pub fn staged_size_bytes(&self) -> u64 {
        self.staged.iter().map(|e| e.size_bytes).sum()
    }
}

/// Run one merge as described by `config`.
///
/// `confirm` is asked before replacing an existing output file when the
/// overwrite mode is [`OverwriteMode::Prompt`]; returning `false` cancels.
///
/// # Errors
///
/// Fails when an input cannot be resolved, fewer than two files end up
/// staged, the merge fails, or the output cannot be saved.
pub async fn execute<F>(config: &Config, confirm: F) -> Result<RunReport>
where
    F: Fn(&Path) -> Result<bool>,
{
    let paths = collect_input_paths(&config.inputs)?;
    info!(inputs = paths.len(), "resolved input paths");
    let candidates = open_disk_files(&paths)?;

    let mut session = Session::new(LopdfAssembler::new(), MemoryResourceStore::new())
        .with_accepted_media_type(config.accept.as_str())
        .with_preview_settings(PreviewSettings {
            viewport: config.viewport,
            defaults: config.window,
            constraints: config.constraints,
        });

    let admitted = session.add_files(candidates);
    let skipped = paths.len() - admitted.len();
    if skipped > 0 {
        warn!(skipped, accept = %config.accept, "inputs of another media type were skipped");
    }

    let ignored_edits = apply_edits(&mut session, &config.edits);

    let staged: Vec<StagedEntry> = session
        .staging()
        .files()
        .iter()
        .enumerate()
        .map(|(i, f)| StagedEntry::from_staged(i, f))
        .collect();

    let mut report = RunReport {
        staged,
        skipped,
        ignored_edits,
        dry_run: config.dry_run,
        merge: None,
        saved: None,
        preview: None,
        viewport: config.viewport,
    };

    if config.dry_run {
        debug!("dry run; not merging");
        return Ok(report);
    }

    if !session.can_merge() {
        return Err(PdfStageError::NotEnoughFiles {
            required: MIN_MERGE_FILES,
            staged: session.staging().len(),
        });
    }

    let receipt = session.merge().await?;
    report.preview = session.preview().map(|window| window.geometry());

    if let Some(path) = config.output_path(&receipt.resource.filename) {
        let bytes = session.current_bytes().ok_or(PdfStageError::NoOutput)?;
        let writer = writer_for(config, &path, &confirm).await?;
        let stats = writer.save(bytes, &path).await?;
        info!(path = %stats.output_path.display(), size = stats.file_size, "saved merged document");
        report.saved = Some(SavedOutput {
            path: stats.output_path,
            file_size: stats.file_size,
        });
    }

    report.merge = Some(receipt);
    Ok(report)
}

/// Apply moves in order, then removals in order. Each edit sees the list as
/// the previous one left it. Returns how many edits were out of range.
fn apply_edits<A, S>(session: &mut Session<A, S>, edits: &[StagingEdit]) -> usize
where
    A: DocumentAssembler,
    S: ResourceStore,
{
    let moves = edits
        .iter()
        .filter(|e| matches!(e, StagingEdit::Move { .. }));
    let removals = edits
        .iter()
        .filter(|e| matches!(e, StagingEdit::Remove { .. }));

    let mut ignored = 0;
    for edit in moves.chain(removals) {
        let applied = match *edit {
            StagingEdit::Move { from, to } => session.move_item(from, to).is_some(),
            StagingEdit::Remove { index } => session.remove_at(index),
        };
        if applied {
            debug!(?edit, "applied staging edit");
        } else {
            warn!(?edit, len = session.staging().len(), "staging edit out of range");
            ignored += 1;
        }
    }
    ignored
}

async fn writer_for<F>(config: &Config, path: &Path, confirm: &F) -> Result<OutputWriter>
where
    F: Fn(&Path) -> Result<bool>,
{
    let writer = OutputWriter::new();
    writer.can_write(path).await?;

    if !writer.exists(path).await {
        return Ok(writer);
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(OutputWriter::overwriting()),
        OverwriteMode::NoClobber => Err(PdfStageError::output_exists(path.to_path_buf())),
        // Nobody to ask in quiet mode.
        OverwriteMode::Prompt if config.quiet => {
            Err(PdfStageError::output_exists(path.to_path_buf()))
        }
        OverwriteMode::Prompt => {
            if confirm(path)? {
                Ok(OutputWriter::overwriting())
            } else {
                Err(PdfStageError::Cancelled)
            }
        }
    }
}
