use serde::Serialize;
use std::cell::Cell;
use tracing::{debug, info};

use super::{MergeFailure, MergeOutput, MergedInput};
use crate::assembly::{AssemblyError, DocumentAssembler};
use crate::staging::StagedFile;

/// Where the orchestrator is in its `Idle → Merging → {Succeeded, Failed} → Idle` cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergePhase {
    /// Ready to accept a merge.
    Idle,
    /// A merge is in flight; further requests are refused.
    Merging,
    /// The last merge produced output.
    Succeeded,
    /// The last merge failed.
    Failed,
}

/// Holds the `Merging` phase for the duration of one merge.
///
/// Dropping the guard always returns the orchestrator to `Idle`, including
/// when the merge future itself is dropped halfway.
struct PhaseGuard<'a> {
    phase: &'a Cell<MergePhase>,
    last_completed: &'a Cell<Option<MergePhase>>,
}

impl<'a> PhaseGuard<'a> {
    fn acquire(
        phase: &'a Cell<MergePhase>,
        last_completed: &'a Cell<Option<MergePhase>>,
    ) -> Result<Self, MergeFailure> {
        if phase.get() == MergePhase::Merging {
            return Err(MergeFailure::AlreadyMerging);
        }
        phase.set(MergePhase::Merging);
        Ok(Self {
            phase,
            last_completed,
        })
    }

    fn complete(&self, succeeded: bool) {
        let outcome = if succeeded {
            MergePhase::Succeeded
        } else {
            MergePhase::Failed
        };
        self.phase.set(outcome);
        self.last_completed.set(Some(outcome));
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.phase.set(MergePhase::Idle);
    }
}

/// Drives a [`DocumentAssembler`] over the staged files in order.
///
/// Single-threaded by construction (`!Sync`): concurrent requests on the
/// same orchestrator interleave only at `.await` points, and any request
/// arriving while one is in flight is refused with
/// [`MergeFailure::AlreadyMerging`] rather than queued.
#[derive(Debug)]
pub struct MergeOrchestrator<A> {
    assembler: A,
    phase: Cell<MergePhase>,
    last_completed: Cell<Option<MergePhase>>,
}

impl<A: DocumentAssembler> MergeOrchestrator<A> {
    /// Orchestrator rejecting encrypted inputs.
    pub fn new(assembler: A) -> Self {
        Self {
            assembler,
            phase: Cell::new(MergePhase::Idle),
            last_completed: Cell::new(None),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> MergePhase {
        self.phase.get()
    }

    /// Whether a merge is in flight.
    pub fn is_merging(&self) -> bool {
        self.phase.get() == MergePhase::Merging
    }

    /// Outcome of the most recent merge that got past the entry guard.
    pub fn last_completed(&self) -> Option<MergePhase> {
        self.last_completed.get()
    }

    /// Merge `files` in order into one document.
    ///
    /// # Errors
    ///
    /// Refuses to start with [`MergeFailure::Empty`] or
    /// [`MergeFailure::AlreadyMerging`]. Otherwise the first input that cannot
    /// be read or opened aborts the merge and is named in the failure.
    pub async fn merge(&self, files: &[StagedFile]) -> Result<MergeOutput, MergeFailure> {
        if files.is_empty() {
            return Err(MergeFailure::Empty);
        }
        let guard = PhaseGuard::acquire(&self.phase, &self.last_completed)?;

        info!(files = files.len(), "merging staged files");
        let result = self.run(files).await;

        match &result {
            Ok(output) => info!(
                pages = output.total_pages(),
                bytes = output.bytes.len(),
                "merge succeeded"
            ),
            Err(failure) => info!(%failure, ?failure, "merge failed"),
        }
        guard.complete(result.is_ok());

        result
    }

    async fn run(&self, files: &[StagedFile]) -> Result<MergeOutput, MergeFailure> {
        let assembler = &self.assembler;
        let mut output = assembler.create().map_err(generic)?;
        let mut inputs = Vec::with_capacity(files.len());

        for (idx, file) in files.iter().enumerate() {
            debug!(
                index = idx + 1,
                total = files.len(),
                name = file.name(),
                "processing staged file"
            );

            let bytes = file
                .handle()
                .read_all()
                .await
                .map_err(|e| MergeFailure::UnreadableInput {
                    name: file.name().to_owned(),
                    reason: e.to_string(),
                })?;

            let source = assembler
                .load(&bytes)
                .map_err(|e| match e {
                    AssemblyError::Encrypted => MergeFailure::EncryptedInput {
                        name: file.name().to_owned(),
                    },
                    other => MergeFailure::UnsupportedInput {
                        name: file.name().to_owned(),
                        reason: other.to_string(),
                    },
                })?;

            let indices = assembler.page_indices(&source);
            let pages = assembler
                .copy_pages(&mut output, &source, &indices)
                .map_err(generic)?;
            for page in pages {
                assembler.append_page(&mut output, page).map_err(generic)?;
            }

            debug!(name = file.name(), pages = indices.len(), "pages appended");
            inputs.push(MergedInput {
                id: file.id(),
                name: file.name().to_owned(),
                pages: indices.len(),
            });
        }

        let bytes = assembler.save(output).map_err(generic)?;
        Ok(MergeOutput { bytes, inputs })
    }
}

fn generic(err: AssemblyError) -> MergeFailure {
    MergeFailure::Assembly {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::LopdfAssembler;
    use crate::staging::{FileSource, MemoryFile, StagingList};
    use crate::logging::LogConfig;
    use crate::test_support::{
        CapturedLogs, SlowFile, encrypted_pdf, labelled_pdf, labels_of, pdf_file, pdf_titled,
    };
    use std::sync::Arc;

    fn orchestrator() -> MergeOrchestrator<LopdfAssembler> {
        MergeOrchestrator::new(LopdfAssembler::new())
    }

    #[tokio::test]
    async fn test_merge_follows_list_order() {
        let mut list = StagingList::default();
        list.append(vec![
            pdf_file("a.pdf", labelled_pdf(&[1, 2])),
            pdf_file("b.pdf", labelled_pdf(&[3, 4, 5])),
        ]);
        list.move_item(1, 0);

        let orch = orchestrator();
        let output = orch.merge(list.files()).await.unwrap();

        assert_eq!(labels_of(&output.bytes), vec![3, 4, 5, 1, 2]);
        assert_eq!(output.total_pages(), 5);
        assert_eq!(output.inputs[0].name, "b.pdf");
        assert_eq!(orch.phase(), MergePhase::Idle);
        assert_eq!(orch.last_completed(), Some(MergePhase::Succeeded));
    }

    #[tokio::test]
    async fn test_corrupt_input_fails_fast_and_is_named() {
        let mut list = StagingList::default();
        list.append(vec![
            pdf_file("good.pdf", labelled_pdf(&[1])),
            pdf_file("broken.pdf", b"%PDF-1.4 garbage".to_vec()),
            pdf_file("later.pdf", labelled_pdf(&[2])),
        ]);

        let orch = orchestrator();
        let failure = orch.merge(list.files()).await.unwrap_err();

        assert_eq!(failure.offending_file(), Some("broken.pdf"));
        assert!(failure.to_string().contains("broken.pdf"));
        assert_eq!(orch.phase(), MergePhase::Idle);
        assert_eq!(orch.last_completed(), Some(MergePhase::Failed));
    }

    #[tokio::test]
    async fn test_encrypted_input_is_rejected() {
        let mut list = StagingList::default();
        list.append(vec![
            pdf_file("plain.pdf", labelled_pdf(&[1])),
            pdf_file("secret.pdf", encrypted_pdf(&[2])),
        ]);

        let failure = orchestrator().merge(list.files()).await.unwrap_err();
        assert_eq!(
            failure,
            MergeFailure::EncryptedInput {
                name: "secret.pdf".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_encrypt_mentioned_in_metadata_still_merges() {
        let mut list = StagingList::default();
        list.append(vec![
            pdf_file("notes.pdf", pdf_titled(&[1], "Notes on the /Encrypt dictionary")),
            pdf_file("b.pdf", labelled_pdf(&[2])),
        ]);

        let output = orchestrator().merge(list.files()).await.unwrap();
        assert_eq!(labels_of(&output.bytes), vec![1, 2]);
    }

    async fn failure_logs(config: LogConfig) -> String {
        let logs = CapturedLogs::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(config.directive())
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut list = StagingList::default();
        list.append(vec![pdf_file("broken.pdf", b"%PDF-1.4 garbage".to_vec())]);
        orchestrator().merge(list.files()).await.unwrap_err();

        logs.contents()
    }

    #[tokio::test]
    async fn test_failure_is_not_logged_at_default_level() {
        assert_eq!(failure_logs(LogConfig::default()).await, "");
        assert!(
            failure_logs(LogConfig::from_flags(1, false))
                .await
                .contains("merge failed")
        );
    }

    #[tokio::test]
    async fn test_empty_list_is_refused_without_changing_phase() {
        let orch = orchestrator();
        assert_eq!(orch.merge(&[]).await.unwrap_err(), MergeFailure::Empty);
        assert_eq!(orch.last_completed(), None);
    }

    #[tokio::test]
    async fn test_concurrent_request_is_refused() {
        let mut list = StagingList::default();
        list.append(vec![
            Arc::new(SlowFile(MemoryFile::pdf("a.pdf", labelled_pdf(&[1])))) as Arc<dyn FileSource>,
            pdf_file("b.pdf", labelled_pdf(&[2])),
        ]);

        let orch = orchestrator();
        let (first, second) = futures::join!(orch.merge(list.files()), orch.merge(list.files()));

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), MergeFailure::AlreadyMerging);
        assert!(!orch.is_merging());
    }

    #[tokio::test]
    async fn test_dropped_merge_releases_phase() {
        let mut list = StagingList::default();
        list.append(vec![
            Arc::new(SlowFile(MemoryFile::pdf("a.pdf", labelled_pdf(&[1])))) as Arc<dyn FileSource>,
        ]);

        let orch = orchestrator();
        {
            let mut fut = Box::pin(orch.merge(list.files()));
            assert!(futures::poll!(fut.as_mut()).is_pending());
            assert!(orch.is_merging());
        }
        assert_eq!(orch.phase(), MergePhase::Idle);
    }
}
