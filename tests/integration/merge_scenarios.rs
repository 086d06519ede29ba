//! Merge order and fail-fast behavior through the public orchestrator.

use pdfstage::assembly::LopdfAssembler;
use pdfstage::merge::{MergeFailure, MergeOrchestrator, MergePhase};
use pdfstage::staging::StagingList;

use crate::common::{encrypted_pdf, labelled_pdf, labels_of, pdf};

#[tokio::test]
async fn test_reordered_list_merges_in_list_order() {
    let mut list = StagingList::default();
    list.append(vec![
        pdf("A.pdf", labelled_pdf(&[1, 2])),
        pdf("B.pdf", labelled_pdf(&[3, 4, 5])),
    ]);
    assert_eq!(list.move_item(1, 0), Some(0));

    let orchestrator = MergeOrchestrator::new(LopdfAssembler::new());
    let output = orchestrator.merge(list.files()).await.unwrap();

    assert_eq!(output.total_pages(), 5);
    assert_eq!(labels_of(&output.bytes), vec![3, 4, 5, 1, 2]);
    let names: Vec<_> = output.inputs.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["B.pdf", "A.pdf"]);
    assert_eq!(orchestrator.last_completed(), Some(MergePhase::Succeeded));
}

#[tokio::test]
async fn test_encrypted_input_fails_the_whole_merge() {
    let mut list = StagingList::default();
    list.append(vec![
        pdf("A.pdf", labelled_pdf(&[1])),
        pdf("locked.pdf", encrypted_pdf(&[2])),
        pdf("C.pdf", labelled_pdf(&[3])),
    ]);

    let orchestrator = MergeOrchestrator::new(LopdfAssembler::new());
    let failure = orchestrator.merge(list.files()).await.unwrap_err();

    assert_eq!(failure.offending_file(), Some("locked.pdf"));
    assert!(failure.to_string().contains("locked.pdf"));
    assert_eq!(list.len(), 3);
    assert_eq!(orchestrator.phase(), MergePhase::Idle);
    assert_eq!(orchestrator.last_completed(), Some(MergePhase::Failed));
}

#[tokio::test]
async fn test_corrupt_input_is_named() {
    let mut list = StagingList::default();
    list.append(vec![
        pdf("good.pdf", labelled_pdf(&[1])),
        pdf("truncated.pdf", labelled_pdf(&[2])[..40].to_vec()),
    ]);

    let failure = MergeOrchestrator::new(LopdfAssembler::new())
        .merge(list.files())
        .await
        .unwrap_err();

    assert!(matches!(failure, MergeFailure::UnsupportedInput { .. }));
    assert_eq!(failure.offending_file(), Some("truncated.pdf"));
}

#[tokio::test]
async fn test_single_file_merge_is_allowed_by_the_orchestrator() {
    let mut list = StagingList::default();
    list.append(vec![pdf("only.pdf", labelled_pdf(&[7, 8]))]);
    assert!(!list.has_enough_to_merge());

    let output = MergeOrchestrator::new(LopdfAssembler::new())
        .merge(list.files())
        .await
        .unwrap();
    assert_eq!(labels_of(&output.bytes), vec![7, 8]);
}
