//! Full runs driven by parsed command lines.

use clap::Parser;
use pdfstage::PdfStageError;
use pdfstage::cli::Cli;
use pdfstage::ops::execute;
use std::path::Path;
use tempfile::TempDir;

use crate::common::{labelled_pdf, labels_of, write_fixture};

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("pdfstage").chain(args.iter().copied()))
        .expect("Failed to parse arguments")
}

fn no_prompt(_: &Path) -> pdfstage::Result<bool> {
    Ok(false)
}

#[tokio::test]
async fn test_merge_with_move_writes_output() {
    let dir = TempDir::new().unwrap();
    let a = write_fixture(dir.path(), "a.pdf", &labelled_pdf(&[1, 2]));
    let b = write_fixture(dir.path(), "b.pdf", &labelled_pdf(&[3, 4, 5]));
    let out = dir.path().join("merged.pdf");

    let config = cli(&[
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--move",
        "2:1",
        "-o",
        out.to_str().unwrap(),
        "--viewport",
        "320x480",
    ])
    .to_config()
    .unwrap();

    let report = execute(&config, no_prompt).await.unwrap();

    assert_eq!(labels_of(&std::fs::read(&out).unwrap()), vec![3, 4, 5, 1, 2]);
    let preview = report.preview.unwrap();
    assert_eq!(preview.size.width, 294.0);
    assert_eq!(preview.size.height, 384.0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["merge"]["total_pages"], 5);
    assert_eq!(json["staged"][0]["name"], "b.pdf");
}

#[tokio::test]
async fn test_directory_input_is_staged_by_name() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("chapters");
    std::fs::create_dir(&inputs).unwrap();
    write_fixture(&inputs, "02.pdf", &labelled_pdf(&[2]));
    write_fixture(&inputs, "01.pdf", &labelled_pdf(&[1]));
    write_fixture(&inputs, "readme.txt", b"notes");

    let config = cli(&[inputs.to_str().unwrap(), "--dry-run"]).to_config().unwrap();
    let report = execute(&config, no_prompt).await.unwrap();

    let names: Vec<_> = report.staged.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["01.pdf", "02.pdf"]);
    assert_eq!(report.skipped, 1);
    assert!(report.merge.is_none());
}

#[tokio::test]
async fn test_no_clobber_refuses_existing_output() {
    let dir = TempDir::new().unwrap();
    let a = write_fixture(dir.path(), "a.pdf", &labelled_pdf(&[1]));
    let b = write_fixture(dir.path(), "b.pdf", &labelled_pdf(&[2]));
    let out = write_fixture(dir.path(), "out.pdf", b"keep me");

    let config = cli(&[
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--no-clobber",
    ])
    .to_config()
    .unwrap();

    let err = execute(&config, no_prompt).await.unwrap_err();
    assert!(matches!(err, PdfStageError::OutputExists { .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(std::fs::read(&out).unwrap(), b"keep me");
}

#[tokio::test]
async fn test_missing_input_is_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.pdf");

    let config = cli(&[missing.to_str().unwrap(), "-n"]).to_config().unwrap();
    let err = execute(&config, no_prompt).await.unwrap_err();
    assert!(matches!(err, PdfStageError::FileNotFound { .. }));
}
