//! Staging, merging, publishing and previewing through one session.

use pdfstage::assembly::LopdfAssembler;
use pdfstage::geometry::Point;
use pdfstage::output::MemoryResourceStore;
use pdfstage::session::Session;
use pdfstage::staging::{FileSource, MemoryFile};
use std::sync::Arc;

use crate::common::{labelled_pdf, labels_of, pdf};

fn session() -> (MemoryResourceStore, Session<LopdfAssembler, MemoryResourceStore>) {
    let store = MemoryResourceStore::new();
    (store.clone(), Session::new(LopdfAssembler::new(), store))
}

#[tokio::test]
async fn test_only_pdfs_are_staged() {
    let (_, mut session) = session();
    let admitted = session.add_files(vec![
        pdf("a.pdf", labelled_pdf(&[1])),
        Arc::new(MemoryFile::new("photo.png", "image/png", vec![0u8; 4])) as Arc<dyn FileSource>,
        pdf("b.pdf", labelled_pdf(&[2])),
    ]);

    assert_eq!(admitted.len(), 2);
    assert!(session.staging().summary().starts_with("2 file(s)"));
}

#[tokio::test]
async fn test_second_publish_revokes_first() {
    let (store, mut session) = session();
    session.add_files(vec![
        pdf("a.pdf", labelled_pdf(&[1])),
        pdf("b.pdf", labelled_pdf(&[2])),
    ]);

    let first = session.merge().await.unwrap();
    let second = session.merge().await.unwrap();

    assert_ne!(first.resource.url, second.resource.url);
    assert!(!store.is_live(&first.resource.url));
    assert_eq!(store.live_count(), 1);
    assert_eq!(
        store.media_type(&second.resource.url).as_deref(),
        Some("application/pdf")
    );
}

#[tokio::test]
async fn test_failed_merge_publishes_nothing() {
    let (store, mut session) = session();
    session.add_files(vec![
        pdf("a.pdf", labelled_pdf(&[1])),
        pdf("b.pdf", labelled_pdf(&[2])),
        pdf("broken.pdf", b"junk".to_vec()),
    ]);

    assert!(session.merge().await.is_err());
    assert_eq!(store.live_count(), 0);
    assert!(session.current_output().is_none());
    assert!(session.error().is_some_and(|e| e.contains("broken.pdf")));

    session.remove_at(2);
    let receipt = session.merge().await.unwrap();
    assert!(session.error().is_none());
    assert_eq!(labels_of(&store.get(&receipt.resource.url).unwrap()), vec![1, 2]);
}

#[tokio::test]
async fn test_close_button_revokes_output() {
    let (store, mut session) = session();
    session.add_files(vec![
        pdf("a.pdf", labelled_pdf(&[1])),
        pdf("b.pdf", labelled_pdf(&[2])),
    ]);
    session.merge().await.unwrap();

    let g = session.preview().unwrap().geometry();
    session.pointer_down(Point::new(g.right() - 10.0, g.position.y + 10.0));

    assert!(session.preview().is_none());
    assert_eq!(store.live_count(), 0);
}
