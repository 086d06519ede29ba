//! Fixtures for the integration tests.
//!
//! PDFs are generated on the fly: every page carries a `Label` integer so a
//! merged document's page order can be read back.

#![allow(dead_code)]

use lopdf::{Document, Object, Stream, dictionary};
use pdfstage::staging::{FileSource, MemoryFile};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Serialize a document with one page per label.
pub fn labelled_pdf(labels: &[i64]) -> Vec<u8> {
    let mut doc = build_document(labels);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize fixture");
    bytes
}

/// Same as [`labelled_pdf`] but the trailer declares an encryption dictionary.
pub fn encrypted_pdf(labels: &[i64]) -> Vec<u8> {
    let mut doc = build_document(labels);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
    });
    doc.trailer.set("Encrypt", encrypt_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize fixture");
    bytes
}

fn build_document(labels: &[i64]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = labels
        .iter()
        .map(|&label| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Label" => label,
            });
            page_id.into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => labels.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Page labels of a serialized document, in page order.
pub fn labels_of(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).expect("Output is not a readable PDF");
    doc.get_pages()
        .into_values()
        .map(|id| {
            doc.get_dictionary(id)
                .and_then(|page| page.get(b"Label"))
                .and_then(Object::as_i64)
                .expect("Page without a label")
        })
        .collect()
}

/// In-memory PDF handle.
pub fn pdf(name: &str, bytes: Vec<u8>) -> Arc<dyn FileSource> {
    Arc::new(MemoryFile::pdf(name, bytes))
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write fixture");
    path
}
