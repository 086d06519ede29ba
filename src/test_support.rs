//! Fixtures shared by unit tests.

use futures::future::{FutureExt, LocalBoxFuture};
use lopdf::{Document, Object, Stream, dictionary};
use std::io;
use std::sync::{Arc, Mutex};

use crate::staging::{FileSource, MemoryFile, PDF_MEDIA_TYPE};

/// Build a PDF whose pages carry a `Label` integer and inherit their
/// MediaBox from the page tree root.
pub fn labelled_pdf(labels: &[i64]) -> Vec<u8> {
    serialize(labelled_document(labels))
}

/// Unencrypted labelled PDF with an Info dictionary `Title`.
pub fn pdf_titled(labels: &[i64], title: &str) -> Vec<u8> {
    let mut doc = labelled_document(labels);
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
    });
    doc.trailer.set("Info", info_id);
    serialize(doc)
}

/// Labelled PDF whose trailer references an encryption dictionary.
pub fn encrypted_pdf(labels: &[i64]) -> Vec<u8> {
    let mut doc = labelled_document(labels);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    serialize(doc)
}

fn labelled_document(labels: &[i64]) -> Document {
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
                "Label" => label,
            });
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => labels.len() as i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn serialize(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Page labels of a serialized document, in page order.
pub fn labels_of(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            doc.get_dictionary(id)
                .unwrap()
                .get(b"Label")
                .unwrap()
                .as_i64()
                .unwrap()
        })
        .collect()
}

/// In-memory PDF handle.
pub fn pdf_file(name: &str, bytes: Vec<u8>) -> Arc<dyn FileSource> {
    Arc::new(MemoryFile::pdf(name, bytes))
}

/// A file that yields to the scheduler once before handing out its bytes.
#[derive(Debug)]
pub struct SlowFile(pub MemoryFile);

impl FileSource for SlowFile {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn size_bytes(&self) -> u64 {
        self.0.size_bytes()
    }

    fn media_type(&self) -> &str {
        PDF_MEDIA_TYPE
    }

    fn read_all(&self) -> LocalBoxFuture<'_, io::Result<Vec<u8>>> {
        async move {
            tokio::task::yield_now().await;
            self.0.read_all().await
        }
        .boxed_local()
    }
}

/// In-memory sink for formatted `tracing` output.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
