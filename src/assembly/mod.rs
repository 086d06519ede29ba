//! The document-assembly boundary.
//!
//! The merge orchestrator only ever talks to a [`DocumentAssembler`]; it
//! never inspects document bytes itself. [`LopdfAssembler`] is the production
//! implementation.

mod lopdf_assembler;

pub use lopdf_assembler::{LopdfAssembler, PageHandle};

/// Failure reported by the assembly backend.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// The input is password-protected or otherwise encrypted.
    #[error("document is encrypted")]
    Encrypted,

    /// The input could not be parsed as a document.
    #[error("document could not be parsed: {0}")]
    Malformed(String),

    /// A structural operation on a parsed document failed.
    #[error("document structure error: {0}")]
    Structure(String),

    /// The output could not be serialized.
    #[error("failed to serialize document: {0}")]
    Serialize(String),
}

impl From<lopdf::Error> for AssemblyError {
    fn from(err: lopdf::Error) -> Self {
        Self::Structure(err.to_string())
    }
}

/// Operations the merge needs from a document library.
///
/// `copy_pages` hands back portable page handles that belong to `target`
/// but are not yet part of its page sequence; `append_page` places them.
pub trait DocumentAssembler {
    /// In-memory document.
    type Document;
    /// A page copied into a target document, awaiting placement.
    type Page;

    /// Create an empty document with no pages.
    fn create(&self) -> Result<Self::Document, AssemblyError>;

    /// Parse a document from bytes, refusing encrypted ones.
    fn load(&self, bytes: &[u8]) -> Result<Self::Document, AssemblyError>;

    /// Zero-based indices of every page, in document order.
    fn page_indices(&self, doc: &Self::Document) -> Vec<usize>;

    /// Copy the pages at `indices` of `source` into `target`.
    fn copy_pages(
        &self,
        target: &mut Self::Document,
        source: &Self::Document,
        indices: &[usize],
    ) -> Result<Vec<Self::Page>, AssemblyError>;

    /// Append a copied page after all pages already in `target`.
    fn append_page(&self, target: &mut Self::Document, page: Self::Page)
    -> Result<(), AssemblyError>;

    /// Serialize `doc`. No page is added when the document is empty.
    fn save(&self, doc: Self::Document) -> Result<Vec<u8>, AssemblyError>;
}
