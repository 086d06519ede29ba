//! [`DocumentAssembler`] backed by `lopdf`.
//!
//! Copying works the way a plain `lopdf` merge does: the source is cloned,
//! its objects are renumbered above the target's highest id so nothing
//! collides, and the whole object set is moved across. Pages are then hooked
//! into the target's root `Pages` node one by one. Objects that end up
//! unreachable (the source's catalog, skipped pages) are pruned on save.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use tracing::trace;

use super::{AssemblyError, DocumentAssembler};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed inputs.
const MAX_TREE_DEPTH: usize = 64;

/// A page object copied into a target document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHandle(ObjectId);

/// `lopdf`-based document assembler.
#[derive(Debug, Clone)]
pub struct LopdfAssembler {
    version: String,
    compress: bool,
}

impl Default for LopdfAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LopdfAssembler {
    /// Assembler producing compressed PDF 1.7 output.
    pub fn new() -> Self {
        Self {
            version: "1.7".to_owned(),
            compress: true,
        }
    }

    /// Assembler that leaves streams uncompressed on save.
    pub fn without_compression() -> Self {
        Self {
            compress: false,
            ..Self::new()
        }
    }

    fn root_pages_id(doc: &Document) -> Result<ObjectId, AssemblyError> {
        Ok(doc.catalog()?.get(b"Pages")?.as_reference()?)
    }

    /// Collect inheritable attributes missing on the page from its ancestors.
    fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
        let mut found: Vec<(Vec<u8>, Object)> = Vec::new();

        let Ok(page) = doc.get_dictionary(page_id) else {
            return found;
        };
        let mut missing: Vec<&[u8]> = INHERITABLE_KEYS
            .into_iter()
            .filter(|key| !page.has(key))
            .collect();

        let mut parent = parent_of(page);
        let mut depth = 0;
        while let Some(parent_id) = parent {
            if missing.is_empty() || depth >= MAX_TREE_DEPTH {
                break;
            }
            let Ok(node) = doc.get_dictionary(parent_id) else {
                break;
            };
            missing.retain(|key| match node.get(key) {
                Ok(value) => {
                    found.push((key.to_vec(), value.clone()));
                    false
                }
                Err(_) => true,
            });
            parent = parent_of(node);
            depth += 1;
        }

        found
    }
}

fn parent_of(node: &Dictionary) -> Option<ObjectId> {
    node.get(b"Parent").and_then(Object::as_reference).ok()
}

/// Raw bytes of the trailer dictionary the final `startxref` points at.
///
/// Covers both a classic `xref` table followed by `trailer` and a
/// cross-reference stream object. Falls back to the last `trailer` keyword
/// when the offset is unusable.
fn trailer_dictionary(bytes: &[u8]) -> Option<&[u8]> {
    let from_startxref = rfind(bytes, b"startxref").and_then(|at| {
        let offset: usize = bytes[at + b"startxref".len()..]
            .iter()
            .skip_while(|b| b.is_ascii_whitespace())
            .take_while(|b| b.is_ascii_digit())
            .map(|&b| char::from(b))
            .collect::<String>()
            .parse()
            .ok()?;
        let section = bytes.get(offset..)?;
        let start = if section.starts_with(b"xref") {
            find(section, b"trailer")?
        } else {
            0
        };
        dictionary_at(&section[start..])
    });

    from_startxref.or_else(|| {
        let at = rfind(bytes, b"trailer")?;
        dictionary_at(&bytes[at..])
    })
}

/// The first balanced `<< ... >>` span in `bytes`.
fn dictionary_at(bytes: &[u8]) -> Option<&[u8]> {
    let open = find(bytes, b"<<")?;
    let mut depth = 0usize;
    let mut i = open;
    while i + 1 < bytes.len() {
        match &bytes[i..i + 2] {
            b"<<" => {
                depth += 1;
                i += 2;
            }
            b">>" => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return Some(&bytes[open..i]);
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// Whether a raw dictionary has an `/Encrypt` key.
fn has_encrypt_key(dict: &[u8]) -> bool {
    const KEY: &[u8] = b"/Encrypt";
    dict.windows(KEY.len()).enumerate().any(|(at, window)| {
        window == KEY
            && dict
                .get(at + KEY.len())
                .is_none_or(|next| !next.is_ascii_alphanumeric())
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

impl DocumentAssembler for LopdfAssembler {
    type Document = Document;
    type Page = PageHandle;

    fn create(&self) -> Result<Document, AssemblyError> {
        let mut doc = Document::with_version(self.version.as_str());

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(doc)
    }

    fn load(&self, bytes: &[u8]) -> Result<Document, AssemblyError> {
        // lopdf opens empty-password documents transparently, so the trailer
        // is checked before parsing as well as after.
        if trailer_dictionary(bytes).is_some_and(has_encrypt_key) {
            return Err(AssemblyError::Encrypted);
        }

        let doc = Document::load_mem(bytes).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("encrypt") || msg.contains("password") {
                AssemblyError::Encrypted
            } else {
                AssemblyError::Malformed(msg)
            }
        })?;

        if doc.is_encrypted() || doc.trailer.has(b"Encrypt") {
            return Err(AssemblyError::Encrypted);
        }

        // A document without a reachable page tree cannot be copied from.
        Self::root_pages_id(&doc).map_err(|e| AssemblyError::Malformed(e.to_string()))?;

        Ok(doc)
    }

    fn page_indices(&self, doc: &Document) -> Vec<usize> {
        (0..doc.get_pages().len()).collect()
    }

    fn copy_pages(
        &self,
        target: &mut Document,
        source: &Document,
        indices: &[usize],
    ) -> Result<Vec<PageHandle>, AssemblyError> {
        let mut imported = source.clone();

        // Avoid object id collisions by renumbering the incoming document
        imported.renumber_objects_with(target.max_id + 1);

        let page_ids: Vec<ObjectId> = imported.get_pages().into_values().collect();
        let selected = indices
            .iter()
            .map(|&i| {
                page_ids.get(i).copied().ok_or_else(|| {
                    AssemblyError::Structure(format!(
                        "page index {i} out of range for {} page(s)",
                        page_ids.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Pages are about to be re-parented, so anything they inherited from
        // the source's page tree has to live on the page itself.
        for &page_id in &selected {
            let inherited = Self::inherited_attributes(&imported, page_id);
            if inherited.is_empty() {
                continue;
            }
            let page = imported.get_object_mut(page_id)?.as_dict_mut()?;
            for (key, value) in inherited {
                page.set(key, value);
            }
        }

        trace!(
            pages = selected.len(),
            objects = imported.objects.len(),
            "importing source objects"
        );

        target.max_id = target.max_id.max(imported.max_id);
        target.objects.extend(imported.objects);

        Ok(selected.into_iter().map(PageHandle).collect())
    }

    fn append_page(&self, target: &mut Document, page: PageHandle) -> Result<(), AssemblyError> {
        let pages_id = Self::root_pages_id(target)?;

        target
            .get_object_mut(page.0)?
            .as_dict_mut()?
            .set("Parent", Object::Reference(pages_id));

        let pages_dict = target.get_object_mut(pages_id)?.as_dict_mut()?;
        pages_dict
            .get_mut(b"Kids")?
            .as_array_mut()?
            .push(Object::Reference(page.0));

        let current_count = pages_dict.get(b"Count")?.as_i64()?;
        pages_dict.set("Count", Object::Integer(current_count + 1));

        Ok(())
    }

    fn save(&self, mut doc: Document) -> Result<Vec<u8>, AssemblyError> {
        doc.prune_objects();
        doc.renumber_objects();
        if self.compress {
            doc.compress();
        }

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| AssemblyError::Serialize(e.to_string()))?;
        Ok(buffer)
    }
}
