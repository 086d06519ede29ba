//! Output resources and user-facing output.
//!
//! A successful merge is exposed as a revocable, in-memory resource. The
//! [`OutputResourceManager`] keeps at most one of them live: publishing a new
//! resource revokes the previous one, and dropping the manager revokes the
//! last.

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::staging::PDF_MEDIA_TYPE;

/// Address of a stored resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceUrl(String);

impl ResourceUrl {
    /// The URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platform facility holding in-memory blobs behind revocable URLs.
pub trait ResourceStore {
    /// Store `bytes` and return a fresh URL for them.
    fn create(&self, bytes: Arc<[u8]>, media_type: &str) -> ResourceUrl;

    /// Release the blob behind `url`. Unknown or already revoked URLs are ignored.
    fn revoke(&self, url: &ResourceUrl);

    /// Bytes behind `url`, or `None` once it has been revoked.
    fn fetch(&self, url: &ResourceUrl) -> Option<Arc<[u8]>>;
}

#[derive(Debug)]
struct Blob {
    bytes: Arc<[u8]>,
    media_type: String,
}

#[derive(Debug, Default)]
struct StoreInner {
    next: u64,
    live: HashMap<ResourceUrl, Blob>,
}

/// In-process [`ResourceStore`].
///
/// Clones share the same underlying map, so a caller can hand one clone to an
/// [`OutputResourceManager`] and keep another to inspect what is live.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl MemoryResourceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `url` still refers to a live blob.
    pub fn is_live(&self, url: &ResourceUrl) -> bool {
        self.inner.borrow().live.contains_key(url)
    }

    /// Bytes behind `url`, if it is live.
    pub fn get(&self, url: &ResourceUrl) -> Option<Arc<[u8]>> {
        self.inner
            .borrow()
            .live
            .get(url)
            .map(|blob| Arc::clone(&blob.bytes))
    }

    /// Declared media type of the blob behind `url`, if it is live.
    pub fn media_type(&self, url: &ResourceUrl) -> Option<String> {
        self.inner
            .borrow()
            .live
            .get(url)
            .map(|blob| blob.media_type.clone())
    }

    /// Number of live blobs.
    pub fn live_count(&self) -> usize {
        self.inner.borrow().live.len()
    }
}

impl ResourceStore for MemoryResourceStore {
    fn create(&self, bytes: Arc<[u8]>, media_type: &str) -> ResourceUrl {
        let mut inner = self.inner.borrow_mut();
        inner.next += 1;
        let url = ResourceUrl(format!("blob:pdfstage/{}", inner.next));
        inner.live.insert(
            url.clone(),
            Blob {
                bytes,
                media_type: media_type.to_owned(),
            },
        );
        url
    }

    fn revoke(&self, url: &ResourceUrl) {
        self.inner.borrow_mut().live.remove(url);
    }

    fn fetch(&self, url: &ResourceUrl) -> Option<Arc<[u8]>> {
        self.get(url)
    }
}

/// A published merge result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputResource {
    /// Where the bytes can be fetched while the resource is live.
    pub url: ResourceUrl,
    /// Suggested download name.
    pub filename: String,
    /// Size of the published bytes.
    pub size_bytes: u64,
    /// When the resource was published.
    pub created_at: DateTime<Utc>,
}

/// Suggested filename for a merge completed at `at`:
/// `merged-YYYY-MM-DD-HH-MM-SS.pdf`.
pub fn suggested_filename(at: DateTime<Utc>) -> String {
    format!("merged-{}.pdf", at.format("%Y-%m-%d-%H-%M-%S"))
}

/// Owns the single live output resource.
#[derive(Debug)]
pub struct OutputResourceManager<S: ResourceStore> {
    store: S,
    current: Option<OutputResource>,
}

impl<S: ResourceStore> OutputResourceManager<S> {
    /// Create a manager with nothing published.
    pub fn new(store: S) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Publish `bytes` as the live resource, stamped with the current time.
    pub fn publish(&mut self, bytes: Vec<u8>) -> &OutputResource {
        self.publish_at(bytes, Utc::now())
    }

    /// Publish `bytes` as the live resource, stamped with `at`.
    ///
    /// The new resource exists before the previous one is revoked, and the
    /// previous one is revoked before this call returns.
    pub fn publish_at(&mut self, bytes: Vec<u8>, at: DateTime<Utc>) -> &OutputResource {
        let size_bytes = bytes.len() as u64;
        let url = self.store.create(bytes.into(), PDF_MEDIA_TYPE);

        if let Some(previous) = self.current.take() {
            debug!(url = %previous.url, "revoking superseded resource");
            self.store.revoke(&previous.url);
        }

        info!(%url, size_bytes, "published output resource");
        self.current.insert(OutputResource {
            url,
            filename: suggested_filename(at),
            size_bytes,
            created_at: at,
        })
    }

    /// Revoke the live resource, if any.
    pub fn revoke_current(&mut self) {
        if let Some(resource) = self.current.take() {
            debug!(url = %resource.url, "revoking output resource");
            self.store.revoke(&resource.url);
        }
    }

    /// The live resource, if any.
    pub fn current(&self) -> Option<&OutputResource> {
        self.current.as_ref()
    }

    /// Bytes of the live resource, if any.
    pub fn current_bytes(&self) -> Option<Arc<[u8]>> {
        self.current
            .as_ref()
            .and_then(|resource| self.store.fetch(&resource.url))
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ResourceStore> Drop for OutputResourceManager<S> {
    fn drop(&mut self) {
        self.revoke_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn manager() -> (MemoryResourceStore, OutputResourceManager<MemoryResourceStore>) {
        let store = MemoryResourceStore::new();
        (store.clone(), OutputResourceManager::new(store))
    }

    #[test]
    fn test_suggested_filename() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(suggested_filename(at), "merged-2024-03-09-07-05-01.pdf");
    }

    #[test]
    fn test_publish_makes_bytes_available() {
        let (store, mut manager) = manager();
        let url = manager.publish(b"%PDF-1.7".to_vec()).url.clone();

        assert!(store.is_live(&url));
        assert_eq!(store.get(&url).as_deref(), Some(&b"%PDF-1.7"[..]));
        assert_eq!(store.media_type(&url).as_deref(), Some(PDF_MEDIA_TYPE));
        assert_eq!(manager.current().map(|r| r.size_bytes), Some(8));
    }

    #[test]
    fn test_second_publish_revokes_exactly_the_first() {
        let (store, mut manager) = manager();
        let first = manager.publish(vec![1]).url.clone();
        let second = manager.publish(vec![2]).url.clone();

        assert_ne!(first, second);
        assert!(!store.is_live(&first));
        assert!(store.is_live(&second));
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn test_revoke_current_is_idempotent() {
        let (store, mut manager) = manager();
        manager.revoke_current();
        manager.publish(vec![1]);
        manager.revoke_current();
        manager.revoke_current();

        assert!(manager.current().is_none());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_drop_revokes_live_resource() {
        let (store, mut manager) = manager();
        let url = manager.publish(vec![1, 2, 3]).url.clone();
        drop(manager);

        assert!(!store.is_live(&url));
        assert_eq!(store.live_count(), 0);
    }
}
