//! Persistence adapter abstractions.
//!
//! The editor treats its backend as two external collaborators: a
//! document store (template/invitation JSON documents) and an asset
//! store (uploaded images, animation payloads, generated thumbnails).
//! Network transports live behind these traits; the in-memory
//! implementations back the test suite.

mod memory;

pub use memory::{MemoryAssetStore, MemoryTemplateStore};

use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Options attached to an asset upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
}

impl UploadOptions {
    pub fn png_immutable() -> Self {
        Self {
            content_type: Some("image/png".to_string()),
            cache_control: Some("public, max-age=31536000, immutable".to_string()),
        }
    }
}

/// Document store for templates and invitations.
///
/// Documents are raw JSON values: the codec owns the shape, the store
/// owns transport and the server-assigned timestamps (`createdAt` /
/// `updatedAt`).
pub trait TemplateStore: Send + Sync {
    /// Load a document. `StorageError::NotFound` when the id does not
    /// resolve.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Value>>;

    /// Save a document. With `merge` set, top-level members of
    /// `payload` are merged over the existing document; otherwise the
    /// document is replaced wholesale.
    fn save(&self, id: &str, payload: Value, merge: bool) -> BoxFuture<'_, StorageResult<()>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;

    /// Delete a document.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Maintain the tag registry: each tag is keyed by its lowercased
    /// text, keeps the first-seen spelling as title, and counts usage.
    fn upsert_tags(&self, tags: &[String]) -> BoxFuture<'_, StorageResult<()>>;
}

/// Minimal blocking executor for storage futures.
///
/// The in-memory backends never actually suspend, so a no-op waker is
/// enough; test suites and synchronous callers use this instead of
/// pulling in a runtime.
pub fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    // SAFETY: the vtable functions are all no-ops on a null pointer.
    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}

/// Binary asset store (backgrounds, animation payloads, thumbnails).
pub trait AssetStore: Send + Sync {
    /// Upload bytes under a storage path and return the public URL.
    fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        options: UploadOptions,
    ) -> BoxFuture<'_, StorageResult<String>>;

    /// Download the bytes behind a previously returned URL.
    fn download(&self, url: &str) -> BoxFuture<'_, StorageResult<Vec<u8>>>;
}
