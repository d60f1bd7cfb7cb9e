//! In-memory storage implementations.

use super::{AssetStore, BoxFuture, StorageError, StorageResult, TemplateStore, UploadOptions};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Default)]
struct TagEntry {
    title: String,
    usage_count: u64,
}

/// In-memory document store for testing and ephemeral use.
///
/// Stamps `createdAt`/`updatedAt` the way the real backend assigns
/// server timestamps, and counts calls so tests can assert that
/// validation failures perform zero network work.
#[derive(Default)]
pub struct MemoryTemplateStore {
    documents: RwLock<HashMap<String, Value>>,
    tags: RwLock<HashMap<String, TagEntry>>,
    calls: AtomicUsize,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations performed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Usage count for a tag id (lowercased tag text).
    pub fn tag_usage(&self, tag_id: &str) -> u64 {
        self.tags
            .read()
            .ok()
            .and_then(|t| t.get(tag_id).map(|e| e.usage_count))
            .unwrap_or(0)
    }

    /// Display title of a tag: the spelling it was first upserted with.
    pub fn tag_title(&self, tag_id: &str) -> Option<String> {
        self.tags
            .read()
            .ok()
            .and_then(|t| t.get(tag_id).map(|e| e.title.clone()))
    }

    fn bump(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Value>> {
        let id = id.to_string();
        Box::pin(async move {
            self.bump();
            let docs = self
                .documents
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            docs.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn save(&self, id: &str, payload: Value, merge: bool) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.bump();
            let mut docs = self
                .documents
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            let now = Value::from(now_millis());
            let entry = docs.entry(id).or_insert_with(|| Value::Object(Default::default()));
            let existing = entry
                .as_object_mut()
                .ok_or_else(|| StorageError::Serialization("document is not an object".into()))?;
            if !merge {
                existing.clear();
            }
            match payload {
                Value::Object(map) => {
                    for (k, v) in map {
                        existing.insert(k, v);
                    }
                }
                other => {
                    return Err(StorageError::Serialization(format!(
                        "expected object payload, got {}",
                        other
                    )))
                }
            }
            existing.entry("createdAt").or_insert_with(|| now.clone());
            existing.insert("updatedAt".to_string(), now);
            Ok(())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            self.bump();
            let docs = self
                .documents
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(docs.contains_key(&id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.bump();
            let mut docs = self
                .documents
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            docs.remove(&id);
            Ok(())
        })
    }

    fn upsert_tags(&self, tags: &[String]) -> BoxFuture<'_, StorageResult<()>> {
        let tags = tags.to_vec();
        Box::pin(async move {
            self.bump();
            let mut registry = self
                .tags
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            for tag in tags {
                let id = tag.trim().to_lowercase();
                if id.is_empty() {
                    continue;
                }
                let entry = registry.entry(id).or_insert_with(|| TagEntry {
                    title: tag.trim().to_string(),
                    usage_count: 0,
                });
                entry.usage_count += 1;
            }
            Ok(())
        })
    }
}

/// In-memory asset store. Uploaded bytes are addressable by the URL
/// returned from `upload`; `fail_downloads_matching` lets tests force
/// per-URL fetch failures for hydration resilience checks.
#[derive(Default)]
pub struct MemoryAssetStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
    fail_substring: RwLock<Option<String>>,
    fail_upload_substring: RwLock<Option<String>>,
    uploads: AtomicUsize,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of uploads performed so far.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::Relaxed)
    }

    /// Seed an object so `download` can resolve it without an upload.
    pub fn seed(&self, url: &str, bytes: Vec<u8>) {
        if let Ok(mut objects) = self.objects.write() {
            objects.insert(url.to_string(), bytes);
        }
    }

    /// Make `download` fail for any URL containing `needle`.
    pub fn fail_downloads_matching(&self, needle: &str) {
        if let Ok(mut fail) = self.fail_substring.write() {
            *fail = Some(needle.to_string());
        }
    }

    /// Make `upload` fail for any path containing `needle`.
    pub fn fail_uploads_matching(&self, needle: &str) {
        if let Ok(mut fail) = self.fail_upload_substring.write() {
            *fail = Some(needle.to_string());
        }
    }

    fn url_for(path: &str) -> String {
        format!("memory://{}", path)
    }
}

impl AssetStore for MemoryAssetStore {
    fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _options: UploadOptions,
    ) -> BoxFuture<'_, StorageResult<String>> {
        let url = Self::url_for(path);
        let path = path.to_string();
        Box::pin(async move {
            if let Ok(fail) = self.fail_upload_substring.read() {
                if let Some(needle) = fail.as_deref() {
                    if path.contains(needle) {
                        return Err(StorageError::Io(format!("HTTP 403: {}", path)));
                    }
                }
            }
            self.uploads.fetch_add(1, Ordering::Relaxed);
            let mut objects = self
                .objects
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            objects.insert(url.clone(), bytes);
            Ok(url)
        })
    }

    fn download(&self, url: &str) -> BoxFuture<'_, StorageResult<Vec<u8>>> {
        let url = url.to_string();
        Box::pin(async move {
            if let Ok(fail) = self.fail_substring.read() {
                if let Some(needle) = fail.as_deref() {
                    if url.contains(needle) {
                        return Err(StorageError::Io(format!("HTTP 404: {}", url)));
                    }
                }
            }
            let objects = self
                .objects
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            objects
                .get(&url)
                .cloned()
                .ok_or(StorageError::NotFound(url))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;
    use serde_json::json;

    #[test]
    fn test_save_and_load() {
        let store = MemoryTemplateStore::new();
        block_on(store.save("t1", json!({"title": "Hi"}), true)).unwrap();
        let doc = block_on(store.load("t1")).unwrap();
        assert_eq!(doc["title"], json!("Hi"));
        assert!(doc.get("createdAt").is_some());
        assert!(doc.get("updatedAt").is_some());
    }

    #[test]
    fn test_not_found() {
        let store = MemoryTemplateStore::new();
        let result = block_on(store.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_merge_keeps_existing_members() {
        let store = MemoryTemplateStore::new();
        block_on(store.save("t1", json!({"title": "Hi", "tags": ["a"]}), true)).unwrap();
        block_on(store.save("t1", json!({"thumbnailUrl": "u"}), true)).unwrap();
        let doc = block_on(store.load("t1")).unwrap();
        assert_eq!(doc["title"], json!("Hi"));
        assert_eq!(doc["thumbnailUrl"], json!("u"));
    }

    #[test]
    fn test_replace_drops_existing_members() {
        let store = MemoryTemplateStore::new();
        block_on(store.save("t1", json!({"title": "Hi"}), true)).unwrap();
        block_on(store.save("t1", json!({"other": 1}), false)).unwrap();
        let doc = block_on(store.load("t1")).unwrap();
        assert!(doc.get("title").is_none());
    }

    #[test]
    fn test_tag_upsert_counts_usage() {
        let store = MemoryTemplateStore::new();
        block_on(store.upsert_tags(&["Wedding".to_string()])).unwrap();
        block_on(store.upsert_tags(&["wedding".to_string()])).unwrap();
        assert_eq!(store.tag_usage("wedding"), 2);
        // first-seen spelling is what the registry displays
        assert_eq!(store.tag_title("wedding").as_deref(), Some("Wedding"));
    }

    #[test]
    fn test_asset_round_trip() {
        let assets = MemoryAssetStore::new();
        let url = block_on(assets.upload("templates/t1/assets/a.png", vec![1, 2, 3], UploadOptions::default())).unwrap();
        assert_eq!(block_on(assets.download(&url)).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_asset_failure_injection() {
        let assets = MemoryAssetStore::new();
        assets.seed("memory://x/bad.json", vec![1]);
        assets.fail_downloads_matching("bad.json");
        assert!(block_on(assets.download("memory://x/bad.json")).is_err());
    }
}
