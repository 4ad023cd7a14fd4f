use crate::collection::Document;
use crate::common::Data;
use crate::store::StorageProvider;
use dashmap::DashMap;
use std::sync::Arc;

/// Keeps document data in process memory.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<MemoryStorageInner>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }

    /// Number of documents with saved data.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }
}

#[derive(Default)]
struct MemoryStorageInner {
    entries: DashMap<(String, String), Data>,
}

#[inline]
fn storage_key(document: &Document) -> (String, String) {
    (document.collection_name().to_string(), document.id().to_string())
}

impl StorageProvider for MemoryStorage {
    fn save(&self, document: &Document, data: Data) -> bool {
        self.inner.entries.insert(storage_key(document), data);
        true
    }

    fn load(&self, document: &Document) -> Data {
        self.inner
            .entries
            .get(&storage_key(document))
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn delete(&self, document: &Document) {
        self.inner.entries.remove(&storage_key(document));
    }
}
