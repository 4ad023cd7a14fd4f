use crate::collection::Document;
use crate::common::Data;
use std::ops::Deref;
use std::sync::Arc;

/// Where the data of stored documents lives.
///
/// A stored document never keeps its data itself, every read goes through
/// [StorageProvider::load] and every write through [StorageProvider::save].
/// Providers are keyed by the document's collection name and id.
pub trait StorageProvider: Send + Sync {
    /// Persists `data` for `document`, returns `false` when it was rejected.
    fn save(&self, document: &Document, data: Data) -> bool;

    /// Returns the data of `document`, an empty map when nothing was saved.
    fn load(&self, document: &Document) -> Data;

    fn delete(&self, document: &Document);
}

/// Shared handle to a [StorageProvider].
#[derive(Clone)]
pub struct Storage {
    inner: Arc<dyn StorageProvider>,
}

impl Storage {
    pub fn new<T: StorageProvider + 'static>(provider: T) -> Self {
        Storage {
            inner: Arc::new(provider),
        }
    }
}

impl Deref for Storage {
    type Target = Arc<dyn StorageProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
