use crate::collection::Document;
use crate::common::{is_reserved_field, Value};
use crate::filter::Predicate;
use crate::index::{has_wildcard, reserved_value, resolve_document};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Memoized wildcard path resolutions of one document.
///
/// Entries are keyed by the literal path string and are all dropped at once
/// by [IndexCache::invalidate]. Every invalidation starts a new generation, a
/// resolution computed under an older generation is never stored.
#[derive(Default)]
pub(crate) struct IndexCache {
    state: RwLock<CacheState>,
}

#[derive(Default)]
struct CacheState {
    generation: u64,
    entries: HashMap<String, Option<Value>>,
}

impl IndexCache {
    pub fn new() -> Self {
        IndexCache::default()
    }

    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// The cached resolution, the outer `None` meaning a cache miss.
    pub fn get(&self, path: &str) -> Option<Option<Value>> {
        self.state.read().entries.get(path).cloned()
    }

    pub fn put(&self, path: &str, value: Option<Value>, generation: u64) {
        let mut state = self.state.write();
        if state.generation == generation {
            state.entries.insert(path.to_string(), value);
        }
    }

    pub fn invalidate(&self) {
        let mut state = self.state.write();
        state.generation += 1;
        state.entries.clear();
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.state.read().entries.keys().cloned().collect();
        paths.sort();
        paths
    }
}

/// Resolves the predicate's key against the document, through the
/// document's index cache when that is allowed.
///
/// Only wildcard paths are cached, and only when dynamic indexing is enabled
/// or the predicate belongs to a reactive query. Everything else resolves
/// fresh on every call.
pub fn get_or_create(document: &Document, predicate: &Predicate, dynamic_indexes: bool) -> Option<Value> {
    let key = predicate.key();
    if is_reserved_field(key) {
        return reserved_value(document, key);
    }

    if !(dynamic_indexes || predicate.is_reactive()) || !has_wildcard(key) {
        return resolve_document(document, key);
    }

    let cache = document.index_cache();
    if let Some(cached) = cache.get(key) {
        log::trace!("Index cache hit for {} on document {}", key, document.id());
        return cached;
    }

    let generation = cache.generation();
    let resolved = resolve_document(document, key);
    cache.put(key, resolved.clone(), generation);
    resolved
}
