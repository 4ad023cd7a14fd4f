use crate::collection::Document;
use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::filter::{Predicate, QueryEngine};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identity of one reactive index registration.
///
/// Registering the same query twice yields two ids and two independent
/// indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReactiveIndexId(u64);

impl ReactiveIndexId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A live query result.
///
/// Every clone observes the same list. The owning collection replaces the
/// list's contents whenever documents are inserted, mutated or deleted, so a
/// handle obtained once stays current.
#[derive(Clone)]
pub struct ReactiveIndex {
    id: ReactiveIndexId,
    query: Arc<Vec<Predicate>>,
    results: Atomic<Vec<Document>>,
}

impl ReactiveIndex {
    pub fn id(&self) -> ReactiveIndexId {
        self.id
    }

    /// The registered query, with every predicate marked reactive.
    pub fn query(&self) -> &[Predicate] {
        &self.query
    }

    /// Snapshot of the current results.
    pub fn documents(&self) -> Vec<Document> {
        self.results.read_with(|docs| docs.clone())
    }

    /// Ids of the current results, in result order.
    pub fn ids(&self) -> Vec<String> {
        self.results
            .read_with(|docs| docs.iter().map(|d| d.id().to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.results.read_with(|docs| docs.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn replace(&self, documents: Vec<Document>) {
        self.results.write_with(|docs| *docs = documents);
    }
}

impl Debug for ReactiveIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveIndex")
            .field("id", &self.id)
            .field("results", &self.ids())
            .finish()
    }
}

/// The reactive indexes of one collection.
#[derive(Default)]
pub(crate) struct ReactiveIndexManager {
    next_id: AtomicU64,
    entries: RwLock<IndexMap<ReactiveIndexId, ReactiveIndex>>,
}

impl ReactiveIndexManager {
    pub fn new() -> Self {
        ReactiveIndexManager::default()
    }

    /// Runs the query once over `documents` and keeps the result live.
    pub fn register(
        &self,
        engine: &QueryEngine,
        query: &[Predicate],
        documents: Vec<Document>,
    ) -> ReactiveIndex {
        let query: Vec<Predicate> = query.iter().map(Predicate::as_reactive).collect();
        let results = engine.run(&query, documents);
        let id = ReactiveIndexId(self.next_id.fetch_add(1, Ordering::SeqCst));

        let index = ReactiveIndex {
            id,
            query: Arc::new(query),
            results: atomic(results),
        };
        self.entries.write_with(|entries| entries.insert(id, index.clone()));
        log::debug!("Registered reactive index {} with {} documents", id.0, index.len());
        index
    }

    pub fn get(&self, id: ReactiveIndexId) -> Option<ReactiveIndex> {
        self.entries.read_with(|entries| entries.get(&id).cloned())
    }

    /// Re-runs one index over `documents`, returns its new size.
    pub fn refresh(
        &self,
        id: ReactiveIndexId,
        engine: &QueryEngine,
        documents: Vec<Document>,
    ) -> Option<usize> {
        let index = self.get(id)?;
        let results = engine.run(index.query(), documents);
        let size = results.len();
        index.replace(results);
        Some(size)
    }

    /// Re-runs every index over `documents`, returns each id with its new size.
    pub fn refresh_all(
        &self,
        engine: &QueryEngine,
        documents: &[Document],
    ) -> Vec<(ReactiveIndexId, usize)> {
        let indexes: Vec<ReactiveIndex> =
            self.entries.read_with(|entries| entries.values().cloned().collect());

        indexes
            .into_iter()
            .map(|index| {
                let results = engine.run(index.query(), documents.to_vec());
                let size = results.len();
                index.replace(results);
                (index.id(), size)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read_with(|entries| entries.len())
    }

    pub fn clear(&self) {
        self.entries.write_with(|entries| entries.clear());
    }
}
