use crate::collection::{notify, Document, InsertOptions, StoreEventBus, StoreEventInfo, StoreEvents};
use crate::common::{detach_data, Data, ReadExecutor, WriteExecutor};
use crate::errors::{ErrorKind, LiveDocError, LiveDocResult};
use crate::filter::{Predicate, QueryEngine};
use crate::index::{ReactiveIndex, ReactiveIndexId, ReactiveIndexManager};
use crate::livedoc::Catalog;
use crate::livedoc_config::LiveDocConfig;
use crate::populate;
use parking_lot::{Mutex, RwLock};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// A named, ordered set of documents sharing one schema.
///
/// The schema maps every queryable key to its default value. New documents
/// start from these defaults overlaid with their own data, and predicates on
/// keys the schema does not know are skipped by [Collection::find].
///
/// `Collection` is a cheap handle, all clones share the same state.
///
/// ```rust,ignore
/// let users = db.create_collection("users", data! { name: "", age: 0 })?;
/// users.insert(data! { name: "Ann", age: 30 })?;
///
/// let adults = users.find(&[field("age").gte(18)]);
/// let live = users.find_reactive(&[field("age").gte(18)]);
/// ```
#[derive(Clone)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

pub(crate) struct CollectionInner {
    name: String,
    schema: Data,
    config: LiveDocConfig,
    documents: RwLock<Vec<Document>>,
    reactive: ReactiveIndexManager,
    refresh_lock: Mutex<()>,
    closed: AtomicBool,
    event_bus: StoreEventBus,
    catalog: Weak<Catalog>,
}

impl Collection {
    pub(crate) fn new(
        name: &str,
        schema: Data,
        config: LiveDocConfig,
        event_bus: StoreEventBus,
        catalog: Weak<Catalog>,
    ) -> Collection {
        Collection {
            inner: Arc::new(CollectionInner {
                name: name.to_string(),
                schema,
                config,
                documents: RwLock::new(Vec::new()),
                reactive: ReactiveIndexManager::new(),
                refresh_lock: Mutex::new(()),
                closed: AtomicBool::new(false),
                event_bus,
                catalog,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<CollectionInner>) -> Collection {
        Collection { inner }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn schema(&self) -> &Data {
        &self.inner.schema
    }

    /// Number of documents.
    pub fn size(&self) -> usize {
        self.inner.documents.read_with(|docs| docs.len())
    }

    /// All documents in insertion order.
    pub fn documents(&self) -> Vec<Document> {
        self.inner.documents.read_with(|docs| docs.clone())
    }

    pub fn by_id(&self, id: &str) -> Option<Document> {
        self.inner
            .documents
            .read_with(|docs| docs.iter().find(|doc| doc.id() == id).cloned())
    }

    /// Runs a query over all documents of the collection.
    ///
    /// Accepts a predicate list or a [crate::filter::QueryBuilder].
    pub fn find(&self, query: impl AsRef<[Predicate]>) -> Vec<Document> {
        let query = query.as_ref();
        self.notify(StoreEventInfo::new(StoreEvents::Find, self.name()));

        let result = self.engine().run(query, self.documents());
        log::debug!(
            "Query with {} predicates on {} matched {} documents",
            query.len(),
            self.name(),
            result.len()
        );

        self.notify(StoreEventInfo::with_count(StoreEvents::FindComplete, self.name(), result.len()));
        result
    }

    /// Runs a query and keeps its result up to date.
    ///
    /// The returned handle is refreshed after inserts, deletes and, once the
    /// refresh window has passed, after document writes.
    pub fn find_reactive(&self, query: impl AsRef<[Predicate]>) -> ReactiveIndex {
        self.inner
            .reactive
            .register(&self.engine(), query.as_ref(), self.documents())
    }

    /// Looks a reactive index up by the id it was registered with.
    pub fn reactive_index(&self, id: ReactiveIndexId) -> Option<ReactiveIndex> {
        self.inner.reactive.get(id)
    }

    /// Re-runs one reactive index now.
    pub fn refresh_reactive_index(&self, id: ReactiveIndexId) -> LiveDocResult<()> {
        let size = {
            let _guard = self.inner.refresh_lock.lock();
            self.inner.reactive.refresh(id, &self.engine(), self.documents())
        };

        match size {
            Some(size) => {
                self.notify(StoreEventInfo::with_count(StoreEvents::IndexUpdated, self.name(), size));
                Ok(())
            }
            None => {
                log::error!("No reactive index {} in collection {}", id.value(), self.name());
                Err(LiveDocError::new(
                    &format!("No reactive index {} in collection {}", id.value(), self.name()),
                    ErrorKind::InvalidId,
                ))
            }
        }
    }

    /// Re-runs every reactive index of the collection now.
    pub fn refresh_reactive_indexes(&self) {
        let refreshed = {
            // a refresh started later always sees a newer document list
            let _guard = self.inner.refresh_lock.lock();
            let documents = self.documents();
            self.inner.reactive.refresh_all(&self.engine(), &documents)
        };

        for (id, size) in refreshed {
            log::trace!("Reactive index {} of {} holds {} documents", id.value(), self.name(), size);
            self.notify(StoreEventInfo::with_count(StoreEvents::IndexUpdated, self.name(), size));
        }
    }

    pub fn insert(&self, data: Data) -> LiveDocResult<Document> {
        self.insert_with(data, InsertOptions::default())
    }

    /// Inserts a document.
    ///
    /// When a document with the requested id already exists it is returned
    /// unchanged.
    pub fn insert_with(&self, data: Data, options: InsertOptions) -> LiveDocResult<Document> {
        self.notify(StoreEventInfo::new(StoreEvents::Insert, self.name()));

        let id = match options.id {
            Some(id) if id.is_empty() => {
                log::error!("Document id cannot be empty");
                return Err(LiveDocError::new(
                    "Document id cannot be empty",
                    ErrorKind::InvalidId,
                ));
            }
            Some(id) => id,
            None => uuid::Uuid::new_v4().to_string(),
        };

        let document = {
            let mut documents = self.inner.documents.write();
            if self.is_closed() {
                log::error!("Collection {} was closed, cannot insert {}", self.name(), id);
                return Err(LiveDocError::new(
                    &format!("Collection {} was closed, cannot insert {}", self.name(), id),
                    ErrorKind::CollectionNotFound,
                ));
            }
            if let Some(existing) = documents.iter().find(|doc| doc.id() == id) {
                log::debug!("Document {} already exists in {}", id, self.name());
                return Ok(existing.clone());
            }

            let document = Document::stored(
                &id,
                self.name(),
                self.inner.config.storage(),
                Arc::downgrade(&self.inner),
                self.inner.config.refresh_window(),
            );
            let data = detach_data(&data.union(self.inner.schema.clone()));
            if !self.inner.config.storage().save(&document, data) {
                log::error!("Storage rejected new document {} in {}", id, self.name());
                return Err(LiveDocError::new(
                    &format!("Storage rejected new document {} in {}", id, self.name()),
                    ErrorKind::StorageError,
                ));
            }
            documents.push(document.clone());
            document
        };

        if options.reactive_update {
            self.refresh_reactive_indexes();
        }

        self.notify(StoreEventInfo::for_document(StoreEvents::InsertComplete, self.name(), &id));
        Ok(document)
    }

    /// Inserts every entry, refreshing reactive indexes once at the end.
    pub fn insert_many(&self, data: Vec<Data>) -> LiveDocResult<Vec<Document>> {
        let result = data
            .into_iter()
            .map(|data| {
                self.insert_with(
                    data,
                    InsertOptions {
                        id: None,
                        reactive_update: false,
                    },
                )
            })
            .collect::<LiveDocResult<Vec<_>>>();

        self.refresh_reactive_indexes();
        result
    }

    /// Removes a document and refreshes the reactive indexes.
    pub fn delete(&self, document: &Document) -> LiveDocResult<()> {
        if document.is_ghost() {
            log::error!("Ghost document {} cannot be deleted", document.id());
            return Err(LiveDocError::new(
                &format!("Ghost document {} cannot be deleted", document.id()),
                ErrorKind::InvalidOperation,
            ));
        }

        self.notify(StoreEventInfo::for_document(StoreEvents::Delete, self.name(), document.id()));

        let removed = self.inner.documents.write_with(|docs| {
            let position = docs.iter().position(|doc| doc.same_instance(document))?;
            Some(docs.remove(position))
        });

        let Some(removed) = removed else {
            log::error!("Document {} is not part of {}", document.id(), self.name());
            return Err(LiveDocError::new(
                &format!("Document {} is not part of {}", document.id(), self.name()),
                ErrorKind::DocumentDeleted,
            ));
        };

        removed.mark_deleted();
        self.inner.config.storage().delete(&removed);
        self.refresh_reactive_indexes();

        self.notify(StoreEventInfo::for_document(StoreEvents::DeleteComplete, self.name(), document.id()));
        Ok(())
    }

    /// Populates copies of `documents` following a population specification.
    ///
    /// ```rust,ignore
    /// let posts = posts.populate(&posts.documents(), "title, <users>author{ name }", true)?;
    /// ```
    pub fn populate(&self, documents: &[Document], spec: &str, filter_unlisted: bool) -> LiveDocResult<Vec<Document>> {
        self.notify(StoreEventInfo::with_count(StoreEvents::Populate, self.name(), documents.len()));

        let nodes = populate::parse(spec, |name| self.lookup(name))?;
        let result = populate::populate(&nodes, documents, filter_unlisted)?;

        self.notify(StoreEventInfo::with_count(StoreEvents::PopulateComplete, self.name(), result.len()));
        Ok(result)
    }

    /// Removes every document, returns how many were removed.
    pub(crate) fn clear(&self) -> usize {
        self.notify(StoreEventInfo::new(StoreEvents::EmptyCollection, self.name()));

        let removed = self.inner.documents.write_with(std::mem::take);
        let storage = self.inner.config.storage();
        for document in &removed {
            document.mark_deleted();
            storage.delete(document);
        }
        self.refresh_reactive_indexes();

        self.notify(StoreEventInfo::with_count(
            StoreEvents::EmptyCollectionComplete,
            self.name(),
            removed.len(),
        ));
        removed.len()
    }

    /// Whether the collection was dropped or replaced. A closed collection
    /// holds no documents and accepts no inserts.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Removes every document and every reactive index.
    pub(crate) fn close(&self) -> usize {
        self.inner.closed.store(true, Ordering::SeqCst);
        let removed = self.clear();
        self.inner.reactive.clear();
        removed
    }

    pub(crate) fn notify(&self, event: StoreEventInfo) {
        notify(&self.inner.event_bus, event);
    }

    fn engine(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.inner.schema, self.inner.config.dynamic_indexes())
    }

    fn lookup(&self, name: &str) -> Option<Collection> {
        match self.inner.catalog.upgrade() {
            Some(catalog) => catalog.read_with(|collections| collections.get(name).cloned()),
            None if name == self.name() => Some(self.clone()),
            None => None,
        }
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Debug for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name())
            .field("schema", &self.schema())
            .field("size", &self.size())
            .finish()
    }
}
