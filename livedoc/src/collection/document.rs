use crate::collection::{Collection, CollectionInner, PopulateOptions, StoreEventInfo, StoreEvents, TreePopulation};
use crate::common::{
    current_time_millis, detach_data, fmt_data, Data, Debouncer, Value, DOC_ID, WILDCARD,
};
use crate::errors::{ErrorKind, LiveDocError, LiveDocResult};
use crate::filter::{Operation, Predicate};
use crate::index::{resolve_document, split_path, IndexCache};
use crate::store::Storage;
use parking_lot::{Mutex, RwLock};
use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// A document of a collection.
///
/// `Document` is a cheap handle, clones refer to the same document. A stored
/// document keeps no data of its own: [Document::data] loads it from the
/// collection's storage provider and every write saves through it, so all
/// handles always see the latest data.
///
/// A ghost, created with [Document::new] or [Document::ghost], owns a private
/// copy of its data and is bound to no storage. Writing to a ghost touches
/// nothing else, which is what population results are made of.
///
/// Two documents are equal when they have the same collection and id.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

struct DocumentInner {
    id: String,
    collection_name: String,
    created_at: i64,
    updated_at: AtomicI64,
    indexes: IndexCache,
    write_lock: Mutex<()>,
    binding: Binding,
}

enum Binding {
    Stored {
        storage: Storage,
        collection: Weak<CollectionInner>,
        deleted: AtomicBool,
        settled: Debouncer,
    },
    Ghost {
        data: RwLock<Data>,
    },
}

impl Document {
    /// Creates a free standing ghost document.
    pub fn new(id: &str, data: Data) -> Document {
        let now = current_time_millis();
        Document::ghost_of(id, "", now, now, data)
    }

    pub(crate) fn stored(
        id: &str,
        collection_name: &str,
        storage: Storage,
        collection: Weak<CollectionInner>,
        refresh_window: Duration,
    ) -> Document {
        let now = current_time_millis();
        Document {
            inner: Arc::new(DocumentInner {
                id: id.to_string(),
                collection_name: collection_name.to_string(),
                created_at: now,
                updated_at: AtomicI64::new(now),
                indexes: IndexCache::new(),
                write_lock: Mutex::new(()),
                binding: Binding::Stored {
                    storage,
                    collection,
                    deleted: AtomicBool::new(false),
                    settled: Debouncer::new(refresh_window),
                },
            }),
        }
    }

    fn ghost_of(id: &str, collection_name: &str, created_at: i64, updated_at: i64, data: Data) -> Document {
        Document {
            inner: Arc::new(DocumentInner {
                id: id.to_string(),
                collection_name: collection_name.to_string(),
                created_at,
                updated_at: AtomicI64::new(updated_at),
                indexes: IndexCache::new(),
                write_lock: Mutex::new(()),
                binding: Binding::Ghost {
                    data: RwLock::new(data),
                },
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Name of the owning collection, empty for documents created with
    /// [Document::new].
    pub fn collection_name(&self) -> &str {
        &self.inner.collection_name
    }

    /// Creation time in milliseconds since the unix epoch.
    pub fn created_at(&self) -> i64 {
        self.inner.created_at
    }

    /// Time of the last data write in milliseconds since the unix epoch.
    pub fn updated_at(&self) -> i64 {
        self.inner.updated_at.load(Ordering::SeqCst)
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self.inner.binding, Binding::Ghost { .. })
    }

    /// Whether the document was removed from its collection.
    pub fn is_deleted(&self) -> bool {
        match &self.inner.binding {
            Binding::Stored { deleted, .. } => deleted.load(Ordering::SeqCst),
            Binding::Ghost { .. } => false,
        }
    }

    /// Current data, empty once a stored document was deleted.
    pub fn data(&self) -> Data {
        match &self.inner.binding {
            Binding::Stored { deleted, .. } if deleted.load(Ordering::SeqCst) => Data::default(),
            Binding::Stored { storage, .. } => storage.load(self),
            Binding::Ghost { data } => data.read().clone(),
        }
    }

    /// Resolves a dotted path, see [crate::index::resolve].
    pub fn get(&self, path: &str) -> Option<Value> {
        resolve_document(self, path)
    }

    /// Writes `value` at a dotted path, creating missing intermediate objects.
    ///
    /// ```rust,ignore
    /// doc.set("address.city", "Oslo")?;
    /// ```
    pub fn set<T: Into<Value>>(&self, path: &str, value: T) -> LiveDocResult<()> {
        let segments = split_path(path);
        let value = value.into();
        self.update(|current| put_path(current, &segments, value))
    }

    /// Replaces the whole data of the document.
    ///
    /// Stored documents save through their storage provider, publish a
    /// [StoreEvents::DocumentUpdated] event and schedule a refresh of the
    /// collection's reactive indexes once writes settle. Documents nested in
    /// the data are saved as ghost copies.
    pub fn set_data(&self, data: Data) -> LiveDocResult<()> {
        self.update(|_| Ok(data))
    }

    /// Computes new data from the current data and writes it. Concurrent
    /// updates of one document never interleave.
    fn update<F>(&self, update: F) -> LiveDocResult<()>
    where
        F: FnOnce(&Data) -> LiveDocResult<Data>,
    {
        {
            let _guard = self.inner.write_lock.lock();
            if self.is_deleted() {
                log::error!("Document {} was deleted and cannot be modified", self.id());
                return Err(LiveDocError::new(
                    &format!("Document {} was deleted and cannot be modified", self.id()),
                    ErrorKind::DocumentDeleted,
                ));
            }

            // live handles are never kept, only copies of their data
            let data = detach_data(&update(&self.data())?);
            match &self.inner.binding {
                Binding::Stored { storage, .. } => {
                    if !storage.save(self, data) {
                        log::error!("Storage rejected data of document {}", self.id());
                        return Err(LiveDocError::new(
                            &format!("Storage rejected data of document {}", self.id()),
                            ErrorKind::StorageError,
                        ));
                    }
                }
                Binding::Ghost { data: current } => *current.write() = data,
            }
            self.touch();
        }

        if let Binding::Stored { collection, settled, .. } = &self.inner.binding {
            if let Some(inner) = collection.upgrade() {
                let owner = Collection::from_inner(inner);
                owner.notify(StoreEventInfo::for_document(
                    StoreEvents::DocumentUpdated,
                    owner.name(),
                    self.id(),
                ));

                let weak = collection.clone();
                settled.call(move || {
                    if let Some(inner) = weak.upgrade() {
                        Collection::from_inner(inner).refresh_reactive_indexes();
                    }
                });
            }
        }
        Ok(())
    }

    /// A detached deep copy with the same id and timestamps.
    pub fn ghost(&self) -> Document {
        Document::ghost_of(
            self.id(),
            self.collection_name(),
            self.created_at(),
            self.updated_at(),
            detach_data(&self.data()),
        )
    }

    /// Removes the document from its collection.
    pub fn delete(&self) -> LiveDocResult<()> {
        match &self.inner.binding {
            Binding::Stored { collection, .. } => match collection.upgrade() {
                Some(inner) => Collection::from_inner(inner).delete(self),
                None => {
                    log::error!("Collection of document {} no longer exists", self.id());
                    Err(LiveDocError::new(
                        &format!("Collection of document {} no longer exists", self.id()),
                        ErrorKind::DocumentDeleted,
                    ))
                }
            },
            Binding::Ghost { .. } => {
                log::error!("Ghost document {} cannot be deleted", self.id());
                Err(LiveDocError::new(
                    &format!("Ghost document {} cannot be deleted", self.id()),
                    ErrorKind::InvalidOperation,
                ))
            }
        }
    }

    /// Wildcard paths currently memoized for this document.
    pub fn indexed_paths(&self) -> Vec<String> {
        self.inner.indexes.paths()
    }

    /// A ghost copy whose destination field holds the matching documents of
    /// another collection.
    ///
    /// Without an explicit query the target collection is searched for
    /// documents whose target field equals this document's source field.
    ///
    /// ```rust,ignore
    /// let user = users.by_id("u1").unwrap();
    /// let with_posts = user.populate_with(
    ///     PopulateOptions::new("id", &posts).target_field("authorId").destination_field("posts"),
    /// )?;
    /// ```
    pub fn populate_with(&self, options: PopulateOptions) -> LiveDocResult<Document> {
        let target = options.target();
        target.notify(StoreEventInfo::for_document(StoreEvents::Populate, target.name(), self.id()));

        let query = match options.get_query() {
            Some(query) => query.to_vec(),
            None => vec![Predicate::new(
                options.get_target_field(),
                Operation::Eq,
                self.source_value(options.src_field()),
            )],
        };

        let found = target.find(&query);
        log::debug!(
            "Populating {} of document {} with {} documents from {}",
            options.get_destination_field(),
            self.id(),
            found.len(),
            target.name()
        );

        let value = if options.is_unwind() && found.len() < 2 {
            found.first().map(|doc| Value::Document(doc.ghost())).unwrap_or_default()
        } else {
            Value::Array(found.iter().map(|doc| Value::Document(doc.ghost())).collect())
        };

        let result = self.ghost();
        result.set(options.get_destination_field(), value)?;

        target.notify(StoreEventInfo::with_count(StoreEvents::PopulateComplete, target.name(), found.len()));
        Ok(result)
    }

    /// Builds a tree below this document.
    ///
    /// For every population bound to this document's collection the
    /// documents whose target field equals this document's source field become
    /// its children, each expanded the same way, down to `max_depth` levels.
    /// A `max_depth` of zero adds no children.
    pub fn tree(&self, populations: &[TreePopulation], max_depth: usize) -> LiveDocResult<Document> {
        self.tree_at(populations, max_depth, 1)
    }

    fn tree_at(&self, populations: &[TreePopulation], max_depth: usize, depth: usize) -> LiveDocResult<Document> {
        let node = self.ghost();
        if max_depth == 0 || depth > max_depth {
            return Ok(node);
        }

        for population in populations {
            let collection = population.collection();
            if collection.name() != self.collection_name() {
                continue;
            }

            let query = [Predicate::new(
                population.target_field(),
                Operation::Eq,
                self.source_value(population.src_field()),
            )];
            let children = collection
                .find(&query)
                .iter()
                .map(|child| child.tree_at(populations, max_depth, depth + 1).map(Value::Document))
                .collect::<LiveDocResult<Vec<_>>>()?;

            node.set(population.destination_field(), Value::Array(children))?;
        }
        Ok(node)
    }

    fn source_value(&self, src_field: &str) -> Value {
        if src_field == DOC_ID {
            return Value::String(self.id().to_string());
        }
        self.get(src_field).unwrap_or_default()
    }

    pub(crate) fn index_cache(&self) -> &IndexCache {
        &self.inner.indexes
    }

    /// Whether both handles refer to the very same document instance.
    pub(crate) fn same_instance(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn mark_deleted(&self) {
        if let Binding::Stored { deleted, settled, .. } = &self.inner.binding {
            // waits for a running update so nothing is saved after removal
            let _guard = self.inner.write_lock.lock();
            deleted.store(true, Ordering::SeqCst);
            settled.cancel();
        }
    }

    fn touch(&self) {
        self.inner
            .updated_at
            .store(current_time_millis(), Ordering::SeqCst);
        self.inner.indexes.invalidate();
    }
}

fn put_path(data: &Data, segments: &[&str], value: Value) -> LiveDocResult<Data> {
    let Some((head, rest)) = segments.split_first() else {
        log::error!("Cannot set a value at an empty path");
        return Err(LiveDocError::new(
            "Cannot set a value at an empty path",
            ErrorKind::ValidationError,
        ));
    };

    if head.is_empty() {
        log::error!("Path segments cannot be empty");
        return Err(LiveDocError::new(
            "Path segments cannot be empty",
            ErrorKind::ValidationError,
        ));
    }

    if *head == WILDCARD {
        log::error!("Cannot set a value through a wildcard segment");
        return Err(LiveDocError::new(
            "Cannot set a value through a wildcard segment",
            ErrorKind::InvalidOperation,
        ));
    }

    let mut data = data.clone();
    if rest.is_empty() {
        data.insert(head.to_string(), value);
        return Ok(data);
    }

    let nested = match data.get(*head) {
        None | Some(Value::Null) => Data::new(),
        Some(Value::Object(nested)) => nested.clone(),
        Some(other) => {
            log::error!("Cannot set a field of {} value at {}", other.type_name(), head);
            return Err(LiveDocError::new(
                &format!("Cannot set a field of {} value at {}", other.type_name(), head),
                ErrorKind::InvalidOperation,
            ));
        }
    };

    data.insert(head.to_string(), Value::Object(put_path(&nested, rest, value)?));
    Ok(data)
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.collection_name() == other.collection_name() && self.id() == other.id()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut data = self.data();
        data.insert(DOC_ID.to_string(), Value::String(self.id().to_string()));
        fmt_data(&data, f)
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Document({}/{}) ", self.collection_name(), self.id())?;
        Display::fmt(self, f)
    }
}
