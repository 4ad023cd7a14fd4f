use crate::collection::{notify, Collection, Document, StoreEventBus, StoreEventInfo, StoreEventListener, StoreEvents};
use crate::common::{Data, ReadExecutor, SubscriberRef, WriteExecutor};
use crate::errors::{ErrorKind, LiveDocError, LiveDocResult};
use crate::livedoc_builder::LiveDocBuilder;
use crate::livedoc_config::LiveDocConfig;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Collections of a store by name, in creation order.
pub(crate) type Catalog = RwLock<IndexMap<String, Collection>>;

/// An in-process document store.
///
/// `LiveDoc` owns a set of named collections and the event bus they publish
/// on. It is a cheap handle, clones share the same store.
///
/// ```rust,ignore
/// let db = LiveDoc::builder().open()?;
/// let users = db.create_collection("users", data! { name: "", age: 0 })?;
/// let posts = db.create_collection("posts", data! { title: "", author: "" })?;
///
/// let ann = users.insert(data! { name: "Ann", age: 30 })?;
/// posts.insert(data! { title: "Hello", author: (ann.id()) })?;
///
/// let populated = db.populate("posts", &posts.documents(), "title, <users>author{ name }", true)?;
/// ```
#[derive(Clone)]
pub struct LiveDoc {
    inner: Arc<LiveDocInner>,
}

struct LiveDocInner {
    config: LiveDocConfig,
    catalog: Arc<Catalog>,
    event_bus: StoreEventBus,
}

impl LiveDoc {
    pub fn builder() -> LiveDocBuilder {
        LiveDocBuilder::new()
    }

    pub(crate) fn new(config: LiveDocConfig) -> LiveDoc {
        LiveDoc {
            inner: Arc::new(LiveDocInner {
                config,
                catalog: Arc::new(RwLock::new(IndexMap::new())),
                event_bus: StoreEventBus::new(),
            }),
        }
    }

    pub fn name(&self) -> String {
        self.inner.config.name()
    }

    pub fn config(&self) -> LiveDocConfig {
        self.inner.config.clone()
    }

    /// Creates a collection, replacing any collection of the same name.
    ///
    /// A replaced collection is closed first: its documents are removed from
    /// storage and its handles reject further inserts.
    pub fn create_collection(&self, name: &str, schema: Data) -> LiveDocResult<Collection> {
        if name.trim().is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(LiveDocError::new(
                "Collection name cannot be empty",
                ErrorKind::ValidationError,
            ));
        }

        let collection = Collection::new(
            name,
            schema,
            self.inner.config.clone(),
            self.inner.event_bus.clone(),
            Arc::downgrade(&self.inner.catalog),
        );

        // storage is keyed by collection name, so the old one is emptied
        // before the new one becomes reachable
        if let Some(previous) = self.inner.catalog.read_with(|catalog| catalog.get(name).cloned()) {
            let count = previous.close();
            log::debug!("Replaced collection {} holding {} documents", name, count);
        }

        self.inner.catalog.write_with(|catalog| {
            catalog.insert(name.to_string(), collection.clone());
        });

        self.notify(StoreEventInfo::new(StoreEvents::AddCollection, name));
        Ok(collection)
    }

    pub fn collection(&self, name: &str) -> LiveDocResult<Collection> {
        match self.inner.catalog.read_with(|catalog| catalog.get(name).cloned()) {
            Some(collection) => Ok(collection),
            None => {
                log::error!("Collection {} does not exist", name);
                Err(LiveDocError::new(
                    &format!("Collection {} does not exist", name),
                    ErrorKind::CollectionNotFound,
                ))
            }
        }
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.inner.catalog.read_with(|catalog| catalog.contains_key(name))
    }

    /// Names of all collections in creation order.
    pub fn collection_names(&self) -> Vec<String> {
        self.inner
            .catalog
            .read_with(|catalog| catalog.keys().cloned().collect())
    }

    /// Removes a collection with all its documents and reactive indexes.
    pub fn drop_collection(&self, name: &str) -> LiveDocResult<()> {
        let removed = self
            .inner
            .catalog
            .write_with(|catalog| catalog.shift_remove(name));

        let Some(collection) = removed else {
            log::error!("Cannot drop collection {}, it does not exist", name);
            return Err(LiveDocError::new(
                &format!("Cannot drop collection {}, it does not exist", name),
                ErrorKind::CollectionNotFound,
            ));
        };

        let count = collection.close();
        log::debug!("Dropped collection {} with {} documents", name, count);
        self.notify(StoreEventInfo::with_count(StoreEvents::DropCollection, name, count));
        Ok(())
    }

    /// Removes every document of a collection, returns how many were removed.
    pub fn empty_collection(&self, name: &str) -> LiveDocResult<usize> {
        let collection = self.collection(name)?;
        Ok(collection.clear())
    }

    pub fn subscribe(&self, listener: StoreEventListener) -> LiveDocResult<SubscriberRef> {
        self.inner.event_bus.register(listener)
    }

    pub fn unsubscribe(&self, subscriber: SubscriberRef) -> LiveDocResult<()> {
        self.inner.event_bus.deregister(subscriber)
    }

    /// Populates copies of documents of the `root` collection, see
    /// [Collection::populate].
    pub fn populate(
        &self,
        root: &str,
        documents: &[Document],
        spec: &str,
        filter_unlisted: bool,
    ) -> LiveDocResult<Vec<Document>> {
        self.collection(root)?.populate(documents, spec, filter_unlisted)
    }

    fn notify(&self, event: StoreEventInfo) {
        notify(&self.inner.event_bus, event);
    }
}
