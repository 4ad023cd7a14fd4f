use crate::common::{current_time_millis, LiveDocEventBus};
use crate::errors::LiveDocResult;
use anyhow::Error;
use basu::error::BasuError;
use basu::event::Event;
use basu::Handle;
use std::fmt::Debug;
use std::sync::Arc;

/// The operations a store reports to its listeners.
///
/// Paired variants bracket an operation: the first is published before the
/// work starts, the `*Complete` one after it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvents {
    Find,
    FindComplete,
    Insert,
    InsertComplete,
    Populate,
    PopulateComplete,
    Delete,
    DeleteComplete,
    DocumentUpdated,
    IndexUpdated,
    AddCollection,
    DropCollection,
    EmptyCollection,
    EmptyCollectionComplete,
}

/// Information about one published event.
#[derive(Clone)]
pub struct StoreEventInfo {
    inner: Arc<StoreEventInner>,
}

struct StoreEventInner {
    event_type: StoreEvents,
    collection: String,
    document_id: Option<String>,
    count: Option<usize>,
    timestamp: i64,
}

impl StoreEventInfo {
    pub fn new(event_type: StoreEvents, collection: &str) -> Self {
        StoreEventInfo {
            inner: Arc::new(StoreEventInner {
                event_type,
                collection: collection.to_string(),
                document_id: None,
                count: None,
                timestamp: current_time_millis(),
            }),
        }
    }

    pub(crate) fn for_document(event_type: StoreEvents, collection: &str, id: &str) -> Self {
        StoreEventInfo {
            inner: Arc::new(StoreEventInner {
                event_type,
                collection: collection.to_string(),
                document_id: Some(id.to_string()),
                count: None,
                timestamp: current_time_millis(),
            }),
        }
    }

    pub(crate) fn with_count(event_type: StoreEvents, collection: &str, count: usize) -> Self {
        StoreEventInfo {
            inner: Arc::new(StoreEventInner {
                event_type,
                collection: collection.to_string(),
                document_id: None,
                count: Some(count),
                timestamp: current_time_millis(),
            }),
        }
    }

    pub fn event_type(&self) -> StoreEvents {
        self.inner.event_type
    }

    /// Name of the collection the event happened in.
    pub fn collection(&self) -> &str {
        &self.inner.collection
    }

    /// Id of the affected document, for single document events.
    pub fn document_id(&self) -> Option<&str> {
        self.inner.document_id.as_deref()
    }

    /// Number of affected documents, for set producing events.
    pub fn count(&self) -> Option<usize> {
        self.inner.count
    }

    /// Milliseconds since the unix epoch when the event was created.
    pub fn timestamp(&self) -> i64 {
        self.inner.timestamp
    }
}

impl Debug for StoreEventInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreEventInfo")
            .field("event_type", &self.event_type())
            .field("collection", &self.collection())
            .field("document_id", &self.document_id())
            .field("count", &self.count())
            .field("timestamp", &self.timestamp())
            .finish()
    }
}

pub trait StoreEventCallback: Send + Sync + Fn(StoreEventInfo) -> LiveDocResult<()> {}

impl<F> StoreEventCallback for F where F: Send + Sync + Fn(StoreEventInfo) -> LiveDocResult<()> {}

/// Listener for store events.
///
/// ```ignore
/// db.subscribe(StoreEventListener::new(|event: StoreEventInfo| {
///     println!("{:?} in {}", event.event_type(), event.collection());
///     Ok(())
/// }))?;
/// ```
#[derive(Clone)]
pub struct StoreEventListener {
    on_event: Arc<dyn StoreEventCallback>,
    filter: Option<StoreEvents>,
}

impl StoreEventListener {
    pub fn new(on_event: impl StoreEventCallback + 'static) -> Self {
        StoreEventListener {
            on_event: Arc::new(on_event),
            filter: None,
        }
    }

    /// A listener which only sees events of one type.
    pub fn on(event_type: StoreEvents, on_event: impl StoreEventCallback + 'static) -> Self {
        StoreEventListener {
            on_event: Arc::new(on_event),
            filter: Some(event_type),
        }
    }
}

impl Handle<StoreEventInfo> for StoreEventListener {
    fn handle(&self, event: &Event<StoreEventInfo>) -> Result<(), BasuError> {
        if let Some(filter) = self.filter {
            if filter != event.data.event_type() {
                return Ok(());
            }
        }

        match (self.on_event)(event.data.clone()) {
            Ok(_) => Ok(()),
            Err(e) => Err(BasuError::HandlerError(Error::from(e))),
        }
    }
}

impl Debug for StoreEventListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreEventListener")
            .field("filter", &self.filter)
            .finish()
    }
}

pub(crate) type StoreEventBus = LiveDocEventBus<StoreEventInfo, StoreEventListener>;

/// Publishes without failing the surrounding operation.
pub(crate) fn notify(bus: &StoreEventBus, event: StoreEventInfo) {
    let event_type = event.event_type();
    if let Err(e) = bus.publish(event) {
        log::warn!("Listener failed on {:?} event: {}", event_type, e);
    }
}
