use crate::common::LIVEDOC_EVENT;
use crate::errors::{ErrorKind, LiveDocError, LiveDocResult};
use basu::error::BasuError;
use basu::event::Event;
use basu::{EventBus, Handle, HandlerId};
use std::marker::PhantomData;
use std::sync::Arc;

/// Publishes store events to registered listeners.
///
/// A thin wrapper over a [basu] event bus with a single event type. Clones
/// share the same listener registry, so a bus handed to every collection of
/// a store reaches every listener of that store.
///
/// ```ignore
/// let bus: LiveDocEventBus<EventInfo, EventListener> = LiveDocEventBus::new();
/// let subscriber = bus.register(listener)?;
/// bus.publish(event)?;
/// bus.deregister(subscriber)?;
/// ```
pub struct LiveDocEventBus<E, L> {
    inner: Arc<LiveDocEventBusInner<E, L>>,
}

impl<E, L> Clone for LiveDocEventBus<E, L> {
    fn clone(&self) -> Self {
        LiveDocEventBus {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E, L> Default for LiveDocEventBus<E, L>
where
    L: Handle<E> + 'static,
    E: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, L> LiveDocEventBus<E, L>
where
    L: Handle<E> + 'static,
    E: Send + Sync,
{
    pub fn new() -> Self {
        LiveDocEventBus {
            inner: Arc::new(LiveDocEventBusInner::new()),
        }
    }

    /// Registers a listener, the returned reference deregisters it again.
    pub fn register(&self, listener: L) -> LiveDocResult<SubscriberRef> {
        self.inner.register(listener)
    }

    pub fn deregister(&self, subscriber: SubscriberRef) -> LiveDocResult<()> {
        self.inner.deregister(subscriber)
    }

    /// Publishes an event to all registered listeners.
    pub fn publish(&self, event: E) -> LiveDocResult<()> {
        self.inner.publish(event)
    }

    pub fn close(&self) -> LiveDocResult<()> {
        self.inner.close()
    }

    pub fn has_listeners(&self) -> bool {
        self.inner.has_listeners()
    }
}

/// Handle of a registered listener.
pub struct SubscriberRef {
    pub(crate) inner: HandlerId,
}

impl SubscriberRef {
    pub fn new(inner: HandlerId) -> Self {
        SubscriberRef { inner }
    }
}

struct LiveDocEventBusInner<E, L> {
    event_bus: EventBus<E>,
    phantom_data: PhantomData<L>,
}

impl<E, L> LiveDocEventBusInner<E, L>
where
    L: Handle<E> + 'static,
    E: Send + Sync,
{
    fn new() -> Self {
        LiveDocEventBusInner {
            event_bus: EventBus::new(),
            phantom_data: PhantomData,
        }
    }

    fn register(&self, listener: L) -> LiveDocResult<SubscriberRef> {
        match self.event_bus.subscribe(LIVEDOC_EVENT, Box::new(listener)) {
            Ok(subscriber) => Ok(SubscriberRef::new(subscriber)),
            Err(e) => Err(Self::livedoc_error(e)),
        }
    }

    #[inline]
    fn deregister(&self, subscriber: SubscriberRef) -> LiveDocResult<()> {
        match self.event_bus.unsubscribe(LIVEDOC_EVENT, &subscriber.inner) {
            Ok(_) => Ok(()),
            Err(e) => Err(Self::livedoc_error(e)),
        }
    }

    #[inline]
    fn publish(&self, event: E) -> LiveDocResult<()> {
        // no listener registered yet, nothing to wrap or dispatch
        let handler_count = match self.event_bus.get_handler_count(LIVEDOC_EVENT) {
            Ok(count) => count,
            Err(BasuError::EventTypeNotFOUND) => return Ok(()),
            Err(e) => return Err(Self::livedoc_error(e)),
        };

        if handler_count == 0 {
            return Ok(());
        }

        let basu_event = Event::new(event);
        match self.event_bus.publish(LIVEDOC_EVENT, &basu_event) {
            Ok(_) => Ok(()),
            Err(e) => Err(Self::livedoc_error(e)),
        }
    }

    #[inline]
    fn close(&self) -> LiveDocResult<()> {
        match self.event_bus.clear() {
            Ok(_) => Ok(()),
            Err(e) => Err(Self::livedoc_error(e)),
        }
    }

    #[inline]
    fn has_listeners(&self) -> bool {
        match self.event_bus.get_handler_count(LIVEDOC_EVENT) {
            Ok(count) => count > 0,
            Err(BasuError::EventTypeNotFOUND) => false,
            Err(e) => {
                log::warn!("Failed to check listeners: {}, defaulting to false", e);
                false
            }
        }
    }

    fn livedoc_error(e: BasuError) -> LiveDocError {
        match e {
            BasuError::EventTypeNotFOUND => LiveDocError::new(
                "Event bus error: no listener was ever registered for store events",
                ErrorKind::EventError,
            ),
            BasuError::MutexPoisoned => LiveDocError::new(
                "Event bus error: internal mutex poisoned",
                ErrorKind::EventError,
            ),
            BasuError::HandlerError(e) => LiveDocError::new(
                &format!("Event handler error: {}", e),
                ErrorKind::EventError,
            ),
        }
    }
}
