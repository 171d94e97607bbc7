use crate::error::EventBusError;
use crate::listener::Listener;
use crate::stream::EventStream;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

/// Listener count per topic above which the bus warns about a likely leak.
const DEFAULT_MAX_LISTENERS: usize = 100;
const MIN_CAPACITY: usize = 1;

/// Tunables for an [`EventBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Warn once a single topic holds more listeners than this. `0` disables the check.
    pub max_listeners: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { max_listeners: DEFAULT_MAX_LISTENERS }
    }
}

#[derive(Debug)]
struct Registration {
    id: u64,
    listener: Listener,
    once: bool,
    claimed: AtomicBool,
}

impl Registration {
    /// Durable listeners always pass; a once listener passes exactly one time.
    fn claim(&self) -> bool {
        !self.once || !self.claimed.swap(true, Ordering::AcqRel)
    }

    fn is_spent(&self) -> bool {
        self.once && self.claimed.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
struct Registry {
    topics: RwLock<FxHashMap<String, Vec<Arc<Registration>>>>,
    next_id: AtomicU64,
    config: EventBusConfig,
}

impl Registry {
    fn remove(&self, event: &str, id: u64) -> bool {
        let mut topics = self.topics.write();
        let Some(list) = topics.get_mut(event) else {
            return false;
        };
        let Some(index) = list.iter().position(|r| r.id == id) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            topics.remove(event);
            trace!(event, "Topic pruned");
        }
        true
    }
}

/// A synchronous publish/subscribe dispatcher keyed by event name.
///
/// Cloning is cheap and every clone talks to the same registry. No lock is
/// held while listeners run, so a listener may freely call back into the bus.
///
/// # Example
///
/// ```rust
/// use accelade_event_bus::{EventBus, Listener};
/// use serde_json::json;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let bus = EventBus::new();
/// let hits = Arc::new(AtomicUsize::new(0));
///
/// let counter = hits.clone();
/// let subscription = bus.on("toast", Listener::new(move |_| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// assert_eq!(bus.emit("toast", &json!({ "message": "Saved" })), 1);
/// subscription.unsubscribe();
/// assert_eq!(bus.emit("toast", &json!(null)), 0);
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
}

impl EventBus {
    /// Creates a new, empty `EventBus` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty `EventBus` with the given settings.
    #[must_use]
    pub fn with_config(config: EventBusConfig) -> Self {
        Self { registry: Arc::new(Registry { config, ..Registry::default() }) }
    }

    /// Registers a durable listener for `event`.
    pub fn on(&self, event: &str, listener: Listener) -> Subscription {
        self.register(event, listener, false)
    }

    /// Registers a listener that is removed after its first invocation.
    pub fn once(&self, event: &str, listener: Listener) -> Subscription {
        self.register(event, listener, true)
    }

    /// Removes the first registration for `event` whose callback is `listener`.
    ///
    /// Returns `false` if nothing matched.
    pub fn off(&self, event: &str, listener: &Listener) -> bool {
        let id = {
            let topics = self.registry.topics.read();
            topics
                .get(event)
                .and_then(|list| list.iter().find(|r| r.listener.ptr_eq(listener)))
                .map(|r| r.id)
        };
        id.is_some_and(|id| self.registry.remove(event, id))
    }

    /// Calls every listener registered for `event`, in registration order.
    ///
    /// Iterates over a snapshot taken up front: listeners added during the emit
    /// wait for the next one, listeners removed during the emit still get this
    /// call. A failing or panicking listener is logged and skipped over.
    ///
    /// Returns how many listeners were invoked.
    pub fn emit(&self, event: &str, data: &Value) -> usize {
        let snapshot = match self.registry.topics.read().get(event) {
            Some(list) => list.clone(),
            None => {
                trace!(event, "Event dropped: no listeners");
                return 0;
            },
        };

        let mut invoked = 0;
        for registration in snapshot {
            if !registration.claim() {
                continue;
            }
            if registration.once {
                self.registry.remove(event, registration.id);
            }
            registration.listener.dispatch(event, data);
            invoked += 1;
        }

        trace!(event, invoked, "Event dispatched");
        invoked
    }

    /// Removes every listener of `event`, or of all events when `None`.
    ///
    /// Returns the number of listeners removed.
    pub fn clear(&self, event: Option<&str>) -> usize {
        let removed = {
            let mut topics = self.registry.topics.write();
            match event {
                Some(event) => topics.remove(event).map_or(0, |list| list.len()),
                None => topics.drain().map(|(_, list)| list.len()).sum(),
            }
        };
        debug!(event = event.unwrap_or("*"), removed, "Listeners cleared");
        removed
    }

    #[must_use]
    pub fn has_listeners(&self, event: &str) -> bool {
        self.listener_count(event) > 0
    }

    /// Number of live registrations for `event`, not counting spent once listeners.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.registry
            .topics
            .read()
            .get(event)
            .map_or(0, |list| list.iter().filter(|r| !r.is_spent()).count())
    }

    /// Names of all topics that currently have listeners, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.topics.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Forwards every emit of `event` into a bounded broadcast channel.
    ///
    /// The stream ends when its listener is removed, e.g. by [`EventBus::clear`].
    /// Dropping the stream unsubscribes it.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    /// ```rust
    /// use accelade_event_bus::EventBus;
    /// use serde_json::json;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), accelade_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// let mut stream = bus.stream("notify", 16)?;
    /// bus.emit("notify", &json!("hello"));
    /// assert_eq!(*stream.recv().await.unwrap(), json!("hello"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn stream(&self, event: &str, capacity: usize) -> Result<EventStream, EventBusError> {
        let capacity = validate_capacity(capacity)?;
        let (tx, rx) = broadcast::channel::<Arc<Value>>(capacity);
        let listener = Listener::new(move |data| {
            if tx.send(Arc::new(data.clone())).is_err() {
                trace!("Stream payload dropped: receiver gone");
            }
        });
        let subscription = self.on(event, listener);
        Ok(EventStream::new(rx, subscription))
    }

    fn register(&self, event: &str, listener: Listener, once: bool) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let registration =
            Arc::new(Registration { id, listener, once, claimed: AtomicBool::new(false) });

        let count = {
            let mut topics = self.registry.topics.write();
            let list = topics.entry(event.to_owned()).or_default();
            list.push(registration);
            list.len()
        };

        let max_listeners = self.registry.config.max_listeners;
        if max_listeners > 0 && count == max_listeners + 1 {
            warn!(event, count, max_listeners, "Possible listener leak: topic exceeds max_listeners");
        }
        trace!(event, id, once, "Listener registered");

        Subscription { registry: Arc::downgrade(&self.registry), event: event.to_owned(), id }
    }
}

/// Handle returned by [`EventBus::on`] and [`EventBus::once`].
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<Registry>,
    event: String,
    id: u64,
}

impl Subscription {
    /// Removes exactly this registration and prunes the topic if it is now empty.
    ///
    /// Returns `false` if the listener was already gone (fired once, cleared,
    /// or the bus was dropped).
    pub fn unsubscribe(self) -> bool {
        self.registry.upgrade().is_some_and(|registry| registry.remove(&self.event, self.id))
    }

    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Whether the registration is still held by the bus.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry.upgrade().is_some_and(|registry| {
            registry
                .topics
                .read()
                .get(&self.event)
                .is_some_and(|list| list.iter().any(|r| r.id == self.id && !r.is_spent()))
        })
    }
}

fn validate_capacity(capacity: usize) -> Result<usize, EventBusError> {
    if capacity < MIN_CAPACITY {
        return Err(EventBusError::InvalidCapacity {
            message: format!("capacity must be >= {MIN_CAPACITY}").into(),
            context: None,
        });
    }
    Ok(capacity)
}
