use crate::error::{SharedDataError, SharedDataErrorExt};
use crate::path;
use crate::view::SharedView;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, trace};

type ChangeCallback = dyn Fn(&str, &Value, Option<&Value>) + Send + Sync;

#[derive(Clone)]
struct Watcher {
    id: u64,
    callback: Arc<ChangeCallback>,
}

impl Watcher {
    fn dispatch(&self, path: &str, value: &Value, previous: Option<&Value>) {
        if let Err(payload) =
            panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(path, value, previous)))
        {
            error!(
                path,
                watcher = self.id,
                panic = panic_message(payload.as_ref()),
                "Shared data listener panicked"
            );
        }
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher").field("id", &self.id).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Path(String),
    All,
}

/// The internal shared state of a [`SharedData`] instance.
#[derive(Debug, Default)]
pub(crate) struct SharedDataInner {
    tree: RwLock<Map<String, Value>>,
    keyed: RwLock<FxHashMap<String, Vec<Watcher>>>,
    global: RwLock<Vec<Watcher>>,
    next_id: AtomicU64,
}

impl SharedDataInner {
    fn remove(&self, scope: &Scope, id: u64) -> bool {
        match scope {
            Scope::Path(path) => {
                let mut keyed = self.keyed.write();
                let Some(list) = keyed.get_mut(path) else {
                    return false;
                };
                let before = list.len();
                list.retain(|w| w.id != id);
                let removed = list.len() < before;
                if list.is_empty() {
                    keyed.remove(path);
                }
                removed
            },
            Scope::All => {
                let mut global = self.global.write();
                let before = global.len();
                global.retain(|w| w.id != id);
                global.len() < before
            },
        }
    }
}

/// A page-scoped, reactive tree of shared values.
///
/// Values live in a single JSON object and are addressed by dot-separated
/// paths (`"user.profile.name"`). Every [`SharedData::set`] notifies the
/// listeners of that exact path, then the global listeners.
///
/// The handle is reference-counted; clones observe the same tree.
///
/// # Example
///
/// ```rust
/// use accelade_shared::SharedData;
/// use serde_json::json;
///
/// let shared = SharedData::new();
/// shared.set("user.profile.name", "Ada");
///
/// assert_eq!(shared.get("user.profile.name"), Some(json!("Ada")));
/// assert_eq!(shared.get_or("user.profile.email", "n/a"), json!("n/a"));
/// assert!(shared.has("user.profile"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedData {
    pub(crate) inner: Arc<SharedDataInner>,
}

impl SharedData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole tree with `initial`; `None` keeps the current tree.
    ///
    /// This is a cold bootstrap: no listener is notified.
    pub fn init(&self, initial: Option<Map<String, Value>>) {
        let Some(initial) = initial else {
            trace!("Shared data init without payload; keeping current tree");
            return;
        };
        let keys = initial.len();
        *self.inner.tree.write() = initial;
        debug!(keys, "Shared data initialized");
    }

    /// Bootstraps the tree from a raw JSON payload.
    ///
    /// # Errors
    /// Returns [`SharedDataError::Json`] if `raw` is not valid JSON, or
    /// [`SharedDataError::InvalidPayload`] if its root is not an object.
    ///
    /// # Examples
    /// ```rust
    /// use accelade_shared::SharedData;
    ///
    /// let shared = SharedData::new();
    /// shared.init_from_json(r#"{ "app": { "name": "Demo" } }"#).unwrap();
    /// assert!(shared.has("app.name"));
    /// assert!(shared.init_from_json("[1, 2]").is_err());
    /// ```
    pub fn init_from_json(&self, raw: &str) -> Result<(), SharedDataError> {
        let value = serde_json::from_str::<Value>(raw).context("Decoding shared data payload")?;
        match value {
            Value::Object(map) => {
                self.init(Some(map));
                Ok(())
            },
            other => Err(SharedDataError::InvalidPayload {
                message: format!("expected a JSON object at the root, got {}", kind(&other))
                    .into(),
                context: None,
            }),
        }
    }

    /// Returns a copy of the value at `path`, or `None` if any segment is missing.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Value> {
        path::resolve(&self.inner.tree.read(), path).cloned()
    }

    /// Returns a copy of the value at `path`, or `default`.
    pub fn get_or(&self, path: &str, default: impl Into<Value>) -> Value {
        self.get(path).unwrap_or_else(|| default.into())
    }

    /// Reads the value at `path` into `T`.
    ///
    /// # Errors
    /// Returns [`SharedDataError::Json`] if the stored value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, SharedDataError> {
        self.get(path)
            .map(serde_json::from_value::<T>)
            .transpose()
            .context(format!("Reading shared path `{path}`"))
    }

    /// Whether a value (including `null`, `0`, `false` or `""`) is stored at `path`.
    #[must_use]
    pub fn has(&self, path: &str) -> bool {
        path::resolve(&self.inner.tree.read(), path).is_some()
    }

    /// Writes `value` at `path`, creating intermediate objects as needed.
    ///
    /// Intermediate segments that hold a non-object value are overwritten.
    /// Listeners run after the write, with no lock held.
    pub fn set(&self, path: &str, value: impl Into<Value>) {
        let value = value.into();
        let previous = {
            let mut tree = self.inner.tree.write();
            let previous = path::resolve(&tree, path).cloned();
            path::assign(&mut tree, path, value.clone());
            previous
        };
        trace!(path, "Shared data updated");
        self.notify(path, &value, previous.as_ref());
    }

    /// Applies [`SharedData::set`] once per top-level key of `data`.
    ///
    /// Nested objects are replaced wholesale, not deep-merged.
    pub fn merge(&self, data: Map<String, Value>) {
        for (key, value) in data {
            self.set(&key, value);
        }
    }

    /// Calls `callback(path, new, old)` whenever exactly `path` is written.
    pub fn subscribe<F>(&self, path: &str, callback: F) -> Subscription
    where
        F: Fn(&str, &Value, Option<&Value>) + Send + Sync + 'static,
    {
        let watcher = self.watcher(callback);
        let id = watcher.id;
        self.inner.keyed.write().entry(path.to_owned()).or_default().push(watcher);
        trace!(path, id, "Shared data listener registered");
        self.subscription(Scope::Path(path.to_owned()), id)
    }

    /// Calls `callback(path, new, old)` on every write.
    pub fn subscribe_all<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str, &Value, Option<&Value>) + Send + Sync + 'static,
    {
        let watcher = self.watcher(callback);
        let id = watcher.id;
        self.inner.global.write().push(watcher);
        trace!(id, "Global shared data listener registered");
        self.subscription(Scope::All, id)
    }

    /// Shallow copy of the top-level tree.
    #[must_use]
    pub fn all(&self) -> Map<String, Value> {
        self.inner.tree.read().clone()
    }

    /// Top-level keys, in the tree's iteration order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.tree.read().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.tree.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.tree.read().is_empty()
    }

    /// Returns a stateless accessor that forwards every call to this store.
    #[must_use]
    pub fn create_proxy(&self) -> SharedView {
        SharedView::new(self.clone())
    }

    /// Clears the tree and drops every listener.
    pub fn reset(&self) {
        self.inner.tree.write().clear();
        self.inner.keyed.write().clear();
        self.inner.global.write().clear();
        debug!("Shared data reset");
    }

    pub(crate) fn with_tree<R>(&self, f: impl FnOnce(&Map<String, Value>) -> R) -> R {
        f(&self.inner.tree.read())
    }

    fn notify(&self, path: &str, value: &Value, previous: Option<&Value>) {
        let keyed = self.inner.keyed.read().get(path).cloned().unwrap_or_default();
        let global = self.inner.global.read().clone();

        for watcher in keyed.iter().chain(&global) {
            watcher.dispatch(path, value, previous);
        }
    }

    fn watcher<F>(&self, callback: F) -> Watcher
    where
        F: Fn(&str, &Value, Option<&Value>) + Send + Sync + 'static,
    {
        Watcher { id: self.inner.next_id.fetch_add(1, Ordering::Relaxed), callback: Arc::new(callback) }
    }

    fn subscription(&self, scope: Scope, id: u64) -> Subscription {
        Subscription { inner: Arc::downgrade(&self.inner), scope, id }
    }
}

/// Handle returned by [`SharedData::subscribe`] and [`SharedData::subscribe_all`].
///
/// Dropping the handle keeps the listener registered.
#[derive(Debug)]
pub struct Subscription {
    inner: Weak<SharedDataInner>,
    scope: Scope,
    id: u64,
}

impl Subscription {
    /// Removes the listener. Returns `false` if it was already gone.
    pub fn unsubscribe(self) -> bool {
        self.inner.upgrade().is_some_and(|inner| inner.remove(&self.scope, self.id))
    }

    /// The watched path, or `None` for a global listener.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match &self.scope {
            Scope::Path(path) => Some(path),
            Scope::All => None,
        }
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
