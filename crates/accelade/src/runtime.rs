use crate::config::RuntimeConfig;
use accelade_event_bus::EventBus;
use accelade_logger::{Logger, LoggerError};
use accelade_shared::{SharedData, SharedDataError};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// The page-scoped reactive context.
///
/// A `Runtime` owns exactly one [`EventBus`] and one [`SharedData`] store.
/// Build it once at startup and pass it (or clones of its handles) to every
/// adapter; clones of the handles share state with the runtime.
///
/// # Example
///
/// ```rust
/// use accelade::{Listener, Runtime, RuntimeConfig};
/// use serde_json::json;
///
/// let runtime = Runtime::new(RuntimeConfig::default());
/// runtime.bootstrap_json(r#"{ "cart": { "items": 0 } }"#).unwrap();
///
/// let shared = runtime.shared().clone();
/// runtime.events().on("cart:add", Listener::new(move |_| {
///     let items = shared.get("cart.items").and_then(|v| v.as_u64()).unwrap_or(0);
///     shared.set("cart.items", items + 1);
/// }));
///
/// runtime.events().emit("cart:add", &json!({ "sku": "A-1" }));
/// assert_eq!(runtime.shared().get("cart.items"), Some(json!(1)));
/// ```
#[derive(Debug, Clone)]
pub struct Runtime {
    config: RuntimeConfig,
    events: EventBus,
    shared: SharedData,
}

impl Runtime {
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        let events = EventBus::with_config(config.events);
        debug!(max_listeners = config.events.max_listeners, "Runtime created");
        Self { config, events, shared: SharedData::new() }
    }

    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    #[must_use]
    pub const fn shared(&self) -> &SharedData {
        &self.shared
    }

    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Installs the global tracing subscriber from the `logging` section.
    ///
    /// # Errors
    /// See [`Logger::from_settings`].
    pub fn init_logging(&self) -> Result<Logger, LoggerError> {
        Logger::from_settings(&self.config.logging)
    }

    /// Cold-starts the shared store for a navigation. `None` keeps the current tree.
    pub fn bootstrap(&self, initial: Option<Map<String, Value>>) {
        if let Some(initial) = &initial {
            info!(keys = initial.len(), "Bootstrapping shared data");
        }
        self.shared.init(initial);
    }

    /// Cold-starts the shared store from the raw server payload.
    ///
    /// # Errors
    /// See [`SharedData::init_from_json`]. On error the current tree is kept.
    pub fn bootstrap_json(&self, raw: &str) -> Result<(), SharedDataError> {
        self.shared.init_from_json(raw)?;
        info!(keys = self.shared.len(), "Bootstrapped shared data from payload");
        Ok(())
    }

    /// Drops all shared data, change listeners and event topics.
    pub fn reset(&self) {
        self.shared.reset();
        let topics = self.events.clear(None);
        debug!(topics, "Runtime reset");
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
