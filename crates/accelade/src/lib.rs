//! Facade crate for the Accelade reactive core.
//! Re-exports the event bus and shared data store and ties them together in a
//! [`Runtime`] context. Keep this crate thin: it should compose other crates,
//! not implement reactive logic.
//!
//! ## Usage
//! - Load a [`RuntimeConfig`] with [`load_config`] (or use the default).
//! - Build one [`Runtime`] per page and hand out its handles.
//! - Call [`Runtime::bootstrap_json`] with the server payload on every navigation.

mod config;
mod runtime;

pub use accelade_event_bus as events;
pub use accelade_logger as logger;
pub use accelade_shared as shared;

pub use accelade_event_bus::{EventBus, EventBusConfig, Listener};
pub use accelade_shared::{SharedData, SharedView};
pub use config::{ConfigError, ConfigErrorExt, ENV_PREFIX, RuntimeConfig, load_config};
pub use runtime::Runtime;
