//! # Event Bus
//!
//! A synchronous, string-keyed publish/subscribe dispatcher used to let
//! otherwise unrelated UI components talk to each other.
//!
//! ## Overview
//!
//! Listeners are registered per event name with [`EventBus::on`] or
//! [`EventBus::once`] and receive the emitted `serde_json::Value` payload.
//! A topic exists only while it has listeners.
//!
//! ## Features
//!
//! * **Re-entrant**: `emit` works on a snapshot; listeners may emit, subscribe or
//!   unsubscribe while being called.
//! * **Once semantics**: a once listener fires exactly one time, even under
//!   recursive emits of the same event.
//! * **Isolation**: listener errors and panics are logged with `tracing` and never
//!   reach the emitter or stop the remaining listeners.
//! * **Async bridge**: [`EventBus::stream`] forwards a topic into a `tokio`
//!   broadcast channel.
//!
//! # Example
//!
//! ```rust
//! use accelade_event_bus::{EventBus, Listener};
//! use serde_json::json;
//!
//! let bus = EventBus::new();
//! bus.once("flash", Listener::new(|data| assert_eq!(data["type"], "success")));
//!
//! assert_eq!(bus.emit("flash", &json!({ "type": "success" })), 1);
//! assert!(!bus.has_listeners("flash"));
//! ```

mod bus;
mod error;
mod listener;
mod stream;

pub use bus::{EventBus, EventBusConfig, Subscription};
pub use error::{EventBusError, EventBusErrorExt};
pub use listener::Listener;
pub use stream::EventStream;
