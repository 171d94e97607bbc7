//! A reactive store for the data a server shares with the page.
//!
//! The server delivers one JSON object per navigation. [`SharedData`] keeps it
//! as a single tree, lets adapters read and write nested values through
//! dot-separated paths, and notifies subscribers on every write.
//!
//! # Core Features
//!
//! - **Soft reads**: a missing, null or non-object segment resolves to `None`
//!   (or the caller's default), never to an error.
//! - **Forcing writes**: `set` creates missing intermediate objects and
//!   overwrites scalars standing in the way.
//! - **Ordered notification**: listeners of the exact path run first, then
//!   global listeners, each in registration order. A panicking listener is
//!   logged and skipped.
//! - **Live view**: [`SharedView`] forwards property-style access to the store.
//!
//! # Examples
//!
//! ```rust
//! use accelade_shared::SharedData;
//! use serde_json::json;
//!
//! let shared = SharedData::new();
//! shared.init_from_json(r#"{ "user": { "name": "Ada" } }"#).unwrap();
//!
//! let _subscription = shared.subscribe("user.name", |path, new, old| {
//!     assert_eq!(path, "user.name");
//!     assert_eq!(new, &json!("Grace"));
//!     assert_eq!(old, Some(&json!("Ada")));
//! });
//!
//! shared.set("user.name", "Grace");
//! ```

mod error;
mod path;
mod store;
mod view;

pub use error::{SharedDataError, SharedDataErrorExt};
pub use store::{SharedData, Subscription};
pub use view::SharedView;
