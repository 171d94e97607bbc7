use crate::store::SharedData;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A property-style accessor over a [`SharedData`] store.
///
/// The view owns no data: every call reads or writes the store it was created
/// from, so it always reflects the live tree. Serializing a view yields the
/// current tree, which is what template bindings consume.
///
/// # Example
///
/// ```rust
/// use accelade_shared::SharedData;
/// use serde_json::json;
///
/// let shared = SharedData::new();
/// let view = shared.create_proxy();
///
/// view.set("count", 10);
/// assert_eq!(shared.get("count"), Some(json!(10)));
///
/// shared.set("count", 11);
/// assert_eq!(view.get("count"), Some(json!(11)));
/// assert_eq!(serde_json::to_value(&view).unwrap(), json!({ "count": 11 }));
/// ```
#[derive(Debug, Clone)]
pub struct SharedView {
    data: SharedData,
}

impl SharedView {
    pub(crate) const fn new(data: SharedData) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.get(key)
    }

    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.data.get_or(key, default)
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.data.set(key, value);
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.data.has(key)
    }

    /// Top-level keys of the underlying tree.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.data.keys()
    }
}

impl Serialize for SharedView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.with_tree(|tree| tree.serialize(serializer))
    }
}
