use accelade_event_bus::Listener;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// Collects `(tag, payload)` pairs in call order across several listeners.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<(&'static str, Value)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener(&self, tag: &'static str) -> Listener {
        let calls = self.calls.clone();
        Listener::new(move |data| calls.lock().push((tag, data.clone())))
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(|(tag, _)| *tag).collect()
    }

    pub fn payloads(&self, tag: &str) -> Vec<Value> {
        self.calls.lock().iter().filter(|(t, _)| *t == tag).map(|(_, v)| v.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }
}
