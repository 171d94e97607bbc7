use crate::error::EventBusError;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, warn};

type Callback = dyn Fn(&Value) -> Result<(), EventBusError> + Send + Sync;

/// A cloneable event callback.
///
/// Clones share the same callback, and [`Listener::ptr_eq`] is what
/// [`EventBus::off`](crate::EventBus::off) uses to find a registration. Two
/// listeners built from identical closures are *not* equal.
#[derive(Clone)]
pub struct Listener {
    callback: Arc<Callback>,
}

impl Listener {
    /// Wraps an infallible callback.
    ///
    /// # Examples
    /// ```rust
    /// use accelade_event_bus::Listener;
    ///
    /// let listener = Listener::new(|data| assert!(data.is_object()));
    /// assert!(listener.ptr_eq(&listener.clone()));
    /// ```
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(move |data| {
                callback(data);
                Ok(())
            }),
        }
    }

    /// Wraps a callback that reports failures as values.
    ///
    /// A returned error is logged by the bus and never reaches the emitter.
    pub fn fallible<F, E>(callback: F) -> Self
    where
        F: Fn(&Value) -> Result<(), E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self {
            callback: Arc::new(move |data| {
                callback(data).map_err(|e| EventBusError::ListenerFailed {
                    message: e.to_string().into(),
                    context: None,
                })
            }),
        }
    }

    /// Returns `true` if both listeners share the same callback allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }

    /// Runs the callback with panics and errors contained.
    ///
    /// Returns `false` if the listener failed in either way.
    pub(crate) fn dispatch(&self, event: &str, data: &Value) -> bool {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(data))) {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(event, error = %err, "Event listener failed");
                false
            },
            Err(payload) => {
                error!(event, panic = panic_message(payload.as_ref()), "Event listener panicked");
                false
            },
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_identity() {
        let a = Listener::new(|_| {});
        let b = a.clone();
        let c = Listener::new(|_| {});
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn dispatch_contains_errors_and_panics() {
        let ok = Listener::new(|_| {});
        let failing = Listener::fallible(|_| Err::<(), _>("boom"));
        let panicking = Listener::new(|_| panic!("listener exploded"));

        assert!(ok.dispatch("test", &json!(null)));
        assert!(!failing.dispatch("test", &json!(null)));
        assert!(!panicking.dispatch("test", &json!(null)));
    }

    #[test]
    fn panic_message_reads_both_payload_kinds() {
        let static_str: Box<dyn Any + Send> = Box::new("static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(42_u8);

        assert_eq!(panic_message(static_str.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}
