use crate::bus::Subscription;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// Async view over one event topic, created by [`EventBus::stream`](crate::EventBus::stream).
///
/// Backed by a bounded broadcast channel: a slow consumer skips ahead to the
/// oldest payload still buffered instead of blocking the emitter.
#[derive(Debug)]
pub struct EventStream {
    receiver: broadcast::Receiver<Arc<Value>>,
    subscription: Option<Subscription>,
}

impl EventStream {
    pub(crate) const fn new(
        receiver: broadcast::Receiver<Arc<Value>>,
        subscription: Subscription,
    ) -> Self {
        Self { receiver, subscription: Some(subscription) }
    }

    /// Name of the forwarded event.
    #[must_use]
    pub fn event(&self) -> &str {
        self.subscription.as_ref().map_or("", Subscription::event)
    }

    /// Receives the next payload, returning `None` once the listener is gone.
    pub async fn recv(&mut self) -> Option<Arc<Value>> {
        let mut skipped = 0u64;

        loop {
            match self.receiver.recv().await {
                Ok(payload) => {
                    if skipped > 0 {
                        warn!(
                            event = self.event(),
                            skipped, "EventStream lagged; continuing from the oldest buffered payload"
                        );
                    }
                    return Some(payload);
                },
                Err(RecvError::Lagged(n)) => {
                    skipped = skipped.saturating_add(n);
                    debug!(
                        event = self.event(),
                        skipped = n,
                        total_skipped = skipped,
                        "EventStream lagged; accumulating skipped payloads"
                    );
                },
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
