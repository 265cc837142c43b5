use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;

use super::types::StatusChange;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Receives status transitions.
///
/// Called synchronously from the sweep, so implementations must not block.
pub trait StatusChangeSink: Send + Sync {
    fn on_status_change(&self, change: &StatusChange);
}

impl<F> StatusChangeSink for F
where
    F: Fn(&StatusChange) + Send + Sync,
{
    fn on_status_change(&self, change: &StatusChange) {
        self(change)
    }
}

/// Sink that writes every transition to the log
pub struct TracingSink;

impl StatusChangeSink for TracingSink {
    fn on_status_change(&self, change: &StatusChange) {
        tracing::info!(
            target_id = %change.target,
            previous = %change.previous_status,
            current = %change.new_status,
            "Status changed"
        );
    }
}

/// Fan-out point for status transitions.
///
/// Delivery contract:
/// - registered sinks are called exactly once per transition, in registration order
/// - broadcast subscribers get each transition at most once; a receiver that lags
///   more than the channel capacity skips the oldest events
#[derive(Clone)]
pub struct StatusNotifier {
    sinks: Arc<RwLock<Vec<Arc<dyn StatusChangeSink>>>>,
    tx: broadcast::Sender<StatusChange>,
}

impl Default for StatusNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            sinks: Arc::new(RwLock::new(Vec::new())),
            tx,
        }
    }

    pub fn add_sink(&self, sink: Arc<dyn StatusChangeSink>) {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sink);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.tx.subscribe()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn publish(&self, change: &StatusChange) {
        let sinks = self
            .sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for sink in sinks {
            sink.on_status_change(change);
        }

        // No subscribers is not an error
        let _ = self.tx.send(change.clone());
    }
}
