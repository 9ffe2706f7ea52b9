//! Event delivery backends.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::events::EventEnvelope;

/// Destination for marketplace events.
///
/// Implement this trait to forward events to a message bus, a database, or
/// any other off-core consumer.
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    fn publish(&self, envelope: &EventEnvelope);
}

/// Sink that renders events through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingEventSink {
    prefix: Option<String>,
}

impl TracingEventSink {
    /// Creates a new tracing sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new tracing sink with a message prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

impl EventSink for TracingEventSink {
    fn publish(&self, envelope: &EventEnvelope) {
        let event_type = envelope.event.event_type();
        let json = envelope.to_json().unwrap_or_else(|_| "{}".to_string());
        let prefix = self.prefix.as_deref().unwrap_or("MARKET");

        tracing::info!(
            target: "mart_events",
            event_id = %envelope.event_id,
            sequence = envelope.sequence,
            timestamp = %envelope.timestamp,
            %event_type,
            admin = envelope.event.is_admin(),
            event_json = %json,
            "[{prefix}] {event_type}"
        );
    }
}

/// Append-only in-memory event log.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    entries: RwLock<Vec<EventEnvelope>>,
}

impl MemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<EventEnvelope> {
        self.entries.read().clone()
    }

    /// Events with a sequence number greater than `sequence`.
    #[must_use]
    pub fn since(&self, sequence: u64) -> Vec<EventEnvelope> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.sequence > sequence)
            .cloned()
            .collect()
    }

    /// Events of the given type (see [`crate::MarketEvent::event_type`]).
    #[must_use]
    pub fn of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.event.event_type() == event_type)
            .cloned()
            .collect()
    }

    /// Owner-only administrative events, oldest first.
    #[must_use]
    pub fn admin_events(&self) -> Vec<EventEnvelope> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.event.is_admin())
            .cloned()
            .collect()
    }

    /// Number of events recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl EventSink for MemoryEventLog {
    fn publish(&self, envelope: &EventEnvelope) {
        self.entries.write().push(envelope.clone());
    }
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl NoopEventSink {
    /// Creates a new no-op sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EventSink for NoopEventSink {
    fn publish(&self, _envelope: &EventEnvelope) {}
}

/// Sink that forwards every event to several sinks, in order.
#[derive(Default)]
pub struct FanoutEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutEventSink {
    /// Creates a fanout with no targets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a target sink.
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl std::fmt::Debug for FanoutEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutEventSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl EventSink for FanoutEventSink {
    fn publish(&self, envelope: &EventEnvelope) {
        for sink in &self.sinks {
            sink.publish(envelope);
        }
    }
}

/// A boxed event sink for dynamic dispatch.
pub type BoxedEventSink = Box<dyn EventSink>;

impl EventSink for BoxedEventSink {
    fn publish(&self, envelope: &EventEnvelope) {
        (**self).publish(envelope);
    }
}
