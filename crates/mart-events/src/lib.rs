//! # mart-events
//!
//! Domain events produced by the model marketplace.
//!
//! The marketplace core only produces typed values; delivering them to
//! indexers or other off-core observers is the job of an [`EventSink`].
//!
//! - [`MarketEvent`] - Every notification the marketplace emits
//! - [`EventEnvelope`] - Event plus id, sequence number and timestamp
//! - [`EventSink`] - Pluggable trait for event destinations
//! - [`TracingEventSink`] - Renders events as structured `tracing` records
//! - [`MemoryEventLog`] - Append-only in-memory log
//!
//! ## Example
//!
//! ```rust
//! use mart_core::{ModelId, Principal};
//! use mart_events::{EventEnvelope, EventSink, MarketEvent, MemoryEventLog};
//!
//! let log = MemoryEventLog::new();
//! let event = MarketEvent::ModelActivationChanged {
//!     model_id: ModelId::new(1),
//!     active: false,
//! };
//! log.publish(&EventEnvelope::new(1, event));
//!
//! assert_eq!(log.len(), 1);
//! assert_eq!(log.events()[0].event.event_type(), "model_activation_changed");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod sink;

pub use error::{EventError, Result};
pub use events::{EventEnvelope, MarketEvent};
pub use sink::{BoxedEventSink, EventSink, FanoutEventSink, MemoryEventLog, NoopEventSink, TracingEventSink};
