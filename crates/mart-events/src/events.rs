//! Marketplace event types.

use chrono::{DateTime, Utc};
use mart_core::{Amount, ExecutionId, ExecutionStatus, ModelId, Principal};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EventError, Result};

/// A notification emitted by the marketplace after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A creator registered a new model.
    ModelRegistered {
        /// Newly allocated model id.
        model_id: ModelId,
        /// Creator of the model.
        creator: Principal,
        /// Display name.
        name: String,
        /// Price per execution.
        price: Amount,
    },

    /// A user paid for an execution; funds are in custody.
    ExecutionRequested {
        /// Newly allocated execution id.
        execution_id: ExecutionId,
        /// Model being executed.
        model_id: ModelId,
        /// Requesting user.
        user: Principal,
        /// Amount taken into custody.
        amount: Amount,
    },

    /// An execution was settled, or a completed execution was rated.
    ///
    /// Emitted at settlement with `rating = 0`, and again at rating time with
    /// the submitted rating and `status = Completed`.
    ExecutionCompleted {
        /// Execution id.
        execution_id: ExecutionId,
        /// Terminal status.
        status: ExecutionStatus,
        /// User rating (0 until rated).
        rating: u8,
    },

    /// A user rated a completed execution.
    ModelRated {
        /// Model whose aggregate changed.
        model_id: ModelId,
        /// Rated execution.
        execution_id: ExecutionId,
        /// Submitted rating (1-5).
        rating: u8,
        /// User who rated.
        user: Principal,
    },

    /// The oracle principal was replaced.
    OracleUpdated {
        /// Previous oracle.
        old: Principal,
        /// New oracle.
        new: Principal,
    },

    /// The platform fee was changed.
    PlatformFeeUpdated {
        /// Previous fee in basis points.
        old_bps: u16,
        /// New fee in basis points.
        new_bps: u16,
    },

    /// A model's active flag was changed by the owner.
    ModelActivationChanged {
        /// Model id.
        model_id: ModelId,
        /// New value of the flag.
        active: bool,
    },

    /// The owner withdrew the custodial balance.
    FeesWithdrawn {
        /// Receiving principal.
        to: Principal,
        /// Amount withdrawn.
        amount: Amount,
    },
}

impl MarketEvent {
    /// Returns the event type as a string.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::ModelRegistered { .. } => "model_registered",
            Self::ExecutionRequested { .. } => "execution_requested",
            Self::ExecutionCompleted { .. } => "execution_completed",
            Self::ModelRated { .. } => "model_rated",
            Self::OracleUpdated { .. } => "oracle_updated",
            Self::PlatformFeeUpdated { .. } => "platform_fee_updated",
            Self::ModelActivationChanged { .. } => "model_activation_changed",
            Self::FeesWithdrawn { .. } => "fees_withdrawn",
        }
    }

    /// Returns true for owner-only administrative events.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::OracleUpdated { .. }
                | Self::PlatformFeeUpdated { .. }
                | Self::ModelActivationChanged { .. }
                | Self::FeesWithdrawn { .. }
        )
    }
}

/// An event as delivered to sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Position in the marketplace's total order of events, starting at 1.
    pub sequence: u64,
    /// When the event was produced.
    pub timestamp: DateTime<Utc>,
    /// The event itself.
    pub event: MarketEvent,
}

impl EventEnvelope {
    /// Wraps `event` with a fresh id and the current time.
    #[must_use]
    pub fn new(sequence: u64, event: MarketEvent) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            sequence,
            timestamp: Utc::now(),
            event,
        }
    }

    /// Serializes the envelope to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(EventError::from)
    }
}
