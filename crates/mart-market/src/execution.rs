//! Execution records and their state machine.

use chrono::{DateTime, Utc};
use mart_core::{Amount, ContentRef, ExecutionId, ExecutionStatus, ModelId, Principal};
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// Outcome reported by the oracle for a pending execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementOutcome {
    /// Execution succeeded; creator is paid minus the platform fee.
    Completed,
    /// Execution failed; user is refunded in full.
    Failed,
}

impl SettlementOutcome {
    /// The terminal status this outcome moves a record to.
    #[must_use]
    pub const fn status(self) -> ExecutionStatus {
        match self {
            Self::Completed => ExecutionStatus::Completed,
            Self::Failed => ExecutionStatus::Failed,
        }
    }
}

/// A paid execution request.
///
/// Created only after the user's payment is in custody. `status` moves once
/// from `Pending` to a terminal state; `user_rating` moves once from 0 to
/// 1-5, and only after `Completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Execution id.
    pub id: ExecutionId,
    /// Model that was requested.
    pub model_id: ModelId,
    /// Requesting (paying) user.
    pub user: Principal,
    /// When the request was accepted.
    pub requested_at: DateTime<Utc>,
    /// Amount held in custody for this execution.
    pub paid_amount: Amount,
    /// Lifecycle state.
    pub status: ExecutionStatus,
    /// Reference to the execution input.
    pub input_ref: ContentRef,
    /// Reference to the execution output; empty until settled.
    pub output_ref: ContentRef,
    /// User rating, 0 while unrated.
    pub user_rating: u8,
}

impl ExecutionRecord {
    pub(crate) fn pending(
        id: ExecutionId,
        model_id: ModelId,
        user: Principal,
        paid_amount: Amount,
        input_ref: ContentRef,
    ) -> Self {
        Self {
            id,
            model_id,
            user,
            requested_at: Utc::now(),
            paid_amount,
            status: ExecutionStatus::Pending,
            input_ref,
            output_ref: ContentRef::default(),
            user_rating: 0,
        }
    }

    /// Checks that the record can still be settled.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::AlreadyProcessed` if the record is terminal.
    pub fn ensure_pending(&self) -> Result<(), MarketError> {
        if self.status == ExecutionStatus::Pending {
            Ok(())
        } else {
            Err(MarketError::AlreadyProcessed(self.id))
        }
    }

    /// Moves the record to the outcome's terminal state.
    pub(crate) fn settle(
        &mut self,
        outcome: SettlementOutcome,
        output_ref: ContentRef,
    ) -> Result<(), MarketError> {
        let target = outcome.status();
        if !self.status.can_transition_to(&target) {
            return Err(MarketError::AlreadyProcessed(self.id));
        }
        self.status = target;
        self.output_ref = output_ref;
        Ok(())
    }

    /// Returns true once the user has rated this execution.
    #[must_use]
    pub const fn is_rated(&self) -> bool {
        self.user_rating != 0
    }

    /// Returns true while the record awaits settlement.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ExecutionStatus::Pending
    }
}
