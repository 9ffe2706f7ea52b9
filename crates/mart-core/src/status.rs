//! Execution status state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an execution request.
///
/// `Pending` moves exactly once to `Completed` or `Failed`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Funds are in custody, waiting for the oracle's report.
    Pending,
    /// Oracle reported success; creator was paid.
    Completed,
    /// Oracle reported failure; user was refunded.
    Failed,
}

impl ExecutionStatus {
    /// Checks if a transition to the target state is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: &Self) -> bool {
        matches!((self, target), (Self::Pending, Self::Completed | Self::Failed))
    }

    /// Returns true for `Completed` and `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
