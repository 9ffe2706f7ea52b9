//! Error types for mart-market.

use mart_core::{CoreError, ExecutionId, ModelId, Principal};
use mart_ledger::LedgerError;
use thiserror::Error;

use crate::access::Role;

/// Result type alias for marketplace operations.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Errors returned by marketplace operations.
///
/// Every operation checks its preconditions before mutating anything, so any
/// `Err` means the call had no effect.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarketError {
    /// Caller-supplied data is malformed or out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No model with this id exists.
    #[error("model not found: {0}")]
    ModelNotFound(ModelId),

    /// No execution with this id exists.
    #[error("execution not found: {0}")]
    ExecutionNotFound(ExecutionId),

    /// Caller lacks the role required by the operation.
    #[error("unauthorized: {caller} is not {required}")]
    Unauthorized {
        /// The rejected caller.
        caller: Principal,
        /// Role the operation requires.
        required: Role,
    },

    /// The model has been deactivated.
    #[error("model is inactive: {0}")]
    InactiveModel(ModelId),

    /// The execution has already been settled.
    #[error("execution already processed: {0}")]
    AlreadyProcessed(ExecutionId),

    /// The execution has already been rated.
    #[error("execution already rated: {0}")]
    AlreadyRated(ExecutionId),

    /// The execution has not completed successfully.
    #[error("execution not settled as completed: {0}")]
    NotSettled(ExecutionId),

    /// The ledger rejected a debit or credit.
    #[error("payment failed: {0}")]
    PaymentFailed(String),

    /// Custody is empty.
    #[error("nothing to withdraw")]
    NothingToWithdraw,

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Payload-free classification of [`MarketError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`MarketError::InvalidInput`].
    InvalidInput,
    /// Model or execution id does not exist.
    NotFound,
    /// See [`MarketError::Unauthorized`].
    Unauthorized,
    /// See [`MarketError::InactiveModel`].
    InactiveModel,
    /// See [`MarketError::AlreadyProcessed`].
    AlreadyProcessed,
    /// See [`MarketError::AlreadyRated`].
    AlreadyRated,
    /// See [`MarketError::NotSettled`].
    NotSettled,
    /// See [`MarketError::PaymentFailed`].
    PaymentFailed,
    /// See [`MarketError::NothingToWithdraw`].
    NothingToWithdraw,
    /// See [`MarketError::Config`].
    Config,
    /// See [`MarketError::Snapshot`].
    Snapshot,
}

impl MarketError {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::ModelNotFound(_) | Self::ExecutionNotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InactiveModel(_) => ErrorKind::InactiveModel,
            Self::AlreadyProcessed(_) => ErrorKind::AlreadyProcessed,
            Self::AlreadyRated(_) => ErrorKind::AlreadyRated,
            Self::NotSettled(_) => ErrorKind::NotSettled,
            Self::PaymentFailed(_) => ErrorKind::PaymentFailed,
            Self::NothingToWithdraw => ErrorKind::NothingToWithdraw,
            Self::Config(_) => ErrorKind::Config,
            Self::Snapshot(_) => ErrorKind::Snapshot,
        }
    }
}

impl From<LedgerError> for MarketError {
    fn from(e: LedgerError) -> Self {
        Self::PaymentFailed(e.to_string())
    }
}

impl From<CoreError> for MarketError {
    fn from(e: CoreError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mart_core::Amount;
    use test_case::test_case;

    #[test_case(MarketError::invalid_input("x"), ErrorKind::InvalidInput ; "invalid input")]
    #[test_case(MarketError::ModelNotFound(ModelId::new(1)), ErrorKind::NotFound ; "model")]
    #[test_case(MarketError::ExecutionNotFound(ExecutionId::new(1)), ErrorKind::NotFound ; "execution")]
    #[test_case(MarketError::AlreadyProcessed(ExecutionId::new(1)), ErrorKind::AlreadyProcessed ; "processed")]
    #[test_case(MarketError::NothingToWithdraw, ErrorKind::NothingToWithdraw ; "withdraw")]
    #[test_case(MarketError::Snapshot("eof".into()), ErrorKind::Snapshot ; "snapshot")]
    fn kind_classifies(err: MarketError, kind: ErrorKind) {
        assert_eq!(err.kind(), kind);
    }

    #[test]
    fn ledger_errors_become_payment_failures() {
        let err: MarketError = LedgerError::InsufficientCustody {
            have: Amount::ZERO,
            need: Amount::new(5),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::PaymentFailed);
        assert!(err.to_string().contains("insufficient custody"));
    }

    #[test]
    fn unauthorized_display_names_role() {
        let err = MarketError::Unauthorized {
            caller: Principal::new("mallory"),
            required: Role::Owner,
        };
        assert_eq!(err.to_string(), "unauthorized: mallory is not owner");
    }
}
