//! Error types for ledger operations.

use mart_core::{Amount, Principal};
use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Reasons a ledger rejects a transfer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Payer does not hold enough funds.
    #[error("insufficient balance for {account}: have {have}, need {need}")]
    InsufficientBalance {
        /// Account that was debited.
        account: Principal,
        /// Current balance.
        have: Amount,
        /// Required balance.
        need: Amount,
    },

    /// Custody does not hold enough funds for a payout.
    #[error("insufficient custody: have {have}, need {need}")]
    InsufficientCustody {
        /// Current custodial balance.
        have: Amount,
        /// Required balance.
        need: Amount,
    },

    /// Account is frozen and cannot send or receive.
    #[error("account frozen: {0}")]
    AccountFrozen(Principal),

    /// Crediting would overflow the receiving balance.
    #[error("balance overflow for {0}")]
    Overflow(Principal),
}
