//! Funds-transfer seam and its simulated backend.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use mart_core::{Amount, Principal};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{LedgerError, Result};

/// Atomic funds-transfer primitive consumed by the marketplace.
///
/// Implementations must be all-or-nothing: on `Err` no balance changed.
pub trait Ledger: Send + Sync {
    /// Moves `amount` from `from` into the marketplace's custody.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer was rejected.
    fn debit(&self, from: &Principal, amount: Amount) -> Result<()>;

    /// Moves `amount` out of custody to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer was rejected.
    fn credit(&self, to: &Principal, amount: Amount) -> Result<()>;

    /// Current balance held in custody.
    fn custody_balance(&self) -> Amount;
}

/// Unique transfer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(Uuid);

impl TransferId {
    /// Create a new random transfer ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a transfer relative to custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    /// Account into custody.
    Debit,
    /// Custody out to an account.
    Credit,
}

/// A completed transfer recorded by [`InMemoryLedger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Unique transfer ID.
    pub id: TransferId,
    /// Debit or credit.
    pub direction: TransferDirection,
    /// The non-custody side of the transfer.
    pub account: Principal,
    /// Amount moved.
    pub amount: Amount,
    /// When the transfer was applied.
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<Principal, Amount>,
    custody: Amount,
    frozen: HashSet<Principal>,
    transfers: Vec<Transfer>,
}

impl LedgerState {
    fn record(&mut self, direction: TransferDirection, account: &Principal, amount: Amount) {
        self.transfers.push(Transfer {
            id: TransferId::new(),
            direction,
            account: account.clone(),
            amount,
            at: Utc::now(),
        });
    }
}

/// Simulated ledger for development and tests.
///
/// Keeps plain per-account balances plus one custody balance behind a single
/// mutex. Accounts can be frozen to make transfers touching them fail.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints `amount` into `account` from outside the system.
    pub fn fund(&self, account: &Principal, amount: Amount) {
        let mut state = self.state.lock();
        let balance = state.accounts.entry(account.clone()).or_default();
        *balance = balance.saturating_add(amount);

        info!(account = %account, amount = %amount, "account funded");
    }

    /// Balance of a (non-custody) account.
    #[must_use]
    pub fn balance_of(&self, account: &Principal) -> Amount {
        self.state
            .lock()
            .accounts
            .get(account)
            .copied()
            .unwrap_or_default()
    }

    /// Makes every subsequent transfer touching `account` fail.
    pub fn freeze(&self, account: &Principal) {
        self.state.lock().frozen.insert(account.clone());
        debug!(account = %account, "account frozen");
    }

    /// Lifts a freeze placed by [`InMemoryLedger::freeze`].
    pub fn unfreeze(&self, account: &Principal) {
        self.state.lock().frozen.remove(account);
        debug!(account = %account, "account unfrozen");
    }

    /// Returns true if `account` is frozen.
    #[must_use]
    pub fn is_frozen(&self, account: &Principal) -> bool {
        self.state.lock().frozen.contains(account)
    }

    /// All transfers applied so far, oldest first.
    #[must_use]
    pub fn transfers(&self) -> Vec<Transfer> {
        self.state.lock().transfers.clone()
    }
}

impl Ledger for InMemoryLedger {
    fn debit(&self, from: &Principal, amount: Amount) -> Result<()> {
        let mut state = self.state.lock();

        if state.frozen.contains(from) {
            warn!(account = %from, amount = %amount, "debit rejected: account frozen");
            return Err(LedgerError::AccountFrozen(from.clone()));
        }

        let have = state.accounts.get(from).copied().unwrap_or_default();
        let Some(remaining) = have.checked_sub(amount) else {
            warn!(account = %from, have = %have, need = %amount, "debit rejected: insufficient balance");
            return Err(LedgerError::InsufficientBalance {
                account: from.clone(),
                have,
                need: amount,
            });
        };
        let custody = state
            .custody
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(Principal::new("custody")))?;

        state.accounts.insert(from.clone(), remaining);
        state.custody = custody;
        state.record(TransferDirection::Debit, from, amount);

        debug!(account = %from, amount = %amount, "debit applied");
        Ok(())
    }

    fn credit(&self, to: &Principal, amount: Amount) -> Result<()> {
        let mut state = self.state.lock();

        if state.frozen.contains(to) {
            warn!(account = %to, amount = %amount, "credit rejected: account frozen");
            return Err(LedgerError::AccountFrozen(to.clone()));
        }

        let Some(custody) = state.custody.checked_sub(amount) else {
            warn!(account = %to, have = %state.custody, need = %amount, "credit rejected: insufficient custody");
            return Err(LedgerError::InsufficientCustody {
                have: state.custody,
                need: amount,
            });
        };
        let balance = state
            .accounts
            .get(to)
            .copied()
            .unwrap_or_default()
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(to.clone()))?;

        state.accounts.insert(to.clone(), balance);
        state.custody = custody;
        state.record(TransferDirection::Credit, to, amount);

        debug!(account = %to, amount = %amount, "credit applied");
        Ok(())
    }

    fn custody_balance(&self) -> Amount {
        self.state.lock().custody
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn alice() -> Principal {
        Principal::new("alice")
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.balance_of(&alice()), Amount::ZERO);
        assert_eq!(ledger.custody_balance(), Amount::ZERO);
        assert!(ledger.transfers().is_empty());
    }

    #[test]
    fn debit_moves_funds_into_custody() {
        let ledger = InMemoryLedger::new();
        ledger.fund(&alice(), Amount::new(1000));

        ledger.debit(&alice(), Amount::new(300)).unwrap();

        assert_eq!(ledger.balance_of(&alice()), Amount::new(700));
        assert_eq!(ledger.custody_balance(), Amount::new(300));
        let transfers = ledger.transfers();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].direction, TransferDirection::Debit);
    }

    #[test]
    fn debit_rejects_insufficient_balance_without_effect() {
        let ledger = InMemoryLedger::new();
        ledger.fund(&alice(), Amount::new(100));

        let err = ledger.debit(&alice(), Amount::new(101)).unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(ledger.balance_of(&alice()), Amount::new(100));
        assert_eq!(ledger.custody_balance(), Amount::ZERO);
        assert!(ledger.transfers().is_empty());
    }

    #[test]
    fn credit_moves_funds_out_of_custody() {
        let ledger = InMemoryLedger::new();
        let bob = Principal::new("bob");
        ledger.fund(&alice(), Amount::new(500));
        ledger.debit(&alice(), Amount::new(500)).unwrap();

        ledger.credit(&bob, Amount::new(200)).unwrap();

        assert_eq!(ledger.balance_of(&bob), Amount::new(200));
        assert_eq!(ledger.custody_balance(), Amount::new(300));
    }

    #[test]
    fn credit_rejects_more_than_custody() {
        let ledger = InMemoryLedger::new();
        let err = ledger.credit(&alice(), Amount::new(1)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientCustody { .. }));
        assert_eq!(ledger.balance_of(&alice()), Amount::ZERO);
    }

    #[test]
    fn frozen_account_rejects_both_directions() {
        let ledger = InMemoryLedger::new();
        ledger.fund(&alice(), Amount::new(100));
        ledger.freeze(&alice());
        assert!(ledger.is_frozen(&alice()));

        assert_eq!(
            ledger.debit(&alice(), Amount::new(10)),
            Err(LedgerError::AccountFrozen(alice()))
        );
        assert_eq!(
            ledger.credit(&alice(), Amount::new(10)),
            Err(LedgerError::AccountFrozen(alice()))
        );
        assert_eq!(ledger.balance_of(&alice()), Amount::new(100));

        ledger.unfreeze(&alice());
        assert!(ledger.debit(&alice(), Amount::new(10)).is_ok());
    }

    #[derive(Debug, Clone, Copy)]
    enum Rejection {
        Overdraw,
        EmptyCustody,
        FrozenPayer,
        FrozenPayee,
    }

    #[test_case(Rejection::Overdraw ; "debit above balance")]
    #[test_case(Rejection::EmptyCustody ; "credit above custody")]
    #[test_case(Rejection::FrozenPayer ; "debit from frozen account")]
    #[test_case(Rejection::FrozenPayee ; "credit to frozen account")]
    fn rejected_transfer_changes_nothing(case: Rejection) {
        let ledger = InMemoryLedger::new();
        let bob = Principal::new("bob");
        ledger.fund(&alice(), Amount::new(100));
        ledger.debit(&alice(), Amount::new(40)).unwrap();
        let transfers = ledger.transfers().len();

        let result = match case {
            Rejection::Overdraw => ledger.debit(&alice(), Amount::new(61)),
            Rejection::EmptyCustody => ledger.credit(&bob, Amount::new(41)),
            Rejection::FrozenPayer => {
                ledger.freeze(&alice());
                ledger.debit(&alice(), Amount::new(1))
            }
            Rejection::FrozenPayee => {
                ledger.freeze(&bob);
                ledger.credit(&bob, Amount::new(1))
            }
        };

        assert!(result.is_err());
        assert_eq!(ledger.balance_of(&alice()), Amount::new(60));
        assert_eq!(ledger.balance_of(&bob), Amount::ZERO);
        assert_eq!(ledger.custody_balance(), Amount::new(40));
        assert_eq!(ledger.transfers().len(), transfers);
    }

    #[test]
    fn transfer_serializes() {
        let ledger = InMemoryLedger::new();
        ledger.fund(&alice(), Amount::new(10));
        ledger.debit(&alice(), Amount::new(10)).unwrap();

        let json = serde_json::to_string(&ledger.transfers()[0]).unwrap();
        assert!(json.contains(r#""direction":"debit""#));
        assert!(json.contains(r#""account":"alice""#));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn total_supply_is_conserved(ops in prop::collection::vec((any::<bool>(), 0u64..500), 0..40)) {
                let ledger = InMemoryLedger::new();
                let bob = Principal::new("bob");
                ledger.fund(&alice(), Amount::new(5_000));

                for (is_debit, units) in ops {
                    let amount = Amount::new(units);
                    let _ = if is_debit {
                        ledger.debit(&alice(), amount)
                    } else {
                        ledger.credit(&bob, amount)
                    };
                }

                let total = ledger.balance_of(&alice()).units()
                    + ledger.balance_of(&bob).units()
                    + ledger.custody_balance().units();
                prop_assert_eq!(total, 5_000);
            }
        }
    }
}
