//! Execution engine: payment custody on request, settlement on completion.
//!
//! ```text
//! request_execution:  debit user ──ok──► allocate id ──► store Pending
//!                          └─err─► PaymentFailed, nothing stored
//!
//! complete_execution: check role/id/Pending ──► credit payee ──ok──► persist terminal status
//!                                                   └─err─► PaymentFailed, record stays Pending
//! ```

use std::collections::HashMap;

use mart_core::{Amount, ContentRef, ExecutionId, ModelId, Principal};
use mart_events::MarketEvent;
use tracing::{debug, info, warn};

use crate::error::{MarketError, Result};
use crate::execution::{ExecutionRecord, SettlementOutcome};
use crate::marketplace::Marketplace;
use crate::settlement::{split_payment, SettlementReceipt};

/// Append-only storage of execution records, indexed by id.
///
/// Ids are dense: execution `n` lives in slot `n - 1`.
#[derive(Debug, Clone, Default)]
pub struct ExecutionBook {
    records: Vec<ExecutionRecord>,
    by_user: HashMap<Principal, Vec<ExecutionId>>,
}

impl ExecutionBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a book (and its user index) from stored records.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidInput` if ids are not exactly `1..=n` in
    /// order, or a record is rated without being completed.
    pub fn from_records(records: Vec<ExecutionRecord>) -> Result<Self> {
        let mut book = Self::new();
        for record in records {
            let expected = book.next_id();
            if record.id != expected {
                return Err(MarketError::invalid_input(format!(
                    "execution ids must be dense: expected {expected}, found {}",
                    record.id
                )));
            }
            if record.is_rated() && record.status != mart_core::ExecutionStatus::Completed {
                return Err(MarketError::invalid_input(format!(
                    "{} is rated but not completed",
                    record.id
                )));
            }
            book.insert(record);
        }
        debug!(executions = book.len(), "rebuilt execution book");
        Ok(book)
    }

    pub(crate) fn insert_pending(
        &mut self,
        model_id: ModelId,
        user: Principal,
        paid_amount: Amount,
        input_ref: ContentRef,
    ) -> ExecutionId {
        let id = self.next_id();
        self.insert(ExecutionRecord::pending(id, model_id, user, paid_amount, input_ref));
        id
    }

    fn insert(&mut self, record: ExecutionRecord) {
        self.by_user
            .entry(record.user.clone())
            .or_default()
            .push(record.id);
        self.records.push(record);
    }

    /// The id the next request will receive.
    #[must_use]
    pub fn next_id(&self) -> ExecutionId {
        ExecutionId::new(self.last_id() + 1)
    }

    /// The most recently allocated id (0 if none).
    #[must_use]
    pub fn last_id(&self) -> u64 {
        self.records.len() as u64
    }

    fn slot(&self, id: ExecutionId) -> Option<usize> {
        let index = usize::try_from(id.value().checked_sub(1)?).ok()?;
        (index < self.records.len()).then_some(index)
    }

    /// Looks up a record.
    #[must_use]
    pub fn get(&self, id: ExecutionId) -> Option<&ExecutionRecord> {
        self.slot(id).map(|i| &self.records[i])
    }

    /// Looks up a record, failing with `ExecutionNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::ExecutionNotFound` if the id is out of range.
    pub fn require(&self, id: ExecutionId) -> Result<&ExecutionRecord> {
        self.get(id).ok_or(MarketError::ExecutionNotFound(id))
    }

    pub(crate) fn require_mut(&mut self, id: ExecutionId) -> Result<&mut ExecutionRecord> {
        let index = self.slot(id).ok_or(MarketError::ExecutionNotFound(id))?;
        Ok(&mut self.records[index])
    }

    /// Executions requested by `user`, in request order.
    #[must_use]
    pub fn by_user(&self, user: &Principal) -> Vec<ExecutionId> {
        self.by_user.get(user).cloned().unwrap_or_default()
    }

    /// Records still awaiting settlement, ascending by id.
    pub fn pending(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter().filter(|r| r.is_pending())
    }

    /// All records, ascending by id.
    #[must_use]
    pub fn records(&self) -> &[ExecutionRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no execution has been requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Marketplace {
    /// Takes payment for one execution of `model_id` and records it as Pending.
    ///
    /// The user's payment is moved into custody before any id is allocated,
    /// so a record never exists without its funds.
    ///
    /// # Errors
    ///
    /// - `ModelNotFound` if the model does not exist
    /// - `InactiveModel` if the model is deactivated
    /// - `InvalidInput` for an empty input reference or a null user
    /// - `PaymentFailed` if the ledger rejects the debit
    pub fn request_execution(
        &self,
        user: &Principal,
        model_id: ModelId,
        input_ref: ContentRef,
    ) -> Result<ExecutionId> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let model = state.registry.require(model_id)?;
        if !model.is_active {
            return Err(MarketError::InactiveModel(model_id));
        }
        if input_ref.is_empty() {
            return Err(MarketError::invalid_input("input reference must not be empty"));
        }
        if user.is_null() {
            return Err(MarketError::invalid_input("user must not be empty"));
        }
        let cost = model.price_per_execution;

        if let Err(e) = self.ledger.debit(user, cost) {
            warn!(user = %user, model_id = %model_id, amount = %cost, error = %e, "execution payment rejected");
            return Err(e.into());
        }

        let execution_id = state
            .executions
            .insert_pending(model_id, user.clone(), cost, input_ref);
        self.emit(
            state,
            MarketEvent::ExecutionRequested {
                execution_id,
                model_id,
                user: user.clone(),
                amount: cost,
            },
        );

        info!(execution_id = %execution_id, model_id = %model_id, user = %user, amount = %cost, "execution requested");
        Ok(execution_id)
    }

    /// Settles a Pending execution with the oracle's reported outcome.
    ///
    /// On `Completed` the creator is credited `paid - platform_cut` and the
    /// platform cut stays in custody; on `Failed` the user is refunded in
    /// full. The record only leaves Pending after the credit succeeds, so a
    /// failed credit can simply be retried.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless `caller` is the oracle or the owner
    /// - `ExecutionNotFound` if the id is out of range
    /// - `AlreadyProcessed` if the record is not Pending
    /// - `PaymentFailed` if the ledger rejects the credit
    pub fn complete_execution(
        &self,
        caller: &Principal,
        execution_id: ExecutionId,
        outcome: SettlementOutcome,
        output_ref: ContentRef,
    ) -> Result<SettlementReceipt> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        state.guard.require_settler(caller)?;
        let record = state.executions.require(execution_id)?;
        record.ensure_pending()?;

        let model_id = record.model_id;
        let (payee, credited, platform_cut) = match outcome {
            SettlementOutcome::Completed => {
                let creator = state.registry.require(model_id)?.creator.clone();
                let split = split_payment(record.paid_amount, state.guard.platform_fee_bps());
                (creator, split.creator_cut, split.platform_cut)
            }
            SettlementOutcome::Failed => (record.user.clone(), record.paid_amount, Amount::ZERO),
        };

        if let Err(e) = self.ledger.credit(&payee, credited) {
            warn!(
                execution_id = %execution_id,
                payee = %payee,
                amount = %credited,
                error = %e,
                "settlement payout rejected; execution stays pending"
            );
            return Err(e.into());
        }

        let record = state.executions.require_mut(execution_id)?;
        record.settle(outcome, output_ref)?;
        let status = record.status;
        if outcome == SettlementOutcome::Completed {
            let model = state.registry.require_mut(model_id)?;
            model.total_executions = model.total_executions.saturating_add(1);
        }

        self.emit(
            state,
            MarketEvent::ExecutionCompleted {
                execution_id,
                status,
                rating: 0,
            },
        );

        info!(
            execution_id = %execution_id,
            %status,
            payee = %payee,
            credited = %credited,
            platform_cut = %platform_cut,
            "execution settled"
        );
        Ok(SettlementReceipt {
            execution_id,
            outcome,
            payee,
            credited,
            platform_cut,
        })
    }

    /// Executions still awaiting the oracle, ascending by id.
    ///
    /// Pending records never expire; this is the hook for monitoring them.
    #[must_use]
    pub fn pending_executions(&self) -> Vec<ExecutionRecord> {
        self.state.read().executions.pending().cloned().collect()
    }
}
