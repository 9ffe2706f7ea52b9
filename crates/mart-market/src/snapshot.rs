//! Snapshot and restore of marketplace state.
//!
//! A snapshot holds only primary records and admin settings. The per-user
//! indices (models by creator, executions by user) are rebuilt on restore.

use std::sync::Arc;

use mart_core::{ExecutionStatus, RatingAggregate};
use mart_events::EventSink;
use mart_ledger::{Ledger, OwnershipRegistry};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::access::AccessGuard;
use crate::config::MarketConfig;
use crate::engine::ExecutionBook;
use crate::error::{MarketError, Result};
use crate::execution::ExecutionRecord;
use crate::marketplace::{MarketState, Marketplace};
use crate::model::AIModel;
use crate::registry::ModelRegistry;

/// Serializable copy of a marketplace's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Owner, oracle and fee at snapshot time.
    pub config: MarketConfig,
    /// Every model, ascending by id.
    pub models: Vec<AIModel>,
    /// Every execution, ascending by id.
    pub executions: Vec<ExecutionRecord>,
    /// Sequence number of the last emitted event.
    pub event_sequence: u64,
}

impl MarketSnapshot {
    /// Serializes the snapshot to JSON.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Snapshot` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| MarketError::Snapshot(e.to_string()))
    }

    /// Parses a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Snapshot` on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MarketError::Snapshot(e.to_string()))
    }
}

impl Marketplace {
    /// Captures a consistent copy of all records and settings.
    #[must_use]
    pub fn snapshot(&self) -> MarketSnapshot {
        let state = self.state.read();
        MarketSnapshot {
            config: state.guard.to_config(),
            models: state.registry.models().to_vec(),
            executions: state.executions.records().to_vec(),
            event_sequence: state.event_sequence,
        }
    }

    /// Rebuilds a marketplace from a snapshot.
    ///
    /// The ledger is expected to already hold the custody backing the
    /// snapshot's Pending executions.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidInput` if the configuration is invalid,
    /// ids are not dense, an execution refers to an unknown model, or a
    /// model's counters disagree with its execution records.
    pub fn restore(
        snapshot: MarketSnapshot,
        ledger: Arc<dyn Ledger>,
        ownership: Arc<dyn OwnershipRegistry>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let guard = AccessGuard::from_config(&snapshot.config)?;
        let registry = ModelRegistry::from_models(snapshot.models)?;
        let executions = ExecutionBook::from_records(snapshot.executions)?;

        if let Some(orphan) = executions
            .records()
            .iter()
            .find(|r| !registry.exists(r.model_id))
        {
            return Err(MarketError::invalid_input(format!(
                "{} refers to unknown {}",
                orphan.id, orphan.model_id
            )));
        }
        check_model_totals(&registry, &executions)?;

        info!(
            models = registry.len(),
            executions = executions.len(),
            event_sequence = snapshot.event_sequence,
            "marketplace restored from snapshot"
        );
        Ok(Self::from_state(
            MarketState {
                registry,
                executions,
                guard,
                event_sequence: snapshot.event_sequence,
            },
            ledger,
            ownership,
            events,
        ))
    }
}

/// Recomputes each model's derived fields from its executions.
///
/// `total_executions` must count the Completed records, and `rating` must
/// equal the incremental fold of the rated records in id order. Every record
/// must have paid the model's price.
fn check_model_totals(registry: &ModelRegistry, executions: &ExecutionBook) -> Result<()> {
    let mut totals = vec![(0u64, RatingAggregate::new()); registry.len()];

    for record in executions.records() {
        let model = registry.require(record.model_id)?;
        if record.paid_amount != model.price_per_execution {
            return Err(MarketError::invalid_input(format!(
                "{} paid {} but {} costs {}",
                record.id, record.paid_amount, model.id, model.price_per_execution
            )));
        }
        let index = usize::try_from(record.model_id.value() - 1)
            .map_err(|_| MarketError::ModelNotFound(record.model_id))?;
        let (completed, rating) = &mut totals[index];
        if record.status == ExecutionStatus::Completed {
            *completed += 1;
        }
        if record.is_rated() {
            rating.record(record.user_rating)?;
        }
    }

    for (model, (completed, rating)) in registry.models().iter().zip(totals) {
        if model.total_executions != completed {
            return Err(MarketError::invalid_input(format!(
                "{} reports {} executions but {} completed",
                model.id, model.total_executions, completed
            )));
        }
        if model.rating != rating {
            return Err(MarketError::invalid_input(format!(
                "{} rating {}/{} does not match its rated executions ({}/{})",
                model.id,
                model.rating_scaled(),
                model.rating_count(),
                rating.scaled(),
                rating.count()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::execution::SettlementOutcome;
    use crate::marketplace::test_support::*;
    use mart_core::{Amount, ContentRef, ExecutionId, ModelId};
    use mart_events::NoopEventSink;
    use mart_ledger::InMemoryOwnershipRegistry;

    fn populated() -> Harness {
        let h = harness();
        let model_id = h.register(100);
        let done = h.request(model_id);
        h.market
            .complete_execution(&oracle(), done, SettlementOutcome::Completed, ContentRef::new("o"))
            .unwrap();
        h.market.rate_execution(&user(), done, 5).unwrap();
        h.request(model_id);
        h
    }

    #[test]
    fn snapshot_roundtrips_through_json() {
        let h = populated();
        let snapshot = h.market.snapshot();
        assert_eq!(snapshot.models.len(), 1);
        assert_eq!(snapshot.executions.len(), 2);

        let restored = MarketSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn restore_rebuilds_indices_and_continues_ids() {
        let h = populated();
        let snapshot = h.market.snapshot();
        let sequence = snapshot.event_sequence;

        let market = Marketplace::restore(
            snapshot,
            h.ledger.clone(),
            Arc::new(InMemoryOwnershipRegistry::new()),
            Arc::new(NoopEventSink::new()),
        )
        .unwrap();

        assert_eq!(market.models_by_creator(&creator()), vec![ModelId::new(1)]);
        assert_eq!(
            market.executions_by_user(&user()),
            vec![ExecutionId::new(1), ExecutionId::new(2)]
        );
        assert_eq!(market.get_model(ModelId::new(1)).unwrap().rating_scaled(), 500);
        assert_eq!(market.pending_executions().len(), 1);
        assert_eq!(market.event_sequence(), sequence);

        h.ledger.fund(&user(), Amount::new(100));
        let next = market
            .request_execution(&user(), ModelId::new(1), ContentRef::new("in"))
            .unwrap();
        assert_eq!(next, ExecutionId::new(3));
        assert_eq!(market.event_sequence(), sequence + 1);

        let settled = market
            .complete_execution(&oracle(), ExecutionId::new(2), SettlementOutcome::Failed, ContentRef::default())
            .unwrap();
        assert_eq!(settled.credited, Amount::new(100));
    }

    #[test]
    fn restore_rejects_orphan_execution() {
        let h = populated();
        let mut snapshot = h.market.snapshot();
        snapshot.models.clear();

        let err = Marketplace::restore(
            snapshot,
            h.ledger.clone(),
            Arc::new(InMemoryOwnershipRegistry::new()),
            Arc::new(NoopEventSink::new()),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn restore_rejects_invalid_config() {
        let h = populated();
        let mut snapshot = h.market.snapshot();
        snapshot.config.platform_fee_bps = 2000;

        let err = Marketplace::restore(
            snapshot,
            h.ledger.clone(),
            Arc::new(InMemoryOwnershipRegistry::new()),
            Arc::new(NoopEventSink::new()),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn malformed_json_is_snapshot_error() {
        assert_eq!(MarketSnapshot::from_json("{").unwrap_err().kind(), ErrorKind::Snapshot);
    }

    fn restore_err(snapshot: MarketSnapshot) -> MarketError {
        Marketplace::restore(
            snapshot,
            Arc::new(mart_ledger::InMemoryLedger::new()),
            Arc::new(InMemoryOwnershipRegistry::new()),
            Arc::new(NoopEventSink::new()),
        )
        .unwrap_err()
    }

    fn settled_unrated() -> MarketSnapshot {
        let h = harness();
        let model_id = h.register(100);
        let id = h.request(model_id);
        h.market
            .complete_execution(&oracle(), id, SettlementOutcome::Completed, ContentRef::new("o"))
            .unwrap();
        h.market.snapshot()
    }

    #[test]
    fn restore_rejects_inflated_execution_count() {
        let mut snapshot = settled_unrated();
        snapshot.models[0].total_executions = 42;
        assert_eq!(restore_err(snapshot).kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn restore_rejects_rating_without_rated_executions() {
        let mut snapshot = settled_unrated();
        snapshot.models[0].rating = RatingAggregate::from_parts(500, 7);
        assert_eq!(restore_err(snapshot).kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn restore_rejects_paid_amount_below_price() {
        let mut snapshot = settled_unrated();
        snapshot.executions[0].paid_amount = Amount::new(1);
        assert_eq!(restore_err(snapshot).kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn restore_rejects_rated_record_missing_from_aggregate() {
        let mut snapshot = populated().market.snapshot();
        snapshot.models[0].rating = RatingAggregate::new();
        assert_eq!(restore_err(snapshot).kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn restore_replays_rating_fold_in_id_order() {
        let h = harness();
        let model_id = h.register(10);
        for rating in [5, 4, 4, 1] {
            let id = h.request(model_id);
            h.market
                .complete_execution(&oracle(), id, SettlementOutcome::Completed, ContentRef::new("o"))
                .unwrap();
            h.market.rate_execution(&user(), id, rating).unwrap();
        }
        let snapshot = h.market.snapshot();
        assert_eq!(snapshot.models[0].rating_scaled(), 349);

        let market = Marketplace::restore(
            snapshot,
            h.ledger.clone(),
            Arc::new(InMemoryOwnershipRegistry::new()),
            Arc::new(NoopEventSink::new()),
        )
        .unwrap();
        let model = market.get_model(model_id).unwrap();
        assert_eq!(model.rating_scaled(), 349);
        assert_eq!(model.total_executions, 4);
    }
}
