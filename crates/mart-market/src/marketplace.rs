//! The marketplace facade.
//!
//! [`Marketplace`] owns all records behind one reader-writer lock. Mutating
//! operations (implemented across the `engine`, `rating`, `access` and
//! `snapshot` modules) hold the write lock from their first precondition
//! check through the ledger call to the final record write. Reads take the
//! read lock and return clones, so callers never see a torn record.

use std::sync::Arc;

use mart_core::{Amount, ExecutionId, ModelId, Principal};
use mart_events::{EventEnvelope, EventSink, MarketEvent};
use mart_ledger::{Ledger, OwnershipRegistry};
use parking_lot::RwLock;
use tracing::info;

use crate::access::AccessGuard;
use crate::config::MarketConfig;
use crate::engine::ExecutionBook;
use crate::error::Result;
use crate::execution::ExecutionRecord;
use crate::model::{AIModel, Category, ModelListing};
use crate::registry::ModelRegistry;

/// Everything guarded by the marketplace lock.
#[derive(Debug)]
pub(crate) struct MarketState {
    pub(crate) registry: ModelRegistry,
    pub(crate) executions: ExecutionBook,
    pub(crate) guard: AccessGuard,
    pub(crate) event_sequence: u64,
}

/// AI model marketplace with escrowed execution payments.
pub struct Marketplace {
    pub(crate) state: RwLock<MarketState>,
    pub(crate) ledger: Arc<dyn Ledger>,
    pub(crate) ownership: Arc<dyn OwnershipRegistry>,
    pub(crate) events: Arc<dyn EventSink>,
}

impl Marketplace {
    /// Creates an empty marketplace.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidInput` if `config` fails validation.
    pub fn new(
        config: MarketConfig,
        ledger: Arc<dyn Ledger>,
        ownership: Arc<dyn OwnershipRegistry>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let guard = AccessGuard::from_config(&config)?;
        info!(
            owner = %config.owner,
            oracle = %config.oracle,
            fee_bps = config.platform_fee_bps,
            "marketplace created"
        );
        Ok(Self::from_state(
            MarketState {
                registry: ModelRegistry::new(),
                executions: ExecutionBook::new(),
                guard,
                event_sequence: 0,
            },
            ledger,
            ownership,
            events,
        ))
    }

    pub(crate) fn from_state(
        state: MarketState,
        ledger: Arc<dyn Ledger>,
        ownership: Arc<dyn OwnershipRegistry>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            state: RwLock::new(state),
            ledger,
            ownership,
            events,
        }
    }

    /// Assigns the next sequence number and publishes `event`.
    ///
    /// Callers hold the write lock, so sequence order matches operation order.
    pub(crate) fn emit(&self, state: &mut MarketState, event: MarketEvent) {
        state.event_sequence += 1;
        self.events
            .publish(&EventEnvelope::new(state.event_sequence, event));
    }

    /// Registers a model for `creator` and mints its ownership token.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidInput` for a null creator, an empty name
    /// or content reference, or a zero price.
    pub fn register_model(&self, creator: &Principal, listing: ModelListing) -> Result<ModelId> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let name = listing.name.clone();
        let price = listing.price_per_execution;
        let model_id = state.registry.register(creator, listing)?;

        self.ownership.mint_ownership_token(creator, model_id);
        self.emit(
            state,
            MarketEvent::ModelRegistered {
                model_id,
                creator: creator.clone(),
                name: name.clone(),
                price,
            },
        );

        info!(model_id = %model_id, creator = %creator, name = %name, price = %price, "model registered");
        Ok(model_id)
    }

    /// True iff the model id was allocated and holds a creator.
    #[must_use]
    pub fn model_exists(&self, id: ModelId) -> bool {
        self.state.read().registry.exists(id)
    }

    /// Returns a copy of a model.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::ModelNotFound` if the model does not exist.
    pub fn get_model(&self, id: ModelId) -> Result<AIModel> {
        self.state.read().registry.require(id).cloned()
    }

    /// Active models in `category`, ascending by id. Evaluated fresh per call.
    #[must_use]
    pub fn list_by_category(&self, category: Category) -> Vec<ModelId> {
        self.state.read().registry.list_by_category(category)
    }

    /// Models registered by `creator`, in registration order.
    #[must_use]
    pub fn models_by_creator(&self, creator: &Principal) -> Vec<ModelId> {
        self.state.read().registry.by_creator(creator)
    }

    /// Number of registered models (equal to the last allocated model id).
    #[must_use]
    pub fn model_count(&self) -> u64 {
        self.state.read().registry.last_id()
    }

    /// Returns a copy of an execution record.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::ExecutionNotFound` if the execution does not exist.
    pub fn get_execution(&self, id: ExecutionId) -> Result<ExecutionRecord> {
        self.state.read().executions.require(id).cloned()
    }

    /// Executions requested by `user`, in request order.
    #[must_use]
    pub fn executions_by_user(&self, user: &Principal) -> Vec<ExecutionId> {
        self.state.read().executions.by_user(user)
    }

    /// Number of execution requests (equal to the last allocated execution id).
    #[must_use]
    pub fn execution_count(&self) -> u64 {
        self.state.read().executions.last_id()
    }

    /// Current platform fee in basis points.
    #[must_use]
    pub fn platform_fee_bps(&self) -> u16 {
        self.state.read().guard.platform_fee_bps()
    }

    /// Current owner.
    #[must_use]
    pub fn owner(&self) -> Principal {
        self.state.read().guard.owner().clone()
    }

    /// Current oracle.
    #[must_use]
    pub fn oracle(&self) -> Principal {
        self.state.read().guard.oracle().clone()
    }

    /// Balance the ledger holds in the marketplace's custody.
    #[must_use]
    pub fn custody_balance(&self) -> Amount {
        self.ledger.custody_balance()
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_sequence(&self) -> u64 {
        self.state.read().event_sequence
    }
}

impl std::fmt::Debug for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Marketplace")
            .field("models", &state.registry.len())
            .field("executions", &state.executions.len())
            .field("fee_bps", &state.guard.platform_fee_bps())
            .finish_non_exhaustive()
    }
}
