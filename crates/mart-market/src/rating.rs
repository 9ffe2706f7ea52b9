//! Rating aggregation: one rating per completed execution.

use mart_core::{ExecutionId, ExecutionStatus, Principal, RatingAggregate};
use mart_events::MarketEvent;
use tracing::info;

use crate::access::Role;
use crate::error::{MarketError, Result};
use crate::marketplace::Marketplace;

impl Marketplace {
    /// Records `user`'s 1-5 rating of a completed execution and folds it into
    /// the model's running average.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `rating` is outside 1-5
    /// - `ExecutionNotFound` if the id is out of range
    /// - `Unauthorized` unless `user` requested the execution
    /// - `NotSettled` unless the execution completed successfully
    /// - `AlreadyRated` if the execution was rated before
    pub fn rate_execution(
        &self,
        user: &Principal,
        execution_id: ExecutionId,
        rating: u8,
    ) -> Result<()> {
        RatingAggregate::validate(rating)?;

        let mut guard = self.state.write();
        let state = &mut *guard;

        let record = state.executions.require_mut(execution_id)?;
        if &record.user != user {
            return Err(MarketError::Unauthorized {
                caller: user.clone(),
                required: Role::Requester,
            });
        }
        if record.status != ExecutionStatus::Completed {
            return Err(MarketError::NotSettled(execution_id));
        }
        if record.is_rated() {
            return Err(MarketError::AlreadyRated(execution_id));
        }

        let model_id = record.model_id;
        let model = state.registry.require_mut(model_id)?;
        let aggregate = model.rating.with_rating(rating)?;

        record.user_rating = rating;
        model.rating = aggregate;

        self.emit(
            state,
            MarketEvent::ExecutionCompleted {
                execution_id,
                status: ExecutionStatus::Completed,
                rating,
            },
        );
        self.emit(
            state,
            MarketEvent::ModelRated {
                model_id,
                execution_id,
                rating,
                user: user.clone(),
            },
        );

        info!(
            execution_id = %execution_id,
            model_id = %model_id,
            rating,
            model_rating = aggregate.scaled(),
            rating_count = aggregate.count(),
            "execution rated"
        );
        Ok(())
    }
}
