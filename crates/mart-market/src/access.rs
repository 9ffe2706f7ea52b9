//! Access guard and owner-only administration.
//!
//! Roles are decided by comparing the caller's principal, passed explicitly
//! on every call, against the principals stored in [`AccessGuard`].

use std::fmt;

use mart_core::{Amount, ModelId, Principal};
use mart_events::MarketEvent;
use tracing::{info, warn};

use crate::config::{check_fee, MarketConfig};
use crate::error::{MarketError, Result};
use crate::marketplace::Marketplace;

/// Role an operation requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The marketplace owner.
    Owner,
    /// The oracle or the owner.
    OracleOrOwner,
    /// The user who requested the execution.
    Requester,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::OracleOrOwner => write!(f, "oracle or owner"),
            Self::Requester => write!(f, "the requester"),
        }
    }
}

/// Stored role holders and the platform fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGuard {
    owner: Principal,
    oracle: Principal,
    platform_fee_bps: u16,
}

impl AccessGuard {
    /// Builds a guard from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error.
    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            owner: config.owner.clone(),
            oracle: config.oracle.clone(),
            platform_fee_bps: config.platform_fee_bps,
        })
    }

    /// Current settings as a configuration.
    #[must_use]
    pub fn to_config(&self) -> MarketConfig {
        MarketConfig::new(self.owner.clone(), self.oracle.clone())
            .with_platform_fee(self.platform_fee_bps)
    }

    /// The owner.
    #[must_use]
    pub const fn owner(&self) -> &Principal {
        &self.owner
    }

    /// The oracle.
    #[must_use]
    pub const fn oracle(&self) -> &Principal {
        &self.oracle
    }

    /// The platform fee in basis points.
    #[must_use]
    pub const fn platform_fee_bps(&self) -> u16 {
        self.platform_fee_bps
    }

    /// Fails unless `caller` is the owner.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthorized`.
    pub fn require_owner(&self, caller: &Principal) -> Result<()> {
        if caller == &self.owner {
            return Ok(());
        }
        warn!(caller = %caller, required = %Role::Owner, "unauthorized call");
        Err(MarketError::Unauthorized {
            caller: caller.clone(),
            required: Role::Owner,
        })
    }

    /// Fails unless `caller` is the oracle or the owner.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthorized`.
    pub fn require_settler(&self, caller: &Principal) -> Result<()> {
        if caller == &self.oracle || caller == &self.owner {
            return Ok(());
        }
        warn!(caller = %caller, required = %Role::OracleOrOwner, "unauthorized call");
        Err(MarketError::Unauthorized {
            caller: caller.clone(),
            required: Role::OracleOrOwner,
        })
    }

    fn replace_oracle(&mut self, oracle: Principal) -> Result<Principal> {
        if oracle.is_null() {
            return Err(MarketError::invalid_input("oracle must not be empty"));
        }
        Ok(std::mem::replace(&mut self.oracle, oracle))
    }

    fn replace_fee(&mut self, bps: u16) -> Result<u16> {
        check_fee(bps)?;
        Ok(std::mem::replace(&mut self.platform_fee_bps, bps))
    }
}

impl Marketplace {
    /// Replaces the oracle. Owner only.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-owners, `InvalidInput` for a null principal.
    pub fn set_oracle(&self, caller: &Principal, oracle: Principal) -> Result<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        state.guard.require_owner(caller)?;
        let old = state.guard.replace_oracle(oracle.clone())?;

        self.emit(
            state,
            MarketEvent::OracleUpdated {
                old: old.clone(),
                new: oracle.clone(),
            },
        );
        info!(old = %old, new = %oracle, "oracle updated");
        Ok(())
    }

    /// Sets the platform fee. Owner only; at most 1000 bps.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-owners, `InvalidInput` above 1000 bps.
    pub fn set_platform_fee(&self, caller: &Principal, bps: u16) -> Result<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        state.guard.require_owner(caller)?;
        let old_bps = state.guard.replace_fee(bps)?;

        self.emit(
            state,
            MarketEvent::PlatformFeeUpdated {
                old_bps,
                new_bps: bps,
            },
        );
        info!(old_bps, new_bps = bps, "platform fee updated");
        Ok(())
    }

    /// Transfers the entire custodial balance to the owner.
    ///
    /// The balance is whatever the ledger reports for custody, which includes
    /// funds of executions that are still Pending.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-owners, `NothingToWithdraw` on an empty
    /// custody, `PaymentFailed` if the ledger rejects the transfer.
    pub fn withdraw_fees(&self, caller: &Principal) -> Result<Amount> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        state.guard.require_owner(caller)?;
        let balance = self.ledger.custody_balance();
        if balance.is_zero() {
            return Err(MarketError::NothingToWithdraw);
        }

        let owner = state.guard.owner().clone();
        if let Err(e) = self.ledger.credit(&owner, balance) {
            warn!(owner = %owner, amount = %balance, error = %e, "fee withdrawal rejected");
            return Err(e.into());
        }

        self.emit(
            state,
            MarketEvent::FeesWithdrawn {
                to: owner.clone(),
                amount: balance,
            },
        );
        info!(owner = %owner, amount = %balance, "fees withdrawn");
        Ok(balance)
    }

    /// Sets a model's active flag. Owner only.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-owners, `ModelNotFound` for unknown models.
    pub fn set_model_active(&self, caller: &Principal, model_id: ModelId, active: bool) -> Result<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        state.guard.require_owner(caller)?;
        state.registry.require_mut(model_id)?.is_active = active;

        self.emit(state, MarketEvent::ModelActivationChanged { model_id, active });
        info!(model_id = %model_id, active, "model activation changed");
        Ok(())
    }

    /// Flips a model's active flag and returns the new value. Owner only.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-owners, `ModelNotFound` for unknown models.
    pub fn toggle_model_active(&self, caller: &Principal, model_id: ModelId) -> Result<bool> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        state.guard.require_owner(caller)?;
        let model = state.registry.require_mut(model_id)?;
        model.is_active = !model.is_active;
        let active = model.is_active;

        self.emit(state, MarketEvent::ModelActivationChanged { model_id, active });
        info!(model_id = %model_id, active, "model activation toggled");
        Ok(active)
    }
}
