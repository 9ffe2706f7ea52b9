//! Fee split and settlement receipts.

use mart_core::{Amount, ExecutionId, Principal};
use serde::{Deserialize, Serialize};

use crate::config::BPS_DENOMINATOR;
use crate::execution::SettlementOutcome;

/// How a paid amount is divided on successful completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Amount credited to the model's creator.
    pub creator_cut: Amount,
    /// Amount left in custody for the platform.
    pub platform_cut: Amount,
}

/// Splits `paid` between creator and platform.
///
/// The platform cut is `paid * fee_bps / 10000`, truncated toward zero; the
/// creator receives the remainder, so the two cuts always sum to `paid`.
///
/// # Examples
/// ```
/// use mart_core::Amount;
/// use mart_market::split_payment;
///
/// let split = split_payment(Amount::new(1000), 250);
/// assert_eq!(split.creator_cut, Amount::new(975));
/// assert_eq!(split.platform_cut, Amount::new(25));
/// ```
#[must_use]
pub fn split_payment(paid: Amount, fee_bps: u16) -> FeeSplit {
    // u128 so paid * fee_bps cannot overflow for any u64 amount.
    let platform = u128::from(paid.units()) * u128::from(fee_bps) / u128::from(BPS_DENOMINATOR);
    // fee_bps <= 10000 in practice, so platform <= paid; saturate otherwise.
    let platform_cut = Amount::new(platform.min(u128::from(paid.units())) as u64);

    FeeSplit {
        creator_cut: paid.saturating_sub(platform_cut),
        platform_cut,
    }
}

/// What a successful settlement paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    /// Settled execution.
    pub execution_id: ExecutionId,
    /// Reported outcome.
    pub outcome: SettlementOutcome,
    /// Creator on completion, requesting user on failure.
    pub payee: Principal,
    /// Amount credited to `payee`.
    pub credited: Amount,
    /// Amount retained in custody as platform fee (zero on failure).
    pub platform_cut: Amount,
}
