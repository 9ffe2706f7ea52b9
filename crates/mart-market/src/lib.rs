//! # mart-market
//!
//! Marketplace ledger matching AI-model listings to paid execution requests.
//!
//! This crate provides:
//!
//! - Model registry (registration, lookup, category listing)
//! - Execution engine (payment custody on request, oracle-driven settlement)
//! - Rating aggregation (one rating per completed execution)
//! - Access guard (owner/oracle roles, fee bounds, emergency toggles)
//!
//! Every mutating call on [`Marketplace`] runs under one write lock, so
//! operations apply one at a time in a single total order, and a failed
//! call leaves no trace.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mart_core::{Amount, ContentRef, ExecutionStatus, Principal};
//! use mart_events::NoopEventSink;
//! use mart_ledger::{InMemoryLedger, InMemoryOwnershipRegistry};
//! use mart_market::{Category, MarketConfig, Marketplace, ModelListing, SettlementOutcome};
//!
//! # fn main() -> Result<(), mart_market::MarketError> {
//! let owner = Principal::new("owner");
//! let oracle = Principal::new("oracle");
//! let ledger = Arc::new(InMemoryLedger::new());
//! let market = Marketplace::new(
//!     MarketConfig::new(owner, oracle.clone()),
//!     ledger.clone(),
//!     Arc::new(InMemoryOwnershipRegistry::new()),
//!     Arc::new(NoopEventSink::new()),
//! )?;
//!
//! let creator = Principal::new("creator");
//! let model_id = market.register_model(
//!     &creator,
//!     ModelListing::new("summarizer", ContentRef::new("Qm..."), Amount::new(1000), Category::TextGeneration),
//! )?;
//!
//! let user = Principal::new("user");
//! ledger.fund(&user, Amount::new(1000));
//! let execution_id = market.request_execution(&user, model_id, ContentRef::new("input"))?;
//!
//! market.complete_execution(&oracle, execution_id, SettlementOutcome::Completed, ContentRef::new("output"))?;
//! assert_eq!(ledger.balance_of(&creator), Amount::new(975));
//! assert_eq!(market.get_execution(execution_id)?.status, ExecutionStatus::Completed);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod access;
pub mod config;
pub mod engine;
pub mod error;
pub mod execution;
pub mod marketplace;
pub mod model;
pub mod rating;
pub mod registry;
pub mod settlement;
pub mod snapshot;

pub use access::{AccessGuard, Role};
pub use config::{
    MarketConfig, BPS_DENOMINATOR, DEFAULT_PLATFORM_FEE_BPS, MAX_PLATFORM_FEE_BPS,
};
pub use engine::ExecutionBook;
pub use error::{ErrorKind, MarketError, Result};
pub use execution::{ExecutionRecord, SettlementOutcome};
pub use marketplace::Marketplace;
pub use model::{AIModel, Category, ModelListing};
pub use registry::ModelRegistry;
pub use settlement::{split_payment, FeeSplit, SettlementReceipt};
pub use snapshot::MarketSnapshot;
