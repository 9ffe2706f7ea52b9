//! # mart-ledger
//!
//! External collaborators of the model marketplace.
//!
//! The marketplace never moves funds itself. It asks a [`Ledger`] to debit a
//! payer into custody or to credit a payee out of custody, and it asks an
//! [`OwnershipRegistry`] to mint an ownership token when a model is
//! registered. Both are all-or-nothing: a call either fully succeeds or
//! fails with no effect.
//!
//! This crate provides:
//!
//! - [`Ledger`] / [`OwnershipRegistry`] - The seams the marketplace consumes
//! - [`InMemoryLedger`] - Simulated ledger with account freezing for fault injection
//! - [`InMemoryOwnershipRegistry`] - Simulated registry recording minted tokens
//!
//! ## Example
//!
//! ```rust
//! use mart_core::{Amount, Principal};
//! use mart_ledger::{InMemoryLedger, Ledger};
//!
//! let ledger = InMemoryLedger::new();
//! let alice = Principal::new("alice");
//! ledger.fund(&alice, Amount::new(1_000));
//!
//! ledger.debit(&alice, Amount::new(400)).unwrap();
//! assert_eq!(ledger.balance_of(&alice), Amount::new(600));
//! assert_eq!(ledger.custody_balance(), Amount::new(400));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod ledger;
pub mod registry;

pub use error::{LedgerError, Result};
pub use ledger::{InMemoryLedger, Ledger, Transfer, TransferDirection, TransferId};
pub use registry::{InMemoryOwnershipRegistry, OwnershipRegistry};
