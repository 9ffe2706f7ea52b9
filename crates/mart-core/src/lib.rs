//! # mart-core
//!
//! Primitives shared by every crate of the model marketplace.
//!
//! This crate provides:
//!
//! - [`Amount`] - Payment amount in the smallest indivisible unit
//! - [`ModelId`] / [`ExecutionId`] - Record identifiers in separate namespaces
//! - [`Principal`] - Identity of a participant (creator, user, owner, oracle)
//! - [`ContentRef`] - Opaque reference to off-core model/input/output data
//! - [`ExecutionStatus`] - Pending → Completed | Failed state machine
//! - [`RatingAggregate`] - Running, incrementally truncated rating mean

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod error;
pub mod ids;
pub mod principal;
pub mod rating;
pub mod status;

pub use amount::Amount;
pub use error::CoreError;
pub use ids::{ExecutionId, ModelId};
pub use principal::{ContentRef, Principal};
pub use rating::{RatingAggregate, MAX_RATING, MIN_RATING, RATING_SCALE};
pub use status::ExecutionStatus;
