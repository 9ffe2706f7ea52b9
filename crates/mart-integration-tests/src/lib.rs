//! Integration test crate for the model marketplace.
//!
//! This crate exists solely to run tests that span the marketplace crates.
//! It has no public API - all functionality is in the test modules.

#![forbid(unsafe_code)]
