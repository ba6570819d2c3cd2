//! # dfdl-test
//!
//! End-to-end tests for dfdl-store.
//!
//! This crate contains:
//! - Session scenarios against the in-memory store
//! - Emulator scenarios, run when `BIGTABLE_EMULATOR_HOST` is set
//! - Helpers for capturing program output and log events

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Test utilities and helpers
pub mod utils;
