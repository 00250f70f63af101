//! AWS-oriented adapters and handlers for the stamp ledger.
//!
//! This crate owns runtime integration details (the Lambda handler, counter
//! store adapters, configuration and telemetry) and re-exports the core
//! contract under a single `runtime` module boundary.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod telemetry;

pub mod runtime {
    pub use stamp_ledger_core::{contract, record, stamps};
}
