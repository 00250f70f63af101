//! Shared stamp ledger domain primitives.
//!
//! This crate owns request parsing, the counter record model and the pure
//! counter arithmetic. It intentionally excludes AWS SDK and Lambda runtime
//! concerns; those live in `stamp_ledger_lambda`.

pub mod contract;
pub mod record;
pub mod stamps;
