//! Core domain types and logic.

pub mod error;
pub mod holding;
pub mod series;
pub mod snapshot;
pub mod metrics;
pub mod rebalance;
