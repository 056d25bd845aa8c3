//! Runtime layer for the inventory explorer.
//!
//! Owns the canonical resource collection, runs concurrent all-or-nothing
//! upload batches and memoizes the statistics for the active filter.

pub mod session;
pub mod store;

pub use inventory_core as core;
pub use inventory_data as data;
