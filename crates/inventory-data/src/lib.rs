//! Data layer for the inventory explorer.
//!
//! Decodes structured CSV cells, normalizes rows into canonical resources,
//! ingests whole files, filters the merged collection, computes the grouped
//! statistics tables and exports views back to CSV. Everything here is
//! synchronous and free of shared mutable state.

pub mod aggregator;
pub mod decoder;
pub mod exporter;
pub mod filter;
pub mod normalizer;
pub mod reader;

pub use inventory_core as core;
