//! Core types for the inventory explorer.
//!
//! Holds the canonical data model, the error taxonomy, the static region and
//! service-category catalogs, column-alias configuration and the CLI
//! settings shared by every other crate in the workspace.

pub mod catalog;
pub mod error;
pub mod models;
pub mod schema;
pub mod settings;

pub use error::{InventoryError, Result, RowError};
pub use models::{FilterSpec, LoadedFile, Resource, MATCH_ALL};
