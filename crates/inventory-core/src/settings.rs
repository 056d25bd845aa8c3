use clap::Parser;
use std::path::PathBuf;

use crate::catalog;
use crate::error::{InventoryError, Result};
use crate::models::{FilterSpec, MATCH_ALL};

/// Default file-name prefix for exported views.
pub const DEFAULT_EXPORT_PREFIX: &str = "aws-inventory-combined";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Explore merged cloud-inventory CSV exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "inventory-explorer",
    about = "Explore merged cloud-inventory CSV exports",
    version
)]
pub struct Settings {
    /// CSV files or directories to load as one batch (directories are
    /// searched recursively for `.csv` files)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Only keep resources of this account
    #[arg(long)]
    pub account: Option<String>,

    /// Only keep resources in this region
    #[arg(long)]
    pub region: Option<String>,

    /// Only keep resources loaded from this file name
    #[arg(long)]
    pub file: Option<String>,

    /// Case-insensitive search over service, resource type and tags
    #[arg(long)]
    pub search: Option<String>,

    /// Only keep resources of this service category
    #[arg(long)]
    pub category: Option<String>,

    /// Write the filtered view as CSV into this directory
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// File-name prefix for the exported CSV
    #[arg(long, default_value = DEFAULT_EXPORT_PREFIX)]
    pub export_prefix: String,

    /// Maximum number of files parsed concurrently
    #[arg(long, env = "INVENTORY_MAX_PARALLEL_FILES")]
    pub max_parallel_files: Option<usize>,

    /// Logging level
    #[arg(
        long,
        default_value = "INFO",
        env = "INVENTORY_LOG_LEVEL",
        value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"]
    )]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse process arguments and apply `--debug`.
    pub fn load() -> Result<Self> {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values clap cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if let Some(category) = self.category.as_deref() {
            if category != MATCH_ALL && catalog::category(category).is_none() {
                return Err(InventoryError::Config(format!(
                    "unknown category '{}' (expected one of: {})",
                    category,
                    catalog::category_names().join(", ")
                )));
            }
        }
        if self.max_parallel_files == Some(0) {
            return Err(InventoryError::Config(
                "--max-parallel-files must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Filter described by the command-line flags.
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            account_id: self.account.clone(),
            region: self.region.clone(),
            source_file: self.file.clone(),
            search_term: self.search.clone(),
            category: self.category.clone(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
