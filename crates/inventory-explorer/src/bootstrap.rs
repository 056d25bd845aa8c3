use std::path::{Path, PathBuf};

use inventory_core::error::{InventoryError, Result};
use inventory_data::exporter::export_file_name;
use inventory_data::reader::find_csv_files;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name to an [`EnvFilter`] directive.
///
/// Unrecognised names are passed through unchanged.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber on stderr.
///
/// `RUST_LOG`, when set, takes precedence over `log_level`. Stdout stays
/// reserved for the JSON report.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level_directive(log_level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry().with(filter).with(layer).init();

    Ok(())
}

// ── Input discovery ────────────────────────────────────────────────────────────

/// Expand the command-line paths into one ordered list of CSV files.
///
/// Files are kept in argument order; each directory contributes its CSV
/// files sorted by path.
pub fn collect_input_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(InventoryError::DataPathNotFound(path.clone()));
        }
        let found = find_csv_files(path);
        if found.is_empty() {
            return Err(InventoryError::NoDataFiles(path.clone()));
        }
        files.extend(found);
    }
    Ok(files)
}

/// Destination for an export written on `date`.
pub fn export_path(dir: &Path, prefix: &str, date: chrono::NaiveDate) -> PathBuf {
    dir.join(export_file_name(prefix, date))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("warning"), "warn");
        assert_eq!(level_directive("ERROR"), "error");
        assert_eq!(level_directive("trace"), "trace");
    }

    #[test]
    fn test_collect_input_files_keeps_argument_order() {
        let tmp = TempDir::new().expect("tempdir");
        let dir = tmp.path().join("exports");
        std::fs::create_dir_all(dir.join("nested")).expect("mkdir");
        std::fs::write(dir.join("b.csv"), "accountid\n").expect("write");
        std::fs::write(dir.join("nested").join("a.CSV"), "accountid\n").expect("write");
        std::fs::write(dir.join("notes.txt"), "ignore").expect("write");
        let single = tmp.path().join("z.csv");
        std::fs::write(&single, "accountid\n").expect("write");

        let files = collect_input_files(&[single.clone(), dir.clone()]).expect("collect");

        assert_eq!(
            files,
            vec![single, dir.join("b.csv"), dir.join("nested").join("a.CSV")]
        );
    }

    #[test]
    fn test_collect_input_files_missing_path() {
        let tmp = TempDir::new().expect("tempdir");
        let missing = tmp.path().join("nope");
        let err = collect_input_files(&[missing.clone()]).unwrap_err();
        assert!(matches!(err, InventoryError::DataPathNotFound(p) if p == missing));
    }

    #[test]
    fn test_collect_input_files_empty_directory() {
        let tmp = TempDir::new().expect("tempdir");
        let err = collect_input_files(&[tmp.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, InventoryError::NoDataFiles(_)));
    }

    #[test]
    fn test_export_path() {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 31).expect("date");
        let path = export_path(Path::new("/tmp/out"), "aws-inventory-combined", date);
        assert_eq!(
            path,
            PathBuf::from("/tmp/out/aws-inventory-combined-2025-01-31.csv")
        );
    }
}
