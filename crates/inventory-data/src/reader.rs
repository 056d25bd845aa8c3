//! CSV file discovery and ingestion.
//!
//! Parses one inventory export into canonical [`Resource`] records. Row-level
//! problems are absorbed and counted in [`IngestDiagnostics`]; only a file
//! whose structure cannot be read at all yields an error.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use inventory_core::error::{InventoryError, Result, RowError};
use inventory_core::models::Resource;
use inventory_core::schema::ColumnAliases;
use serde::Serialize;
use tracing::{debug, warn};

use crate::decoder::DecodeFailure;
use crate::normalizer::RowNormalizer;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ── Public types ──────────────────────────────────────────────────────────────

/// Options shared by every file in an ingestion batch.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Column-name aliases for core and structured fields.
    pub aliases: ColumnAliases,
}

/// A dropped row and the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// Zero-based data-row index within the file.
    pub row: usize,
    pub reason: String,
}

/// Recoverable problems encountered while ingesting one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestDiagnostics {
    /// Data rows seen (excluding the header and blank lines).
    pub rows_read: usize,
    /// Rows dropped because normalization failed.
    pub row_failures: Vec<RowFailure>,
    /// Structured cells that degraded to an empty mapping.
    pub decode_failures: Vec<DecodeFailure>,
}

impl IngestDiagnostics {
    pub fn rows_dropped(&self) -> usize {
        self.row_failures.len()
    }

    fn record_row_failure(&mut self, file: &str, row: usize, err: RowError) {
        warn!("{}: dropping row {}: {}", file, row, err);
        self.row_failures.push(RowFailure {
            row,
            reason: err.to_string(),
        });
    }
}

/// Ingestion summary for one file.
#[derive(Debug, Clone)]
pub struct IngestedFile {
    pub file_name: String,
    pub file_size: u64,
    /// Rows successfully normalized; always `resources.len()`.
    pub record_count: usize,
    /// Normalized resources, in source row order.
    pub resources: Vec<Resource>,
    pub diagnostics: IngestDiagnostics,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `data_path`, sorted by path.
///
/// A path that is itself a file is returned as-is.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }
    if data_path.is_file() {
        return vec![data_path.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Read `path` from disk and ingest it under its file name.
pub fn ingest_path(path: &Path, options: &IngestOptions) -> Result<IngestedFile> {
    let bytes = std::fs::read(path).map_err(|source| InventoryError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    ingest_bytes(&name, &bytes, options)
}

/// Ingest one uploaded blob.
///
/// A header-only or empty file is a successful load with zero records.
/// Fails with [`InventoryError::FileParse`] only when the header row itself
/// cannot be read.
pub fn ingest_bytes(file_name: &str, bytes: &[u8], options: &IngestOptions) -> Result<IngestedFile> {
    let ingested_at: DateTime<Utc> = Utc::now();
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(body);

    let headers = read_headers(file_name, &mut reader)?;
    let normalizer = RowNormalizer::new(&options.aliases, file_name, ingested_at);

    let mut resources: Vec<Resource> = Vec::new();
    let mut diagnostics = IngestDiagnostics::default();
    let mut record = csv::ByteRecord::new();
    let mut index = 0usize;

    loop {
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(e) => {
                diagnostics.rows_read += 1;
                diagnostics.record_row_failure(file_name, index, RowError::Malformed(e.to_string()));
                index += 1;
                continue;
            }
        }

        diagnostics.rows_read += 1;
        if headers.is_empty() {
            return Err(InventoryError::parse(file_name, "header row has no column names"));
        }

        let normalized = RowNormalizer::bind(&headers, &record)
            .and_then(|row| normalizer.normalize(row, index));
        match normalized {
            Ok(out) => {
                for failure in &out.decode_failures {
                    warn!(
                        "{}: row {}: failed to decode {} from column '{}': {}",
                        file_name,
                        failure.row,
                        failure.field.as_str(),
                        failure.column,
                        failure.message
                    );
                }
                diagnostics.decode_failures.extend(out.decode_failures);
                resources.push(out.resource);
            }
            Err(e) => diagnostics.record_row_failure(file_name, index, e),
        }
        index += 1;
    }

    debug!(
        "File {}: {} rows read, {} normalized, {} dropped, {} decode failures",
        file_name,
        diagnostics.rows_read,
        resources.len(),
        diagnostics.rows_dropped(),
        diagnostics.decode_failures.len(),
    );

    Ok(IngestedFile {
        file_name: file_name.to_string(),
        file_size: bytes.len() as u64,
        record_count: resources.len(),
        resources,
        diagnostics,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Read and deduplicate the header row.
///
/// Repeated names get a `_1`, `_2`, … suffix so no column is shadowed.
/// An all-blank header row is treated as no header.
fn read_headers<R: std::io::Read>(file_name: &str, reader: &mut csv::Reader<R>) -> Result<Vec<String>> {
    let raw = reader
        .headers()
        .map_err(|e| InventoryError::parse(file_name, e))?
        .clone();

    if raw.iter().all(|h| h.is_empty()) {
        return Ok(Vec::new());
    }

    let mut headers: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw.iter() {
        let mut candidate = name.to_string();
        let mut suffix = 0usize;
        while headers.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", name, suffix);
        }
        headers.push(candidate);
    }
    Ok(headers)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
