//! The canonical resource collection and File Registry.
//!
//! [`InventoryStore`] is the single owner of every loaded [`Resource`]. Its
//! only write paths are [`InventoryStore::ingest_batch`],
//! [`InventoryStore::remove_file`] and [`InventoryStore::clear_all`]; all
//! other access is through shared references, so the borrow checker
//! enforces the single-writer, multiple-reader discipline. Callers sharing
//! a store across tasks wrap it in a lock.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexSet;
use inventory_core::error::{InventoryError, Result};
use inventory_core::models::{FilterSpec, LoadedFile, Resource};
use inventory_data::filter;
use inventory_data::reader::{ingest_bytes, IngestDiagnostics, IngestOptions, IngestedFile};
use serde::Serialize;
use tokio::sync::Semaphore;

// ── Public types ──────────────────────────────────────────────────────────────

/// One named blob of an upload batch.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read `path` from disk; the upload is named after the file name.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| InventoryError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// Options for batch ingestion.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub ingest: IngestOptions,
    /// Upper bound on files parsed at the same time.
    pub max_parallel_files: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            ingest: IngestOptions::default(),
            max_parallel_files: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Per-file outcome of a committed batch.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub file_name: String,
    pub file_size: u64,
    pub record_count: usize,
    pub diagnostics: IngestDiagnostics,
}

impl From<&IngestedFile> for FileSummary {
    fn from(file: &IngestedFile) -> Self {
        Self {
            file_name: file.file_name.clone(),
            file_size: file.file_size,
            record_count: file.record_count,
            diagnostics: file.diagnostics.clone(),
        }
    }
}

/// Summary of a committed batch, in file-selection order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileSummary>,
}

impl BatchReport {
    pub fn total_records(&self) -> usize {
        self.files.iter().map(|f| f.record_count).sum()
    }
}

// ── InventoryStore ────────────────────────────────────────────────────────────

/// Canonical collection of resources plus the File Registry.
#[derive(Debug, Default)]
pub struct InventoryStore {
    resources: Vec<Resource>,
    files: Vec<LoadedFile>,
    /// Bumped on every mutation; lets readers detect stale derived data.
    generation: u64,
    options: BatchOptions,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BatchOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    // ── Write paths ───────────────────────────────────────────────────────

    /// Parse every upload concurrently, then commit them all or none.
    ///
    /// Files are committed in the order of `uploads`, regardless of which
    /// parse finished first. If any file fails to parse, the error names the
    /// first failing file (in selection order) and the store is unchanged.
    /// Dropping the returned future before it resolves abandons the batch.
    pub async fn ingest_batch(&mut self, uploads: Vec<Upload>) -> Result<BatchReport> {
        if uploads.is_empty() {
            return Ok(BatchReport::default());
        }

        let parsed = parse_batch(uploads, &self.options).await?;
        Ok(self.commit(parsed))
    }

    /// Drop every resource loaded from `name` and its registry entries.
    ///
    /// Returns the number of resources removed; a no-op for unknown names.
    pub fn remove_file(&mut self, name: &str) -> usize {
        let before = self.resources.len();
        let files_before = self.files.len();
        self.resources.retain(|r| r.source_file != name);
        self.files.retain(|f| f.name != name);

        let removed = before - self.resources.len();
        if removed > 0 || files_before != self.files.len() {
            self.generation += 1;
            tracing::info!(file = name, removed, "file removed from inventory");
        }
        removed
    }

    /// Empty both the resource collection and the File Registry.
    pub fn clear_all(&mut self) {
        if self.resources.is_empty() && self.files.is_empty() {
            return;
        }
        self.resources.clear();
        self.files.clear();
        self.generation += 1;
        tracing::info!("inventory cleared");
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn files(&self) -> &[LoadedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Ordered view of the resources matching `spec`.
    pub fn filter(&self, spec: &FilterSpec) -> Vec<&Resource> {
        filter::apply(&self.resources, spec)
    }

    /// Distinct account IDs, in first-seen order.
    pub fn accounts(&self) -> Vec<&str> {
        self.distinct(|r| &r.account_id)
    }

    /// Distinct regions, in first-seen order.
    pub fn regions(&self) -> Vec<&str> {
        self.distinct(|r| &r.region)
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn distinct<'s>(&'s self, key_fn: impl Fn(&'s Resource) -> &'s String) -> Vec<&'s str> {
        self.resources
            .iter()
            .map(|r| key_fn(r).as_str())
            .collect::<IndexSet<&str>>()
            .into_iter()
            .collect()
    }

    fn commit(&mut self, parsed: Vec<IngestedFile>) -> BatchReport {
        let loaded_at = Utc::now();
        let mut report = BatchReport::default();

        for file in parsed {
            report.files.push(FileSummary::from(&file));
            self.files.push(LoadedFile {
                name: file.file_name,
                size_bytes: file.file_size,
                record_count: file.record_count,
                loaded_at,
            });
            self.resources.extend(file.resources);
        }
        self.generation += 1;

        tracing::info!(
            files = report.files.len(),
            records = report.total_records(),
            total = self.resources.len(),
            "upload batch committed"
        );
        report
    }
}

// ── Batch parsing ─────────────────────────────────────────────────────────────

/// Parse all uploads on the blocking pool, at most
/// `options.max_parallel_files` at a time.
///
/// Results come back in `uploads` order. Every parse runs to completion
/// before the outcome is decided.
pub async fn parse_batch(uploads: Vec<Upload>, options: &BatchOptions) -> Result<Vec<IngestedFile>> {
    let semaphore = Arc::new(Semaphore::new(options.max_parallel_files.max(1)));
    let ingest = Arc::new(options.ingest.clone());

    let handles: Vec<_> = uploads
        .into_iter()
        .map(|upload| {
            let semaphore = Arc::clone(&semaphore);
            let ingest = Arc::clone(&ingest);
            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| InventoryError::TaskJoin(e.to_string()))?;
                tokio::task::spawn_blocking(move || {
                    ingest_bytes(&upload.name, &upload.bytes, &ingest)
                })
                .await
                .map_err(|e| InventoryError::TaskJoin(e.to_string()))?
            })
        })
        .collect();

    let mut outcomes: Vec<Result<IngestedFile>> = Vec::with_capacity(handles.len());
    for handle in handles {
        let outcome = handle
            .await
            .map_err(|e| InventoryError::TaskJoin(e.to_string()))
            .and_then(|r| r);
        outcomes.push(outcome);
    }

    let mut parsed = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(file) => parsed.push(file),
            Err(e) => {
                tracing::warn!(error = %e, "upload batch rejected");
                return Err(e);
            }
        }
    }
    Ok(parsed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "accountid,region,service,resource_type,tags_json\n";

    fn csv(rows: &[&str]) -> Vec<u8> {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text.into_bytes()
    }

    fn file_a() -> Upload {
        Upload::new(
            "a.csv",
            csv(&[r#"111,us-east-1,ec2,instance,"{""env"":""prod""}""#]),
        )
    }

    fn file_b() -> Upload {
        Upload::new("b.csv", csv(&["222,eu-west-1,s3,bucket,'{}'"]))
    }

    fn corrupt(name: &str) -> Upload {
        Upload::new(name, b"acc\xffid,region\n1,2\n".to_vec())
    }

    fn names(store: &InventoryStore) -> Vec<String> {
        store.files().iter().map(|f| f.name.clone()).collect()
    }

    // ── ingest_batch ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_ingest_batch_two_files() {
        let mut store = InventoryStore::new();
        let report = store.ingest_batch(vec![file_a(), file_b()]).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(report.total_records(), 2);
        assert_eq!(names(&store), vec!["a.csv", "b.csv"]);
        assert_eq!(store.resources()[0].source_file, "a.csv");
        assert_eq!(store.resources()[1].source_file, "b.csv");
        assert_eq!(store.generation(), 1);
    }

    #[tokio::test]
    async fn test_commit_order_is_selection_order() {
        // A large first file finishes last but must still be committed first.
        let big_rows: Vec<String> = (0..5_000)
            .map(|i| format!("{i},us-east-1,ec2,instance,"))
            .collect();
        let big_refs: Vec<&str> = big_rows.iter().map(String::as_str).collect();
        let big = Upload::new("big.csv", csv(&big_refs));

        let mut store = InventoryStore::with_options(BatchOptions {
            max_parallel_files: 4,
            ..BatchOptions::default()
        });
        store.ingest_batch(vec![big, file_b(), file_a()]).await.unwrap();

        assert_eq!(names(&store), vec!["big.csv", "b.csv", "a.csv"]);
        assert_eq!(store.resources()[0].account_id, "0");
        assert_eq!(store.resources()[4_999].account_id, "4999");
        assert_eq!(store.resources()[5_000].source_file, "b.csv");
        assert_eq!(store.resources()[5_001].source_file, "a.csv");
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_store_unchanged() {
        let mut store = InventoryStore::new();
        store.ingest_batch(vec![file_a()]).await.unwrap();
        let generation = store.generation();

        let err = store
            .ingest_batch(vec![file_b(), corrupt("bad.csv")])
            .await
            .unwrap_err();

        assert_eq!(err.file_name(), Some("bad.csv"));
        assert_eq!(store.len(), 1);
        assert_eq!(names(&store), vec!["a.csv"]);
        assert_eq!(store.generation(), generation);
    }

    #[tokio::test]
    async fn test_failed_batch_reports_first_failure_in_selection_order() {
        let mut store = InventoryStore::new();
        let err = store
            .ingest_batch(vec![corrupt("first.csv"), file_a(), corrupt("second.csv")])
            .await
            .unwrap_err();
        assert_eq!(err.file_name(), Some("first.csv"));
        assert!(store.is_empty());
        assert!(store.files().is_empty());
    }

    #[tokio::test]
    async fn test_zero_row_file_is_registered() {
        let mut store = InventoryStore::new();
        let report = store
            .ingest_batch(vec![Upload::new("empty.csv", HEADER)])
            .await
            .unwrap();

        assert!(store.is_empty());
        assert_eq!(store.files().len(), 1);
        assert_eq!(store.files()[0].name, "empty.csv");
        assert_eq!(store.files()[0].record_count, 0);
        assert_eq!(store.files()[0].size_bytes, HEADER.len() as u64);
        assert_eq!(report.files[0].record_count, 0);
    }

    #[tokio::test]
    async fn test_same_name_appends_duplicates() {
        let mut store = InventoryStore::new();
        store.ingest_batch(vec![file_a()]).await.unwrap();
        store.ingest_batch(vec![file_a()]).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(names(&store), vec!["a.csv", "a.csv"]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let mut store = InventoryStore::new();
        let report = store.ingest_batch(Vec::new()).await.unwrap();
        assert!(report.files.is_empty());
        assert_eq!(store.generation(), 0);
    }

    #[tokio::test]
    async fn test_batch_shares_loaded_at() {
        let mut store = InventoryStore::new();
        store.ingest_batch(vec![file_a(), file_b()]).await.unwrap();
        assert_eq!(store.files()[0].loaded_at, store.files()[1].loaded_at);
    }

    #[tokio::test]
    async fn test_diagnostics_reported_per_file() {
        let mut store = InventoryStore::new();
        let upload = Upload::new(
            "messy.csv",
            csv(&["111,us-east-1,ec2,instance,{bad", "111,us-east-1,ec2,instance,,extra"]),
        );
        let report = store.ingest_batch(vec![upload]).await.unwrap();

        let diag = &report.files[0].diagnostics;
        assert_eq!(report.files[0].record_count, 1);
        assert_eq!(diag.decode_failures.len(), 1);
        assert_eq!(diag.rows_dropped(), 1);
    }

    // ── remove_file / clear_all ───────────────────────────────────────────

    #[tokio::test]
    async fn test_remove_file_exact() {
        let mut store = InventoryStore::new();
        store.ingest_batch(vec![file_a(), file_b()]).await.unwrap();

        let removed = store.remove_file("a.csv");

        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.resources().iter().all(|r| r.source_file == "b.csv"));
        assert_eq!(names(&store), vec!["b.csv"]);
    }

    #[tokio::test]
    async fn test_remove_file_unknown_is_noop() {
        let mut store = InventoryStore::new();
        store.ingest_batch(vec![file_a()]).await.unwrap();
        let generation = store.generation();

        assert_eq!(store.remove_file("missing.csv"), 0);
        assert_eq!(store.len(), 1);
        assert_eq!(store.generation(), generation);
    }

    #[tokio::test]
    async fn test_remove_zero_row_file_drops_registry_entry() {
        let mut store = InventoryStore::new();
        store
            .ingest_batch(vec![Upload::new("empty.csv", HEADER)])
            .await
            .unwrap();
        assert_eq!(store.remove_file("empty.csv"), 0);
        assert!(store.files().is_empty());
        assert_eq!(store.generation(), 2);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let mut store = InventoryStore::new();
        store.ingest_batch(vec![file_a(), file_b()]).await.unwrap();

        store.clear_all();
        assert!(store.is_empty());
        assert!(store.files().is_empty());

        let generation = store.generation();
        store.clear_all();
        assert_eq!(store.generation(), generation);
    }

    // ── read access ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_filter_by_region() {
        let mut store = InventoryStore::new();
        store.ingest_batch(vec![file_a(), file_b()]).await.unwrap();

        let view = store.filter(&FilterSpec::all().with_region("eu-west-1"));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].source_file, "b.csv");
    }

    #[tokio::test]
    async fn test_accounts_and_regions_first_seen() {
        let mut store = InventoryStore::new();
        store
            .ingest_batch(vec![file_b(), file_a(), file_b()])
            .await
            .unwrap();
        assert_eq!(store.accounts(), vec!["222", "111"]);
        assert_eq!(store.regions(), vec!["eu-west-1", "us-east-1"]);
    }

    // ── Upload ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_upload_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("acct.csv");
        std::fs::write(&path, HEADER).unwrap();

        let upload = Upload::from_path(&path).await.unwrap();
        assert_eq!(upload.name, "acct.csv");
        assert_eq!(upload.bytes, HEADER.as_bytes());
    }

    #[tokio::test]
    async fn test_upload_from_missing_path() {
        let err = Upload::from_path(Path::new("/tmp/does-not-exist-inventory.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::FileRead { .. }));
    }

    #[test]
    fn test_batch_options_default_parallelism() {
        assert!(BatchOptions::default().max_parallel_files >= 1);
    }
}
