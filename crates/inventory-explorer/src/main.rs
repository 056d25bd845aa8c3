mod bootstrap;
mod report;

use anyhow::{Context, Result};
use inventory_core::settings::Settings;
use inventory_data::reader::IngestOptions;
use inventory_runtime::session::ExplorerSession;
use inventory_runtime::store::{BatchOptions, InventoryStore, Upload};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Inventory Explorer v{} starting", env!("CARGO_PKG_VERSION"));

    let files = bootstrap::collect_input_files(&settings.paths)?;
    tracing::info!("Loading {} CSV file(s) as one batch", files.len());

    let mut uploads = Vec::with_capacity(files.len());
    for path in &files {
        uploads.push(Upload::from_path(path).await?);
    }

    let defaults = BatchOptions::default();
    let options = BatchOptions {
        ingest: IngestOptions::default(),
        max_parallel_files: settings
            .max_parallel_files
            .unwrap_or(defaults.max_parallel_files),
    };

    let mut session = ExplorerSession::new(InventoryStore::with_options(options));
    let batch = session.ingest_batch(uploads).await?;

    session.set_filter(settings.filter_spec());
    let filter = session.filter().clone();
    let document = report::build_report(&batch, &filter, session.snapshot());
    println!("{}", serde_json::to_string_pretty(&document)?);

    if let Some(dir) = settings.export_dir.as_ref() {
        let today = chrono::Local::now().date_naive();
        let target = bootstrap::export_path(dir, &settings.export_prefix, today);
        let bytes = session.export()?;
        tokio::fs::write(&target, bytes)
            .await
            .with_context(|| format!("writing export to {}", target.display()))?;
        tracing::info!("Exported {} resource(s) to {}", session.view().len(), target.display());
    }

    Ok(())
}
