//! Serialize a filtered view back to CSV.
//!
//! Output uses the canonical header names, so it re-ingests through the
//! default aliases. Structured fields are re-encoded as compact JSON; an
//! empty mapping is written as an empty cell.

use std::collections::HashSet;

use chrono::{NaiveDate, SecondsFormat};
use indexmap::IndexSet;
use inventory_core::error::{InventoryError, Result};
use inventory_core::models::Resource;
use inventory_core::schema::columns;

/// `<prefix>-<YYYY-MM-DD>.csv`.
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.csv", prefix, date.format("%Y-%m-%d"))
}

const LEADING: [&str; 4] = [
    columns::ACCOUNT_ID,
    columns::REGION,
    columns::SERVICE,
    columns::RESOURCE_TYPE,
];

const TRAILING: [&str; 4] = [
    columns::TAGS,
    columns::METADATA,
    columns::SOURCE_FILE,
    columns::INGESTED_AT,
];

/// A passthrough column and the header it is written under.
struct ExtraColumn<'r> {
    key: &'r str,
    header: String,
}

/// Header row for `view`: core columns, the union of passthrough columns in
/// first-seen order, then the structured and provenance columns.
///
/// A passthrough column whose name collides with a canonical header is
/// written as `<name>_1` (`_2`, ...), like duplicate input headers.
pub fn export_headers(view: &[&Resource]) -> Vec<String> {
    let extras = extra_columns(view);
    LEADING
        .iter()
        .map(|c| c.to_string())
        .chain(extras.into_iter().map(|e| e.header))
        .chain(TRAILING.iter().map(|c| c.to_string()))
        .collect()
}

/// Serialize `view` as CSV bytes with a header row.
pub fn export_csv(view: &[&Resource]) -> Result<Vec<u8>> {
    let extras = extra_columns(view);
    let width = LEADING.len() + extras.len() + TRAILING.len();

    let mut writer = csv::Writer::from_writer(Vec::new());
    let headers = LEADING
        .iter()
        .copied()
        .chain(extras.iter().map(|e| e.header.as_str()))
        .chain(TRAILING.iter().copied());
    writer.write_record(headers)?;

    for resource in view {
        let mut record: Vec<String> = Vec::with_capacity(width);
        record.push(resource.account_id.clone());
        record.push(resource.region.clone());
        record.push(resource.service.clone());
        record.push(resource.resource_type.clone());
        for column in &extras {
            record.push(resource.extra.get(column.key).cloned().unwrap_or_default());
        }
        record.push(encode_map(&resource.tags, resource.tags.is_empty())?);
        record.push(encode_map(&resource.metadata, resource.metadata.is_empty())?);
        record.push(resource.source_file.clone());
        record.push(
            resource
                .ingested_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| InventoryError::Export(e.to_string()))
}

fn extra_columns<'r>(view: &[&'r Resource]) -> Vec<ExtraColumn<'r>> {
    let mut keys: IndexSet<&'r str> = IndexSet::new();
    for resource in view.iter().copied() {
        for key in resource.extra.keys() {
            keys.insert(key.as_str());
        }
    }

    let mut taken: HashSet<String> = LEADING
        .iter()
        .chain(TRAILING.iter())
        .map(|c| c.to_string())
        .collect();
    // Unchanged names are claimed first so a suffixed name never steals one.
    taken.extend(keys.iter().map(|k| k.to_string()));

    keys.into_iter()
        .map(|key| {
            let header = if LEADING.contains(&key) || TRAILING.contains(&key) {
                let header = (1..)
                    .map(|n| format!("{}_{}", key, n))
                    .find(|candidate| !taken.contains(candidate))
                    .unwrap_or_else(|| key.to_string());
                taken.insert(header.clone());
                header
            } else {
                key.to_string()
            };
            ExtraColumn { key, header }
        })
        .collect()
}

/// Compact JSON for a non-empty map, empty string otherwise.
fn encode_map<M: serde::Serialize>(map: &M, is_empty: bool) -> Result<String> {
    if is_empty {
        return Ok(String::new());
    }
    Ok(serde_json::to_string(map)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
