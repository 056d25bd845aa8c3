//! Raw row → [`Resource`] conversion.

use chrono::{DateTime, Utc};
use csv::ByteRecord;
use inventory_core::error::RowError;
use inventory_core::models::Resource;
use inventory_core::schema::{ColumnAliases, LogicalField};

use crate::decoder::{into_tags, DecodeFailure, FieldDecoder, RawRow};

/// A normalized row plus any recoverable decode problems it had.
#[derive(Debug, Clone)]
pub struct NormalizedRow {
    pub resource: Resource,
    pub decode_failures: Vec<DecodeFailure>,
}

/// Turns raw rows of one file into canonical resources.
#[derive(Debug, Clone)]
pub struct RowNormalizer<'a> {
    aliases: &'a ColumnAliases,
    source_file: &'a str,
    ingested_at: DateTime<Utc>,
}

impl<'a> RowNormalizer<'a> {
    /// `ingested_at` is stamped on every resource this normalizer produces.
    pub fn new(aliases: &'a ColumnAliases, source_file: &'a str, ingested_at: DateTime<Utc>) -> Self {
        Self {
            aliases,
            source_file,
            ingested_at,
        }
    }

    /// Bind a CSV record to the header row.
    ///
    /// Short records leave their trailing columns absent; records longer
    /// than the header, or with non-UTF-8 cells, are row failures.
    pub fn bind(headers: &[String], record: &ByteRecord) -> Result<RawRow, RowError> {
        if record.len() > headers.len() {
            return Err(RowError::TooManyFields {
                expected: headers.len(),
                found: record.len(),
            });
        }

        let mut row = RawRow::with_capacity(record.len());
        for (header, cell) in headers.iter().zip(record.iter()) {
            let value = std::str::from_utf8(cell).map_err(|_| RowError::InvalidUtf8)?;
            row.insert(header.clone(), value.to_string());
        }
        Ok(row)
    }

    /// Normalize one bound row.
    pub fn normalize(&self, mut row: RawRow, index: usize) -> Result<NormalizedRow, RowError> {
        if self.source_file.is_empty() {
            return Err(RowError::Malformed("resource has no source file".to_string()));
        }

        let decoder = FieldDecoder::new(self.aliases);
        let tags = decoder.decode(&mut row, LogicalField::Tags);
        let metadata = decoder.decode(&mut row, LogicalField::Metadata);

        let decode_failures: Vec<DecodeFailure> = [
            tags.failure(index, LogicalField::Tags),
            metadata.failure(index, LogicalField::Metadata),
        ]
        .into_iter()
        .flatten()
        .collect();

        let account_id = self.take_core(&mut row, LogicalField::AccountId);
        let region = self.take_core(&mut row, LogicalField::Region);
        let service = self.take_core(&mut row, LogicalField::Service);
        let resource_type = self.take_core(&mut row, LogicalField::ResourceType);

        row.retain(|column, _| !self.aliases.is_reserved(column));

        Ok(NormalizedRow {
            resource: Resource {
                account_id,
                region,
                service,
                resource_type,
                tags: into_tags(tags.value),
                metadata: metadata.value,
                extra: row,
                source_file: self.source_file.to_string(),
                ingested_at: self.ingested_at,
            },
            decode_failures,
        })
    }

    /// Remove the first aliased column for `field`; absent means empty.
    ///
    /// The cell is kept verbatim so exact-match filters see the source value.
    fn take_core(&self, row: &mut RawRow, field: LogicalField) -> String {
        let column = self
            .aliases
            .resolve(field, |name| row.contains_key(name))
            .map(str::to_string);
        column
            .and_then(|c| row.shift_remove(&c))
            .unwrap_or_default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
