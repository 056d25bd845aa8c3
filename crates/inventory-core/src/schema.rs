//! Column-name aliasing for inventory exports.
//!
//! Export tools disagree on header spelling and some of them mis-escape the
//! structured columns (`'tags_json'`, `"tags_json"`). Every logical field
//! therefore resolves through an ordered list of accepted column names; new
//! quirks are added here as data, not as new lookup code.

use serde::{Deserialize, Serialize};

/// Canonical header names written by the exporter.
pub mod columns {
    pub const ACCOUNT_ID: &str = "accountid";
    pub const REGION: &str = "region";
    pub const SERVICE: &str = "service";
    pub const RESOURCE_TYPE: &str = "resource_type";
    pub const TAGS: &str = "tags_json";
    pub const METADATA: &str = "metadata_json";
    pub const SOURCE_FILE: &str = "source_file";
    pub const INGESTED_AT: &str = "ingested_at";
}

/// Logical fields that are resolved through aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    AccountId,
    Region,
    Service,
    ResourceType,
    Tags,
    Metadata,
}

impl LogicalField {
    /// Lowercase name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalField::AccountId => "account_id",
            LogicalField::Region => "region",
            LogicalField::Service => "service",
            LogicalField::ResourceType => "resource_type",
            LogicalField::Tags => "tags",
            LogicalField::Metadata => "metadata",
        }
    }
}

/// Ordered candidate column names per logical field.
///
/// The first candidate present in a row wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAliases {
    pub account_id: Vec<String>,
    pub region: Vec<String>,
    pub service: Vec<String>,
    pub resource_type: Vec<String>,
    pub tags: Vec<String>,
    pub metadata: Vec<String>,
    /// Provenance columns that are re-stamped on ingest and therefore
    /// dropped from the passthrough set.
    #[serde(default = "default_reserved")]
    pub reserved: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn default_reserved() -> Vec<String> {
    owned(&[columns::SOURCE_FILE, columns::INGESTED_AT])
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            account_id: owned(&["accountid", "account_id", "accountId", "account"]),
            region: owned(&["region"]),
            service: owned(&["service"]),
            resource_type: owned(&["resource_type", "resourceType", "resource-type"]),
            tags: owned(&["'tags_json'", "tags_json", "tags", "\"tags_json\""]),
            metadata: owned(&[
                "'metadata_json'",
                "metadata_json",
                "metadata",
                "\"metadata_json\"",
            ]),
            reserved: default_reserved(),
        }
    }
}

impl ColumnAliases {
    /// Candidate names for `field`, in priority order.
    pub fn candidates(&self, field: LogicalField) -> &[String] {
        match field {
            LogicalField::AccountId => &self.account_id,
            LogicalField::Region => &self.region,
            LogicalField::Service => &self.service,
            LogicalField::ResourceType => &self.resource_type,
            LogicalField::Tags => &self.tags,
            LogicalField::Metadata => &self.metadata,
        }
    }

    /// Append an extra accepted spelling for `field`.
    pub fn add_alias(&mut self, field: LogicalField, name: impl Into<String>) {
        let name = name.into();
        let list = match field {
            LogicalField::AccountId => &mut self.account_id,
            LogicalField::Region => &mut self.region,
            LogicalField::Service => &mut self.service,
            LogicalField::ResourceType => &mut self.resource_type,
            LogicalField::Tags => &mut self.tags,
            LogicalField::Metadata => &mut self.metadata,
        };
        if !list.contains(&name) {
            list.push(name);
        }
    }

    /// First candidate for `field` that satisfies `present`.
    pub fn resolve<'a>(
        &'a self,
        field: LogicalField,
        present: impl Fn(&str) -> bool,
    ) -> Option<&'a str> {
        self.candidates(field)
            .iter()
            .map(String::as_str)
            .find(|name| present(name))
    }

    /// `true` when `column` is a reserved provenance column.
    pub fn is_reserved(&self, column: &str) -> bool {
        self.reserved.iter().any(|r| r == column)
    }
}
