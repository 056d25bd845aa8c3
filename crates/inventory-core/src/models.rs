use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel filter value meaning "do not constrain this criterion".
pub const MATCH_ALL: &str = "all";

/// Tag set attached to a resource.
pub type Tags = BTreeMap<String, String>;

/// Free-form metadata attached to a resource.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One normalized inventory row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Owning cloud account; empty when the export omitted it.
    #[serde(default)]
    pub account_id: String,
    /// Region identifier such as `us-east-1`.
    #[serde(default)]
    pub region: String,
    /// Short service identifier such as `ec2` or `s3`.
    #[serde(default)]
    pub service: String,
    /// Service-specific resource kind such as `instance` or `bucket`.
    #[serde(default)]
    pub resource_type: String,
    /// Decoded tag set (empty when absent or undecodable).
    #[serde(default)]
    pub tags: Tags,
    /// Decoded metadata blob (empty when absent or undecodable).
    #[serde(default)]
    pub metadata: Metadata,
    /// Passthrough columns, in header order.
    #[serde(default)]
    pub extra: IndexMap<String, String>,
    /// Name of the file that produced this record.
    pub source_file: String,
    /// When the row was normalized.
    pub ingested_at: DateTime<Utc>,
}

impl Resource {
    /// Compact JSON text of the tag set, e.g. `{"env":"prod"}`.
    pub fn tags_json(&self) -> String {
        serde_json::to_string(&self.tags).unwrap_or_default()
    }

    /// `true` when the resource carries at least one tag.
    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }
}

/// File Registry entry for one ingested file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedFile {
    /// File name as supplied by the uploader. Not unique across uploads.
    pub name: String,
    /// Size of the uploaded blob in bytes.
    pub size_bytes: u64,
    /// Rows successfully normalized (zero allowed).
    pub record_count: usize,
    /// When the batch containing this file was committed.
    pub loaded_at: DateTime<Utc>,
}

/// Conjunctive filter over the canonical collection.
///
/// Every criterion is optional; `None` or the [`MATCH_ALL`] sentinel leaves
/// the criterion unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl FilterSpec {
    /// A filter that matches every resource.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_source_file(mut self, name: impl Into<String>) -> Self {
        self.source_file = Some(name.into());
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Active value of an exact-match criterion, or `None` when it is
    /// unset or the [`MATCH_ALL`] sentinel.
    pub fn active(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| *v != MATCH_ALL)
    }

    /// Active search term; empty terms match everything.
    pub fn active_search(&self) -> Option<&str> {
        self.search_term.as_deref().filter(|t| !t.is_empty())
    }

    /// `true` when no criterion constrains the result.
    pub fn is_unfiltered(&self) -> bool {
        Self::active(&self.account_id).is_none()
            && Self::active(&self.region).is_none()
            && Self::active(&self.source_file).is_none()
            && Self::active(&self.category).is_none()
            && self.active_search().is_none()
    }
}
