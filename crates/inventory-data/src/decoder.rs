//! Structured sub-field decoding (tags and metadata columns).
//!
//! A structured column holds a JSON object serialized into a single CSV
//! cell. Export tools are inconsistent about how they quote both the header
//! and the cell, so lookup goes through [`ColumnAliases`] and one layer of
//! stray quoting is stripped before parsing. Decoding never fails the row:
//! a bad cell degrades to an empty mapping plus a [`DecodeFailure`].

use indexmap::IndexMap;
use inventory_core::models::{Metadata, Tags};
use inventory_core::schema::{ColumnAliases, LogicalField};
use serde::Serialize;
use serde_json::Value;

/// One data row keyed by (deduplicated) header name, in header order.
pub type RawRow = IndexMap<String, String>;

/// A structured cell that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeFailure {
    /// Zero-based data-row index within the file.
    pub row: usize,
    /// Which logical field was being decoded.
    pub field: LogicalField,
    /// Column the value was read from.
    pub column: String,
    /// Parser message.
    pub message: String,
}

/// Result of decoding one structured field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedField {
    /// Decoded object; empty when absent, blank, `null` or undecodable.
    pub value: Metadata,
    /// Column that was consumed, if any alias matched.
    pub column: Option<String>,
    /// Decode error message, when the cell was present but malformed.
    pub error: Option<String>,
}

impl DecodedField {
    /// Convert the failure (if any) into a diagnostic for `row`.
    pub fn failure(&self, row: usize, field: LogicalField) -> Option<DecodeFailure> {
        let message = self.error.as_ref()?;
        Some(DecodeFailure {
            row,
            field,
            column: self.column.clone().unwrap_or_default(),
            message: message.clone(),
        })
    }
}

/// Locates and decodes structured columns using a configured alias list.
#[derive(Debug, Clone, Copy)]
pub struct FieldDecoder<'a> {
    aliases: &'a ColumnAliases,
}

impl<'a> FieldDecoder<'a> {
    pub fn new(aliases: &'a ColumnAliases) -> Self {
        Self { aliases }
    }

    /// Decode `field` out of `row`.
    ///
    /// The first alias present in the row is consumed (removed from `row`)
    /// whether or not its value decodes.
    pub fn decode(&self, row: &mut RawRow, field: LogicalField) -> DecodedField {
        let Some(column) = self
            .aliases
            .resolve(field, |name| row.contains_key(name))
            .map(str::to_string)
        else {
            return DecodedField::default();
        };

        let raw = row.shift_remove(&column).unwrap_or_default();
        match decode_object(&raw) {
            Ok(value) => DecodedField {
                value,
                column: Some(column),
                error: None,
            },
            Err(message) => DecodedField {
                value: Metadata::new(),
                column: Some(column),
                error: Some(message),
            },
        }
    }
}

/// Strip exactly one layer of matching surrounding `'` or `"` quotes.
pub fn strip_matching_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if first == last && (first == b'\'' || first == b'"') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Decode a raw cell into a JSON object.
///
/// Blank cells and the literal `null` (with or without one quote layer)
/// decode to an empty object without error.
pub fn decode_object(raw: &str) -> Result<Metadata, String> {
    let trimmed = raw.trim();
    if is_blank(trimmed) {
        return Ok(Metadata::new());
    }

    let inner = strip_matching_quotes(trimmed);
    if is_blank(inner.trim()) {
        return Ok(Metadata::new());
    }

    match serde_json::from_str::<Value>(inner) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Metadata::new()),
        Ok(other) => Err(format!("expected a JSON object, found {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

/// Flatten a decoded object into a string-valued tag set.
///
/// String values are kept as-is; any other JSON value is stored as its
/// compact JSON text.
pub fn into_tags(map: Metadata) -> Tags {
    map.into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect()
}

fn is_blank(value: &str) -> bool {
    value.is_empty() || value == "null"
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ── strip_matching_quotes ─────────────────────────────────────────────────

    #[test]
    fn test_strip_single_quotes() {
        assert_eq!(strip_matching_quotes("'{\"a\":1}'"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_double_quotes() {
        assert_eq!(strip_matching_quotes("\"{}\""), "{}");
    }

    #[test]
    fn test_strip_only_one_layer() {
        assert_eq!(strip_matching_quotes("''{}''"), "'{}'");
    }

    #[test]
    fn test_strip_mismatched_quotes_untouched() {
        assert_eq!(strip_matching_quotes("'{}\""), "'{}\"");
        assert_eq!(strip_matching_quotes("'"), "'");
    }

    // ── decode_object ─────────────────────────────────────────────────────────

    #[test]
    fn test_decode_plain_object() {
        let map = decode_object(r#"{"env":"prod"}"#).unwrap();
        assert_eq!(Value::Object(map), json!({"env": "prod"}));
    }

    #[test]
    fn test_decode_single_quoted_object() {
        let map = decode_object(r#"  '{"env":"prod","team":"core"}'  "#).unwrap();
        assert_eq!(Value::Object(map), json!({"env": "prod", "team": "core"}));
    }

    #[test]
    fn test_decode_double_quoted_object() {
        let map = decode_object(r#""{"owner":"ops"}""#).unwrap();
        assert_eq!(Value::Object(map), json!({"owner": "ops"}));
    }

    #[test]
    fn test_decode_quoted_empty_object() {
        assert!(decode_object("'{}'").unwrap().is_empty());
    }

    #[test]
    fn test_decode_blank_and_null() {
        assert!(decode_object("").unwrap().is_empty());
        assert!(decode_object("   ").unwrap().is_empty());
        assert!(decode_object("null").unwrap().is_empty());
        assert!(decode_object("'null'").unwrap().is_empty());
    }

    #[test]
    fn test_decode_malformed_json_is_error() {
        let err = decode_object("{env: prod").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn test_decode_non_object_is_error() {
        let err = decode_object("[1,2,3]").unwrap_err();
        assert_eq!(err, "expected a JSON object, found an array");
    }

    #[test]
    fn test_decode_nested_metadata() {
        let map = decode_object(r#"{"size":20,"encrypted":true,"attachments":[{"id":"a"}]}"#)
            .unwrap();
        assert_eq!(map["size"], json!(20));
        assert_eq!(map["encrypted"], json!(true));
        assert_eq!(map["attachments"][0]["id"], json!("a"));
    }

    // ── FieldDecoder ──────────────────────────────────────────────────────────

    #[test]
    fn test_decoder_consumes_column() {
        let aliases = ColumnAliases::default();
        let decoder = FieldDecoder::new(&aliases);
        let mut r = row(&[("service", "ec2"), ("tags_json", r#"{"env":"prod"}"#)]);

        let decoded = decoder.decode(&mut r, LogicalField::Tags);

        assert_eq!(decoded.column.as_deref(), Some("tags_json"));
        assert!(decoded.error.is_none());
        assert_eq!(decoded.value["env"], json!("prod"));
        assert!(!r.contains_key("tags_json"));
        assert!(r.contains_key("service"));
    }

    #[test]
    fn test_decoder_quoted_header_alias() {
        let aliases = ColumnAliases::default();
        let decoder = FieldDecoder::new(&aliases);
        let mut r = row(&[("'metadata_json'", r#"'{"vpc":"vpc-1"}'"#)]);

        let decoded = decoder.decode(&mut r, LogicalField::Metadata);

        assert_eq!(decoded.column.as_deref(), Some("'metadata_json'"));
        assert_eq!(decoded.value["vpc"], json!("vpc-1"));
        assert!(r.is_empty());
    }

    #[test]
    fn test_decoder_failure_still_consumes_column() {
        let aliases = ColumnAliases::default();
        let decoder = FieldDecoder::new(&aliases);
        let mut r = row(&[("tags", "{broken")]);

        let decoded = decoder.decode(&mut r, LogicalField::Tags);

        assert!(decoded.value.is_empty());
        assert!(decoded.error.is_some());
        assert!(r.is_empty());

        let failure = decoded.failure(7, LogicalField::Tags).unwrap();
        assert_eq!(failure.row, 7);
        assert_eq!(failure.column, "tags");
        assert_eq!(failure.field, LogicalField::Tags);
    }

    #[test]
    fn test_decoder_only_first_alias_consumed() {
        let aliases = ColumnAliases::default();
        let decoder = FieldDecoder::new(&aliases);
        let mut r = row(&[("tags", r#"{"b":"2"}"#), ("tags_json", r#"{"a":"1"}"#)]);

        let decoded = decoder.decode(&mut r, LogicalField::Tags);

        assert_eq!(decoded.column.as_deref(), Some("tags_json"));
        assert_eq!(decoded.value["a"], json!("1"));
        assert!(r.contains_key("tags"));
    }

    #[test]
    fn test_decoder_absent_column() {
        let aliases = ColumnAliases::default();
        let decoder = FieldDecoder::new(&aliases);
        let mut r = row(&[("service", "s3")]);

        let decoded = decoder.decode(&mut r, LogicalField::Tags);

        assert_eq!(decoded, DecodedField::default());
        assert!(decoded.failure(0, LogicalField::Tags).is_none());
        assert_eq!(r.len(), 1);
    }

    // ── into_tags ─────────────────────────────────────────────────────────────

    #[test]
    fn test_into_tags_stringifies_scalars() {
        let map = decode_object(r#"{"env":"prod","replicas":3,"public":false}"#).unwrap();
        let tags = into_tags(map);
        assert_eq!(tags["env"], "prod");
        assert_eq!(tags["replicas"], "3");
        assert_eq!(tags["public"], "false");
    }
}
