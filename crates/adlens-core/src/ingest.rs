//! Override validation.
//!
//! Users can paste a replacement payload over a live report. The text must
//! parse as JSON and satisfy the report invariants before it is allowed to
//! displace acquired state. Two shapes are accepted:
//! - the full envelope `{metadata, data}`, recognized by a truthy
//!   `metadata` field,
//! - a bare block array (legacy exports), which resets the metadata.
//!
//! A payload whose first block is the authoritative error or a pending
//! marker bypasses the performance-block requirement: those states are
//! valid on their own. The bypass looks at the first element only, unlike
//! classification which scans the whole sequence.

use serde_json::Value;

use crate::classify::{is_auth_error_block, is_loading_block, is_performance_block};
use crate::errors::{AdlensError, AdlensResult};
use crate::model::ReportMetadata;

/// Rejection text for a payload that is not a non-empty block array.
pub const EMPTY_ARRAY_MSG: &str = "Input must be a non-empty JSON array.";

/// Rejection text for a payload with no performance table.
pub const MISSING_PERFORMANCE_MSG: &str =
    "JSON is missing a required performance data block (like '商品 × 廣告類型成效總覽').";

/// A validated override, ready to displace session state.
#[derive(Debug, Clone, PartialEq)]
pub struct OverridePayload {
    pub blocks: Vec<Value>,
    pub metadata: ReportMetadata,
    /// Normalized pretty-printed form of the accepted document.
    pub editor_text: String,
}

/// Validate override text and extract its blocks and metadata.
///
/// Every rejection is `AdlensError::Validation` carrying the user-facing
/// message; hosts prepend their own framing.
pub fn accept_override(text: &str) -> AdlensResult<OverridePayload> {
    let doc: Value =
        serde_json::from_str(text).map_err(|e| AdlensError::validation(e.to_string()))?;

    let (blocks_value, metadata) = split_envelope(&doc);

    let Some(blocks) = blocks_value.as_array().filter(|b| !b.is_empty()) else {
        return Err(AdlensError::validation(EMPTY_ARRAY_MSG));
    };

    let first = &blocks[0];
    let accepted = is_auth_error_block(first)
        || is_loading_block(first)
        || blocks.iter().any(is_performance_block);
    if !accepted {
        return Err(AdlensError::validation(MISSING_PERFORMANCE_MSG));
    }

    let editor_text =
        serde_json::to_string_pretty(&doc).map_err(|e| AdlensError::serialization(e.to_string()))?;

    Ok(OverridePayload {
        blocks: blocks.clone(),
        metadata,
        editor_text,
    })
}

/// True when a dropped file or paste should be treated as JSON content.
pub fn is_json_transfer(name: &str, mime: Option<&str>) -> bool {
    mime == Some("application/json") || name.ends_with(".json")
}

/// Split any report document into blocks and metadata without applying the
/// override invariants. Non-array block sources collapse to an empty
/// collection; used to display documents that would not be accepted as
/// overrides.
pub fn split_document(doc: &Value) -> (Vec<Value>, ReportMetadata) {
    let (blocks_value, metadata) = split_envelope(doc);
    let blocks = blocks_value.as_array().cloned().unwrap_or_default();
    (blocks, metadata)
}

/// Split envelope from legacy form. The envelope wins only when its
/// `metadata` field is truthy; each metadata field is kept only when it is
/// a non-empty string, so one bad field never drags the other down.
fn split_envelope(doc: &Value) -> (&Value, ReportMetadata) {
    match doc.get("metadata") {
        Some(meta) if is_truthy(meta) => {
            let metadata = ReportMetadata {
                seller: metadata_field(meta, "seller"),
                report_period: metadata_field(meta, "reportPeriod"),
            };
            (doc.get("data").unwrap_or(&Value::Null), metadata)
        }
        _ => (doc, ReportMetadata::default()),
    }
}

fn metadata_field(meta: &Value, key: &str) -> Option<String> {
    meta.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Truthiness following the host scripting convention: null, false,
/// numeric zero and the empty string are falsy, everything else truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn envelope_text() -> String {
        json!({
            "metadata": {"seller": "賣家一號", "reportPeriod": "2025-05-01 ~ 2025-05-31"},
            "data": [{"type": "data_array", "title": "商品 × 廣告類型成效總覽", "data": []}]
        })
        .to_string()
    }

    #[test]
    fn envelope_form_carries_metadata() {
        let payload = accept_override(&envelope_text()).unwrap();
        assert_eq!(payload.blocks.len(), 1);
        assert_eq!(payload.metadata.seller.as_deref(), Some("賣家一號"));
        assert_eq!(
            payload.metadata.report_period.as_deref(),
            Some("2025-05-01 ~ 2025-05-31")
        );
    }

    #[test]
    fn legacy_array_resets_metadata() {
        let text = json!([
            {"type": "data_array", "role": "performance", "title": "五月銷售", "data": []}
        ])
        .to_string();
        let payload = accept_override(&text).unwrap();
        assert!(payload.metadata.is_absent());
    }

    #[test]
    fn non_string_metadata_fields_collapse_individually() {
        let text = json!({
            "metadata": {"seller": 12345, "reportPeriod": "2025-05"},
            "data": [{"type": "data_array", "role": "performance", "data": []}]
        })
        .to_string();
        let payload = accept_override(&text).unwrap();
        assert!(payload.metadata.seller.is_none());
        assert_eq!(payload.metadata.report_period.as_deref(), Some("2025-05"));
    }

    #[test]
    fn empty_metadata_strings_count_as_absent() {
        let text = json!({
            "metadata": {"seller": "", "reportPeriod": ""},
            "data": [{"type": "data_array", "role": "performance", "data": []}]
        })
        .to_string();
        let payload = accept_override(&text).unwrap();
        assert!(payload.metadata.is_absent());
    }

    #[test]
    fn falsy_metadata_field_means_legacy_form() {
        // The object itself is then the block source, and an object is not
        // a block array.
        for meta in [json!(null), json!(false), json!(0), json!("")] {
            let text = json!({"metadata": meta, "data": [{"type": "data_array"}]}).to_string();
            let err = accept_override(&text).unwrap_err();
            assert_eq!(err.to_string(), EMPTY_ARRAY_MSG);
        }
    }

    #[test]
    fn empty_array_is_rejected() {
        let err = accept_override("[]").unwrap_err();
        assert_matches!(err, AdlensError::Validation(msg) => {
            assert_eq!(msg, EMPTY_ARRAY_MSG);
        });
    }

    #[test]
    fn missing_performance_block_is_rejected() {
        let text = json!([{"type": "suggestion", "data": []}]).to_string();
        let err = accept_override(&text).unwrap_err();
        assert_eq!(err.to_string(), MISSING_PERFORMANCE_MSG);
    }

    #[test]
    fn leading_error_block_bypasses_performance_requirement() {
        let text = json!([
            {"type": "error_message", "title": "t", "message": "m", "error_code": "NO_AUTH"}
        ])
        .to_string();
        assert!(accept_override(&text).is_ok());
    }

    #[test]
    fn leading_pending_block_bypasses_performance_requirement() {
        for tag in ["pending", "get_data"] {
            let text = json!([{"type": tag, "title": "t", "message": "m"}]).to_string();
            assert!(accept_override(&text).is_ok());
        }
    }

    #[test]
    fn non_leading_error_block_does_not_bypass() {
        let text = json!([
            {"type": "suggestion", "data": []},
            {"type": "error_message", "title": "t", "message": "m", "error_code": "NO_AUTH"}
        ])
        .to_string();
        let err = accept_override(&text).unwrap_err();
        assert_eq!(err.to_string(), MISSING_PERFORMANCE_MSG);
    }

    #[test]
    fn unparseable_text_is_a_validation_error() {
        let err = accept_override("{not json").unwrap_err();
        assert_matches!(err, AdlensError::Validation(_));
    }

    #[test]
    fn editor_text_is_normalized_pretty_json() {
        let payload = accept_override("[{\"type\":\"data_array\",\"role\":\"performance\"}]")
            .unwrap();
        assert!(payload.editor_text.contains("\n"));
        assert!(payload.editor_text.contains("\"role\": \"performance\""));
    }

    #[test]
    fn json_transfer_detection() {
        assert!(is_json_transfer("report.json", None));
        assert!(is_json_transfer("blob", Some("application/json")));
        assert!(!is_json_transfer("report.txt", Some("text/plain")));
    }

    #[test]
    fn split_document_accepts_what_override_rejects() {
        let doc = json!({"metadata": {"seller": "s"}, "data": [{"type": "chart", "data": []}]});
        let (blocks, metadata) = split_document(&doc);
        assert_eq!(blocks.len(), 1);
        assert_eq!(metadata.seller.as_deref(), Some("s"));

        // Not an array anywhere: empty blocks, no error.
        let (blocks, _) = split_document(&json!({"foo": 1}));
        assert!(blocks.is_empty());
    }
}
