//! Export document building.
//!
//! The editor text is exported exactly as the user last saw it. Valid JSON
//! is re-wrapped in a fresh envelope and pretty printed; anything else is
//! preserved verbatim inside a plain-text file with a comment header, so a
//! half-edited payload survives the round trip.

use serde::Serialize;
use serde_json::Value;

use crate::model::ReportMetadata;

/// The mis-encoded en-dash sequence produced by a UTF-8 period string read
/// back as Latin-1. Normalized to a plain dash in file names.
pub const MOJIBAKE_EN_DASH: &str = "â€“";

/// A built export, ready to be written out by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDocument {
    Json { stem: String, body: String },
    Text { stem: String, body: String },
}

impl ExportDocument {
    pub fn file_name(&self) -> String {
        match self {
            Self::Json { stem, .. } => format!("{stem}.json"),
            Self::Text { stem, .. } => format!("{stem}.txt"),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Json { body, .. } | Self::Text { body, .. } => body,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json { .. })
    }
}

#[derive(Serialize)]
struct ExportEnvelope<'a> {
    // Field order fixes the key order in the output document.
    metadata: &'a ReportMetadata,
    data: Value,
}

/// Build the export document for the current editor text.
pub fn build_export(text: &str, metadata: &ReportMetadata) -> ExportDocument {
    let stem = export_file_stem(metadata);
    match serde_json::from_str::<Value>(text) {
        Ok(doc) => {
            let data = match doc {
                Value::Object(ref obj) if obj.get("data").map_or(false, Value::is_array) => {
                    obj["data"].clone()
                }
                other => other,
            };
            let envelope = ExportEnvelope { metadata, data };
            let body = serde_json::to_string_pretty(&envelope).unwrap_or_default();
            ExportDocument::Json { stem, body }
        }
        Err(_) => ExportDocument::Text {
            stem,
            body: text_fallback(text, metadata),
        },
    }
}

/// `dashboard-data-<seller>-<period>`, with the period stripped of spaces
/// and commas. Absent fields collapse to the empty string.
pub fn export_file_stem(metadata: &ReportMetadata) -> String {
    let seller = metadata.seller.as_deref().unwrap_or_default();
    let period = sanitize_period(metadata.report_period.as_deref().unwrap_or_default());
    format!("dashboard-data-{seller}-{period}")
}

pub fn sanitize_period(period: &str) -> String {
    period
        .replace(MOJIBAKE_EN_DASH, "-")
        .chars()
        .filter(|c| !matches!(c, ' ' | ','))
        .collect()
}

fn text_fallback(text: &str, metadata: &ReportMetadata) -> String {
    let seller = metadata.seller.as_deref().unwrap_or_default();
    let period = metadata.report_period.as_deref().unwrap_or_default();
    format!(
        "// --- METADATA ---\n// Seller: {seller}\n// Report Period: {period}\n\n// --- INVALID JSON DATA ---\n{text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            seller: Some("賣家一號".to_string()),
            report_period: Some("2025.05.01 â€“ 2025.05.31".to_string()),
        }
    }

    #[test]
    fn stem_strips_spaces_and_fixes_mojibake() {
        let stem = export_file_stem(&metadata());
        assert_eq!(stem, "dashboard-data-賣家一號-2025.05.01-2025.05.31");
    }

    #[test]
    fn sanitize_drops_commas() {
        assert_eq!(sanitize_period("May 1, 2025"), "May12025");
    }

    #[test]
    fn absent_metadata_collapses_to_empty_segments() {
        let stem = export_file_stem(&ReportMetadata::default());
        assert_eq!(stem, "dashboard-data--");
    }

    #[test]
    fn valid_envelope_reexports_its_data_array() {
        let text = json!({
            "metadata": {"seller": "stale", "reportPeriod": "old"},
            "data": [{"type": "data_array"}]
        })
        .to_string();
        let doc = build_export(&text, &metadata());
        assert_matches!(&doc, ExportDocument::Json { body, .. } => {
            let parsed: serde_json::Value = serde_json::from_str(body).unwrap();
            // Current metadata wins over whatever the text carried.
            assert_eq!(parsed["metadata"]["seller"], "賣家一號");
            assert_eq!(parsed["data"], json!([{"type": "data_array"}]));
            // Key order is fixed by the envelope shape.
            assert!(body.find("\"metadata\"").unwrap() < body.find("\"data\"").unwrap());
        });
        assert_eq!(doc.file_name(), "dashboard-data-賣家一號-2025.05.01-2025.05.31.json");
    }

    #[test]
    fn non_envelope_json_is_wrapped_whole() {
        let doc = build_export("[1, 2, 3]", &metadata());
        assert_matches!(doc, ExportDocument::Json { body, .. } => {
            let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(parsed["data"], json!([1, 2, 3]));
        });
    }

    #[test]
    fn object_with_non_array_data_is_wrapped_whole() {
        let doc = build_export("{\"data\": 5}", &metadata());
        assert_matches!(doc, ExportDocument::Json { body, .. } => {
            let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(parsed["data"], json!({"data": 5}));
        });
    }

    #[test]
    fn invalid_json_falls_back_to_text_with_header() {
        let doc = build_export("{\"a\":1", &metadata());
        assert!(!doc.is_json());
        assert_eq!(doc.file_name(), "dashboard-data-賣家一號-2025.05.01-2025.05.31.txt");
        assert_eq!(
            doc.content(),
            "// --- METADATA ---\n\
             // Seller: 賣家一號\n\
             // Report Period: 2025.05.01 â€“ 2025.05.31\n\
             \n\
             // --- INVALID JSON DATA ---\n\
             {\"a\":1"
        );
    }
}
