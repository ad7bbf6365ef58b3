//! Block classification.
//!
//! The raw report payload is an ordered sequence of loosely-shaped JSON
//! blocks. Classification runs two short-circuiting scans followed by
//! per-kind selection:
//! - any authoritative error block wins outright,
//! - else any pending/`get_data` block yields the loading state,
//! - else the first block of each kind is selected and decoded; later
//!   duplicates of a kind are silently ignored.
//!
//! Selection is deterministic over the input sequence and performs no I/O.
//! Undecodable entries are dropped into `warnings` rather than failing the
//! classification.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::model::{ChartDefinition, InsightRow, PerformanceRow, SuggestionRow};
use crate::{defaults, tag};

/// Outcome of classifying a block collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    AuthError(Status),
    Loading(Status),
    Report(Sections),
}

/// Title/message pair extracted from a status block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub title: String,
    pub message: String,
}

/// Selected and decoded sections of a report payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Sections {
    pub performance_rows: Vec<PerformanceRow>,
    pub performance_title: String,
    pub performance_summary: Vec<String>,
    pub insight_rows: Vec<InsightRow>,
    pub insight_title: String,
    pub insight_summary: Vec<String>,
    pub suggestion_rows: Vec<SuggestionRow>,
    pub suggestion_summary: Vec<String>,
    pub chart_defs: Vec<ChartDefinition>,
    pub chart_title: String,
    pub chart_summary: Vec<String>,
    pub definitions: BTreeMap<String, String>,
    /// Entries dropped or coerced during lenient decode.
    pub warnings: Vec<String>,
}

/// Role of a `data_array` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataArrayRole {
    Performance,
    Insight,
}

pub fn block_type(block: &Value) -> Option<&str> {
    block.get("type").and_then(Value::as_str)
}

pub fn block_title(block: &Value) -> Option<&str> {
    block.get("title").and_then(Value::as_str)
}

/// Authoritative error: `error_message` tag carrying the `NO_AUTH` code.
/// Other error codes are not recognized and the block is skipped entirely.
pub fn is_auth_error_block(block: &Value) -> bool {
    block_type(block) == Some(tag::ERROR_MESSAGE)
        && block.get("error_code").and_then(Value::as_str) == Some(tag::NO_AUTH)
}

/// Pending marker, either tag generation.
pub fn is_loading_block(block: &Value) -> bool {
    matches!(block_type(block), Some(t) if t == tag::PENDING || t == tag::GET_DATA)
}

/// The single decision point splitting the two `data_array` kinds.
///
/// An explicit `role` field wins; otherwise the block is the performance
/// table iff its title contains the marker substring. A block without a
/// title falls through to insight.
pub fn data_array_role(block: &Value) -> DataArrayRole {
    match block.get(tag::ROLE_FIELD).and_then(Value::as_str) {
        Some(r) if r == tag::ROLE_PERFORMANCE => DataArrayRole::Performance,
        Some(r) if r == tag::ROLE_INSIGHT => DataArrayRole::Insight,
        _ => {
            if block_title(block).map_or(false, |t| t.contains(defaults::PERFORMANCE_MARKER)) {
                DataArrayRole::Performance
            } else {
                DataArrayRole::Insight
            }
        }
    }
}

/// True when the block is the performance table. Shared with override
/// validation, which requires at least one such block.
pub fn is_performance_block(block: &Value) -> bool {
    block_type(block) == Some(tag::DATA_ARRAY)
        && data_array_role(block) == DataArrayRole::Performance
}

fn is_insight_block(block: &Value) -> bool {
    block_type(block) == Some(tag::DATA_ARRAY) && data_array_role(block) == DataArrayRole::Insight
}

/// Classify a block collection.
///
/// First match wins for every kind; absent kinds contribute empty
/// collections and their fixed fallback titles.
pub fn classify(blocks: &[Value]) -> Classification {
    if let Some(block) = blocks.iter().find(|b| is_auth_error_block(b)) {
        return Classification::AuthError(status_of(block));
    }
    if let Some(block) = blocks.iter().find(|b| is_loading_block(b)) {
        return Classification::Loading(status_of(block));
    }

    let performance = blocks.iter().find(|b| is_performance_block(b));
    let insight = blocks.iter().find(|b| is_insight_block(b));
    let suggestion = blocks.iter().find(|b| block_type(b) == Some(tag::SUGGESTION));
    let chart = blocks.iter().find(|b| block_type(b) == Some(tag::CHART));

    let mut warnings = Vec::new();
    let performance_rows = rows_of(performance, "performance", &mut warnings);
    let performance_summary = summary_of(performance, "performance", &mut warnings);
    let insight_rows = rows_of(insight, "insight", &mut warnings);
    let insight_summary = summary_of(insight, "insight", &mut warnings);
    let suggestion_rows = rows_of(suggestion, "suggestion", &mut warnings);
    let suggestion_summary = summary_of(suggestion, "suggestion", &mut warnings);
    let chart_defs = rows_of(chart, "chart", &mut warnings);
    let chart_summary = summary_of(chart, "chart", &mut warnings);
    let definitions = definitions_of(performance, &mut warnings);

    Classification::Report(Sections {
        performance_rows,
        performance_title: title_or(performance, defaults::PERFORMANCE_TITLE),
        performance_summary,
        insight_rows,
        insight_title: title_or(insight, defaults::INSIGHT_TITLE),
        insight_summary,
        suggestion_rows,
        suggestion_summary,
        chart_defs,
        chart_title: title_or(chart, defaults::CHART_TITLE),
        chart_summary,
        definitions,
        warnings,
    })
}

fn status_of(block: &Value) -> Status {
    Status {
        title: block_title(block).unwrap_or_default().to_string(),
        message: block
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

fn title_or(block: Option<&Value>, fallback: &str) -> String {
    block
        .and_then(|b| block_title(b))
        .unwrap_or(fallback)
        .to_string()
}

fn rows_of<T: DeserializeOwned>(
    block: Option<&Value>,
    kind: &str,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    let Some(block) = block else {
        return Vec::new();
    };
    let Some(data) = block.get("data") else {
        return Vec::new();
    };
    if data.is_null() {
        return Vec::new();
    }
    let Some(entries) = data.as_array() else {
        warnings.push(format!("{kind}.data is not an array"));
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<T>(entry.clone()) {
            Ok(row) => rows.push(row),
            Err(e) => warnings.push(format!("{kind}.data[{idx}] dropped: {e}")),
        }
    }
    rows
}

fn summary_of(block: Option<&Value>, kind: &str, warnings: &mut Vec<String>) -> Vec<String> {
    let Some(summary) = block.and_then(|b| b.get("summary")) else {
        return Vec::new();
    };
    if summary.is_null() {
        return Vec::new();
    }
    let Some(entries) = summary.as_array() else {
        warnings.push(format!("{kind}.summary is not an array"));
        return Vec::new();
    };

    let mut out = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        match entry.as_str() {
            Some(s) => out.push(s.to_string()),
            None => warnings.push(format!("{kind}.summary[{idx}] is not a string")),
        }
    }
    out
}

fn definitions_of(block: Option<&Value>, warnings: &mut Vec<String>) -> BTreeMap<String, String> {
    let Some(defs) = block.and_then(|b| b.get("definitions")) else {
        return BTreeMap::new();
    };
    if defs.is_null() {
        return BTreeMap::new();
    }
    let Some(obj) = defs.as_object() else {
        warnings.push("performance.definitions is not an object".to_string());
        return BTreeMap::new();
    };

    let mut map = BTreeMap::new();
    for (key, value) in obj {
        match value.as_str() {
            Some(s) => {
                map.insert(key.clone(), s.to_string());
            }
            None => warnings.push(format!("performance.definitions[{key}] is not a string")),
        }
    }
    map
}
