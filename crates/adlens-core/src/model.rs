//! Wire-level report types.
//!
//! Blocks travel as raw `serde_json::Value`s; this module holds the typed
//! shapes extracted from them at classification time, the envelope around the
//! block sequence, and constructors for the synthetic status blocks the
//! acquisition path commits.
//!
//! Decode policy is lenient on rows: missing fields take defaults rather than
//! failing the row. Strictness lives at the envelope boundary, where a
//! success response without `metadata` or an array `data` is a decode error.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tag;

/// Product identity carried by table rows.
///
/// Numeric and string forms are distinct: `1` and `"1"` never compare equal,
/// so they never join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Gno {
    Number(serde_json::Number),
    Text(String),
}

impl Gno {
    /// Blank keys (`0`, `""`) never participate in the suggestion join.
    pub fn is_blank(&self) -> bool {
        match self {
            Gno::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
            Gno::Text(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for Gno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gno::Number(n) => write!(f, "{n}"),
            Gno::Text(s) => f.write_str(s),
        }
    }
}

/// A derived metric that is either numeric or the sentinel `"N/A"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl Default for MetricValue {
    fn default() -> Self {
        MetricValue::Number(0.0)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/// One row of the performance table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRow {
    #[serde(default)]
    pub gno: Option<Gno>,
    #[serde(default)]
    pub g_name: String,
    #[serde(default)]
    pub ad_type: String,
    #[serde(default)]
    pub impression: f64,
    #[serde(default)]
    pub click: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub orders: f64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(rename = "CVR", default)]
    pub cvr: MetricValue,
    #[serde(rename = "ROAS", default)]
    pub roas: MetricValue,
    #[serde(rename = "GMV", default)]
    pub gmv: f64,
}

/// One row of the insight table: best/worst channel per product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightRow {
    #[serde(default)]
    pub gno: Option<Gno>,
    #[serde(default)]
    pub g_name: String,
    #[serde(default)]
    pub best_ad: String,
    #[serde(default)]
    pub best_roas: MetricValue,
    #[serde(default)]
    pub worst_ad: String,
    #[serde(default)]
    pub worst_roas: MetricValue,
}

/// Free-text suggestion attached to a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRow {
    #[serde(default)]
    pub gno: Option<Gno>,
    #[serde(default)]
    pub g_name: String,
    #[serde(default)]
    pub suggestion: String,
}

/// Chart definitions, discriminated by `chart_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chart_type")]
pub enum ChartDefinition {
    #[serde(rename = "bar")]
    Bar(BarChart),
    #[serde(rename = "pie")]
    Pie(PieChart),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub x_axis: String,
    /// Category labels; series values align to these by index.
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub series: Vec<BarSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: Vec<f64>,
}

impl BarSeries {
    /// Value aligned to the category at `index`; absent values count as zero.
    pub fn value_at(&self, index: usize) -> f64 {
        self.data.get(index).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub series: Vec<PieSlice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: f64,
}

/// Envelope metadata. Lifecycle is independent from the blocks: a
/// legacy-format override resets it to absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
    #[serde(rename = "reportPeriod", default, skip_serializing_if = "Option::is_none")]
    pub report_period: Option<String>,
}

impl ReportMetadata {
    pub fn is_absent(&self) -> bool {
        self.seller.is_none() && self.report_period.is_none()
    }
}

/// Top-level success body from the report endpoint. Both fields are
/// required; a body missing either fails decode and routes to the
/// acquisition failure path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub metadata: ReportMetadata,
    pub data: Vec<Value>,
}

/// Build a pending/loading status block.
pub fn loading_block(title: &str, message: &str) -> Value {
    serde_json::json!({
        "type": tag::GET_DATA,
        "title": title,
        "message": message,
    })
}

/// Build an authoritative error block.
pub fn auth_error_block(title: &str, message: &str) -> Value {
    serde_json::json!({
        "type": tag::ERROR_MESSAGE,
        "title": title,
        "message": message,
        "error_code": tag::NO_AUTH,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gno_number_and_string_are_distinct() {
        let n: Gno = serde_json::from_value(json!(1)).unwrap();
        let s: Gno = serde_json::from_value(json!("1")).unwrap();
        assert_ne!(n, s);
    }

    #[test]
    fn gno_blank_forms() {
        let zero: Gno = serde_json::from_value(json!(0)).unwrap();
        let empty: Gno = serde_json::from_value(json!("")).unwrap();
        let one: Gno = serde_json::from_value(json!(1)).unwrap();
        assert!(zero.is_blank());
        assert!(empty.is_blank());
        assert!(!one.is_blank());
    }

    #[test]
    fn metric_value_accepts_sentinel() {
        let na: MetricValue = serde_json::from_value(json!("N/A")).unwrap();
        assert_eq!(na, MetricValue::Text("N/A".to_string()));
        assert_eq!(na.to_string(), "N/A");

        let n: MetricValue = serde_json::from_value(json!(3.5)).unwrap();
        assert_eq!(n, MetricValue::Number(3.5));
    }

    #[test]
    fn performance_row_missing_fields_take_defaults() {
        let row: PerformanceRow =
            serde_json::from_value(json!({"gno": 7, "g_name": "商品甲"})).unwrap();
        assert_eq!(row.g_name, "商品甲");
        assert_eq!(row.impression, 0.0);
        assert_eq!(row.roas, MetricValue::Number(0.0));
        assert_eq!(row.gmv, 0.0);
    }

    #[test]
    fn chart_definitions_decode_by_tag() {
        let bar: ChartDefinition = serde_json::from_value(json!({
            "chart_type": "bar",
            "title": "點擊數",
            "x_axis": "商品",
            "labels": ["一月", "二月"],
            "series": [{"name": "展示型", "data": [10.0]}]
        }))
        .unwrap();
        let ChartDefinition::Bar(bar) = bar else {
            panic!("expected bar chart");
        };
        assert_eq!(bar.labels.len(), 2);
        // second category has no value: defaults to zero
        assert_eq!(bar.series[0].value_at(0), 10.0);
        assert_eq!(bar.series[0].value_at(1), 0.0);

        let pie: ChartDefinition = serde_json::from_value(json!({
            "chart_type": "pie",
            "title": "花費占比",
            "series": [{"name": "展示型", "value": 60.0}]
        }))
        .unwrap();
        assert!(matches!(pie, ChartDefinition::Pie(_)));
    }

    #[test]
    fn envelope_requires_metadata_and_data() {
        let ok: Result<Envelope, _> = serde_json::from_value(json!({
            "metadata": {"seller": "A"},
            "data": []
        }));
        assert!(ok.is_ok());

        let missing_meta: Result<Envelope, _> = serde_json::from_value(json!({"data": []}));
        assert!(missing_meta.is_err());

        let bad_data: Result<Envelope, _> = serde_json::from_value(json!({
            "metadata": {},
            "data": {"not": "an array"}
        }));
        assert!(bad_data.is_err());
    }

    #[test]
    fn status_block_constructors_classify() {
        let l = loading_block("資料分析中", "正在取得分析資料");
        assert_eq!(l["type"], "get_data");
        let e = auth_error_block("缺少參數", "x");
        assert_eq!(e["error_code"], "NO_AUTH");
    }
}
