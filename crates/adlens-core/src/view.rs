//! View-model reduction.
//!
//! Folds a [`Classification`] into the single render-ready value the host
//! surface consumes. Exactly one of the three view states comes out, and
//! a `Report` view is always structurally complete: every collection is
//! present even when empty, so renderers never branch on missing fields.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::classify::{Classification, Sections, Status};
use crate::defaults;
use crate::model::{ChartDefinition, InsightRow, PerformanceRow, SuggestionRow};

/// Render-ready state, serialized with a `view` discriminant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewModel {
    AuthError(Status),
    Loading(Status),
    Report(ReportView),
}

/// The full report surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub performance_title: String,
    pub performance_rows: Vec<PerformanceRow>,
    pub performance_summary: Vec<String>,
    pub definitions: BTreeMap<String, String>,
    pub insight_title: String,
    pub insights: Vec<InsightWithSuggestion>,
    pub chart_title: String,
    pub charts: Vec<ChartDefinition>,
    pub combined_summary: Vec<String>,
    pub warnings: Vec<String>,
}

/// An insight row paired with its matched suggestion text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightWithSuggestion {
    #[serde(flatten)]
    pub insight: InsightRow,
    pub suggestion: String,
}

/// Fold a classification into its view model.
pub fn reduce(classification: &Classification) -> ViewModel {
    match classification {
        Classification::AuthError(status) => ViewModel::AuthError(status.clone()),
        Classification::Loading(status) => ViewModel::Loading(status.clone()),
        Classification::Report(sections) => ViewModel::Report(report_view(sections)),
    }
}

fn report_view(s: &Sections) -> ReportView {
    let combined_summary = s
        .insight_summary
        .iter()
        .chain(&s.suggestion_summary)
        .chain(&s.chart_summary)
        .filter(|line| !line.is_empty())
        .cloned()
        .collect();

    ReportView {
        performance_title: s.performance_title.clone(),
        performance_rows: s.performance_rows.clone(),
        performance_summary: s.performance_summary.clone(),
        definitions: s.definitions.clone(),
        insight_title: s.insight_title.clone(),
        insights: join_insights(&s.insight_rows, &s.suggestion_rows),
        chart_title: s.chart_title.clone(),
        charts: s.chart_defs.clone(),
        combined_summary,
        warnings: s.warnings.clone(),
    }
}

/// Left-join insights with suggestions on product number.
///
/// Matching is typed: a numeric gno never equals its textual spelling.
/// Suggestions with a blank gno are unreachable, and an unmatched or
/// empty suggestion falls back to the placeholder. Output order and
/// length follow the insight table.
pub fn join_insights(
    insights: &[InsightRow],
    suggestions: &[SuggestionRow],
) -> Vec<InsightWithSuggestion> {
    insights
        .iter()
        .map(|insight| {
            let suggestion = insight
                .gno
                .as_ref()
                .filter(|g| !g.is_blank())
                .and_then(|g| {
                    suggestions
                        .iter()
                        .find(|s| s.gno.as_ref().is_some_and(|sg| !sg.is_blank() && sg == g))
                })
                .map(|s| s.suggestion.clone())
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| defaults::SUGGESTION_PLACEHOLDER.to_string());
            InsightWithSuggestion {
                insight: insight.clone(),
                suggestion,
            }
        })
        .collect()
}
