//! adlens-core
//!
//! Pure engine for the ad-performance report dashboard:
//! - wire-level block model and envelope types
//! - block classification (error/loading short-circuits, performance vs
//!   insight split, first-match-wins selection)
//! - view-model reduction and the insight/suggestion join
//! - override validation for user-supplied JSON replacements
//! - export document building (JSON export with plain-text fallback)
//!
//! The crate performs no I/O. Acquisition lives in `adlens-client`; file and
//! terminal handling live in the CLI host.

pub mod classify;
pub mod errors;
pub mod export;
pub mod ingest;
pub mod model;
pub mod view;

pub use crate::errors::{AdlensError, AdlensResult};

/// Block discriminator tags and codes.
/// These are the wire contract and must remain stable.
pub mod tag {
    pub const DATA_ARRAY: &str = "data_array";
    pub const SUGGESTION: &str = "suggestion";
    pub const CHART: &str = "chart";
    pub const PENDING: &str = "pending";
    /// Legacy alias for `pending`, still emitted by older report builds.
    pub const GET_DATA: &str = "get_data";
    pub const ERROR_MESSAGE: &str = "error_message";
    /// The only error code recognized as authoritative.
    pub const NO_AUTH: &str = "NO_AUTH";

    /// Optional explicit role discriminator on `data_array` blocks.
    pub const ROLE_FIELD: &str = "role";
    pub const ROLE_PERFORMANCE: &str = "performance";
    pub const ROLE_INSIGHT: &str = "insight";
}

/// Fixed fallback titles and display strings.
pub mod defaults {
    /// Title substring marking a `data_array` block as the performance table
    /// when no explicit role is present.
    pub const PERFORMANCE_MARKER: &str = "成效總覽";
    /// Fallback title for the performance section.
    pub const PERFORMANCE_TITLE: &str = "商品 × 廣告類型成效總覽";
    /// Fallback title for the insight section.
    pub const INSIGHT_TITLE: &str = "重點洞察說明";
    /// Fallback title for the chart section.
    pub const CHART_TITLE: &str = "指標數據圖表";
    /// Suggestion text attached to insights with no matching suggestion row.
    pub const SUGGESTION_PLACEHOLDER: &str = "無相關建議";
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::classify::{classify, Classification, DataArrayRole, Sections, Status};
    pub use crate::export::{build_export, ExportDocument};
    pub use crate::ingest::{accept_override, split_document, OverridePayload};
    pub use crate::model::{
        BarChart, ChartDefinition, Envelope, Gno, InsightRow, MetricValue, PerformanceRow,
        PieChart, ReportMetadata, SuggestionRow,
    };
    pub use crate::view::{
        join_insights, reduce, InsightWithSuggestion, ReportView, ViewModel,
    };
    pub use crate::{AdlensError, AdlensResult};
}
