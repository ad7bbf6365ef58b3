//! Invocation parameters.
//!
//! The dashboard is addressed by a seller id and a report date. Both are
//! read once at session start; a missing value is a terminal session state,
//! not an error return.

/// Seller/date pair selecting one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportParams {
    pub seller: String,
    pub date: String,
}

impl ReportParams {
    pub fn new(seller: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            seller: seller.into(),
            date: date.into(),
        }
    }

    /// Parse the dashboard query-string form (`seller=...&date=...`).
    ///
    /// The first occurrence of each key wins and an empty value counts as
    /// absent, matching `URLSearchParams` lookup semantics. Returns `None`
    /// when either parameter is missing.
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);

        let mut seller: Option<String> = None;
        let mut date: Option<String> = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "seller" if seller.is_none() => seller = Some(value.into_owned()),
                "date" if date.is_none() => date = Some(value.into_owned()),
                _ => {}
            }
        }

        Some(Self {
            seller: seller.filter(|s| !s.is_empty())?,
            date: date.filter(|s| !s.is_empty())?,
        })
    }
}
