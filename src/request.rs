use crate::schema::ReportKind;
use crate::slicer::PeriodSlice;
use crate::utils::format_api_date;
use std::fmt;

/// Minor API version pinned on every report request.
pub const MINOR_VERSION: &str = "75";
pub const DEFAULT_ACCOUNTING_METHOD: &str = "Accrual";
pub const DEFAULT_SUMMARIZE_COLUMN_BY: &str = "Total";

/// Everything the transport needs to issue one report request. The report
/// endpoint returns the whole tree at once, so there is never a next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub kind: ReportKind,
    pub slice: PeriodSlice,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(&'static str, &'static str)>,
}

impl ReportRequest {
    pub fn new(kind: ReportKind, realm_id: &str, slice: &PeriodSlice) -> Self {
        Self::with_options(
            kind,
            realm_id,
            slice,
            DEFAULT_ACCOUNTING_METHOD,
            DEFAULT_SUMMARIZE_COLUMN_BY,
        )
    }

    pub fn with_options(
        kind: ReportKind,
        realm_id: &str,
        slice: &PeriodSlice,
        accounting_method: &str,
        summarize_column_by: &str,
    ) -> Self {
        let mut query = vec![
            ("accounting_method".to_string(), accounting_method.to_string()),
            ("minorversion".to_string(), MINOR_VERSION.to_string()),
            ("summarize_column_by".to_string(), summarize_column_by.to_string()),
        ];

        if let Some(start) = slice.start_date() {
            query.push(("start_date".to_string(), format_api_date(start)));
        }
        if let Some(end) = slice.end_date() {
            query.push(("end_date".to_string(), format_api_date(end)));
        }

        Self {
            kind,
            slice: *slice,
            path: format!("company/{}/reports/{}", realm_id, kind.report_name()),
            query,
            headers: vec![
                ("Accept", "application/json"),
                ("Content-Type", "application/json"),
            ],
        }
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Renders as `<report> <slice>`; used as the context prefix of log lines.
impl fmt::Display for ReportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.slice)
    }
}
