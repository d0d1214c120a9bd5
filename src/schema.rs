use crate::error::{ReportError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
pub enum ReportKind {
    #[schemars(description = "Point-in-time statement of Assets, Liabilities and Equity")]
    BalanceSheet,

    #[schemars(description = "Income and expenses over a period")]
    ProfitAndLoss,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::BalanceSheet, ReportKind::ProfitAndLoss];

    /// Path segment of the report endpoint (`company/<realm>/reports/<name>`).
    pub fn report_name(&self) -> &'static str {
        match self {
            ReportKind::BalanceSheet => "BalanceSheet",
            ReportKind::ProfitAndLoss => "ProfitAndLoss",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.report_name())
    }
}

// ---------------------------------------------------------------------------
// Report tree, as returned by the reporting API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportTree {
    #[serde(default)]
    pub header: ReportHeader,
    #[serde(default)]
    pub columns: Columns,
    #[serde(default)]
    pub rows: Rows,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportHeader {
    #[serde(default)]
    pub start_period: String,
    #[serde(default)]
    pub end_period: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub report_name: Option<String>,
    #[serde(default)]
    pub report_basis: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Columns {
    #[serde(rename = "Column", default)]
    pub column: Vec<Column>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Column {
    #[serde(rename = "ColTitle", default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Rows {
    #[serde(rename = "Row", default)]
    pub row: Vec<Row>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    pub group: Option<String>,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionRow {
    pub group: Option<String>,
    pub header_cells: Vec<Cell>,
    pub children: Vec<Row>,
}

impl SectionRow {
    /// Display name of the section: the value of its header's first cell.
    pub fn display_name(&self) -> &str {
        self.header_cells
            .first()
            .map(|cell| cell.value.as_str())
            .unwrap_or("")
    }

    pub fn header_id(&self) -> Option<&str> {
        self.header_cells.first().and_then(|cell| cell.id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawRow")]
pub enum Row {
    Data(DataRow),
    Section(SectionRow),
    /// Any other row shape (summaries without a type, future additions).
    Unknown,
}

#[derive(Deserialize)]
struct RawRow {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    group: Option<String>,
    #[serde(rename = "Header", default)]
    header: Option<RawHeader>,
    #[serde(rename = "ColData", default)]
    col_data: Vec<Cell>,
    #[serde(rename = "Rows", default)]
    rows: Option<Rows>,
}

#[derive(Deserialize)]
struct RawHeader {
    #[serde(rename = "ColData", default)]
    col_data: Vec<Cell>,
}

impl From<RawRow> for Row {
    fn from(raw: RawRow) -> Self {
        match raw.kind.as_deref() {
            Some("Data") => Row::Data(DataRow {
                group: raw.group,
                cells: raw.col_data,
            }),
            Some("Section") => Row::Section(SectionRow {
                group: raw.group,
                header_cells: raw.header.map(|h| h.col_data).unwrap_or_default(),
                children: raw.rows.map(|r| r.row).unwrap_or_default(),
            }),
            _ => Row::Unknown,
        }
    }
}

impl ReportTree {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ReportError::MalformedReport(e.to_string()))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ReportError::MalformedReport(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.row.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Flat output record
// ---------------------------------------------------------------------------

/// One output row per (account, value column). Every field is a string,
/// including the amount, which is passed through exactly as reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FlatRecord {
    #[serde(rename = "_Account")]
    #[schemars(description = "Account name as shown on the report row")]
    pub account: String,

    #[serde(rename = "_Account_id")]
    #[schemars(description = "Account identifier, with any ' at index <n>' suffix removed")]
    pub account_id: String,

    #[serde(rename = "StartPeriod")]
    #[schemars(description = "Report header start period (YYYY-MM-DD)")]
    pub start_period: String,

    #[serde(rename = "EndPeriod")]
    #[schemars(description = "Report header end period (YYYY-MM-DD)")]
    pub end_period: String,

    #[serde(rename = "Currency")]
    pub currency: String,

    #[serde(rename = "ParentAccountName")]
    #[schemars(description = "Immediate enclosing section")]
    pub parent_name: String,

    #[serde(rename = "ParentAccountId")]
    pub parent_id: String,

    #[serde(rename = "GrandParentAccountName")]
    #[schemars(
        description = "Section one level above the parent (Balance Sheet) or the top-level category (Profit and Loss)"
    )]
    pub grandparent_name: String,

    #[serde(rename = "GrandParentAccountId")]
    pub grandparent_id: String,

    #[serde(rename = "CategoryAccountName")]
    #[schemars(description = "Top-level section, e.g. Assets, Liabilities and Equity, Income")]
    pub category_name: String,

    #[serde(rename = "CategoryAccountId")]
    pub category_id: String,

    #[serde(rename = "Classification")]
    #[schemars(description = "Group tag of the row, or of its nearest enclosing section")]
    pub classification: String,

    #[serde(rename = "SectionType")]
    #[schemars(description = "Second-level section the account sits under, e.g. Current Assets")]
    pub section_type: String,

    #[serde(rename = "FullyQualifiedName")]
    pub fully_qualified_name: String,

    #[serde(rename = "AccountType")]
    pub account_type: String,

    #[serde(rename = "FullAccountName")]
    #[schemars(description = "Colon-joined ancestry path ending with the account name")]
    pub full_account_name: String,

    #[serde(rename = "Class")]
    #[schemars(description = "Value column label (class) this amount belongs to")]
    pub class: String,

    #[serde(rename = "Total_Money")]
    #[schemars(description = "Amount exactly as reported; empty string when the cell is missing")]
    pub total_money: String,
}

impl FlatRecord {
    pub const FIELD_NAMES: [&'static str; 18] = [
        "_Account",
        "_Account_id",
        "StartPeriod",
        "EndPeriod",
        "Currency",
        "ParentAccountName",
        "ParentAccountId",
        "GrandParentAccountName",
        "GrandParentAccountId",
        "CategoryAccountName",
        "CategoryAccountId",
        "Classification",
        "SectionType",
        "FullyQualifiedName",
        "AccountType",
        "FullAccountName",
        "Class",
        "Total_Money",
    ];

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FlatRecord)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    /// Values in [`FlatRecord::FIELD_NAMES`] order.
    pub fn values(&self) -> [&str; 18] {
        [
            self.account.as_str(),
            self.account_id.as_str(),
            self.start_period.as_str(),
            self.end_period.as_str(),
            self.currency.as_str(),
            self.parent_name.as_str(),
            self.parent_id.as_str(),
            self.grandparent_name.as_str(),
            self.grandparent_id.as_str(),
            self.category_name.as_str(),
            self.category_id.as_str(),
            self.classification.as_str(),
            self.section_type.as_str(),
            self.fully_qualified_name.as_str(),
            self.account_type.as_str(),
            self.full_account_name.as_str(),
            self.class.as_str(),
            self.total_money.as_str(),
        ]
    }
}
