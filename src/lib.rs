//! # QuickBooks Report Flattener
//!
//! A library for pulling Balance Sheet and Profit & Loss reports from the
//! QuickBooks Online reporting API and turning their nested section trees into
//! flat, analytics-ready records.
//!
//! ## Core Concepts
//!
//! - **Period Slices**: An overall date range is split into calendar months and each month is requested separately
//! - **Token Refresh**: An OAuth access token is refreshed whenever it is stale; a rotated refresh token is exposed for persistence
//! - **Report Tree**: The nested section/row structure returned for one period
//! - **Flat Record**: One row per (account, class column), annotated with the account's full ancestry
//!
//! ## Example
//!
//! ```rust,ignore
//! use quickbooks_report_flattener::*;
//!
//! let config = ConnectorConfig::from_path("config.json")?;
//! let mut connector = ReportConnector::new(config)?;
//! let result = connector.read_all().await;
//!
//! // Persist a rotated refresh token even when the run failed part-way.
//! if let Some(refresh_token) = connector.rotated_refresh_token() {
//!     store_refresh_token(refresh_token)?;
//! }
//!
//! for (kind, records) in &result? {
//!     println!("{}: {} records", kind, records.len());
//! }
//! ```
//!
//! Flattening works without any network access:
//!
//! ```rust,ignore
//! use quickbooks_report_flattener::*;
//!
//! let tree = ReportTree::from_json_str(&body)?;
//! let records = flatten_report(&tree, ReportKind::BalanceSheet);
//! ```

pub mod config;
pub mod error;
pub mod flatten;
pub mod request;
pub mod schema;
pub mod slicer;
pub mod token;
pub mod utils;

#[cfg(feature = "http")]
pub mod client;

#[cfg(feature = "http")]
pub use client::{ReportConnector, ReportFetcher, TokenRefresher};
pub use config::{ConnectorConfig, OAuthCredentials};
pub use error::{ReportError, Result};
pub use flatten::{
    class_columns, class_labels, flatten_report, strip_index_suffix, AncestryContext,
    ClassColumn, ReportFlattener,
};
pub use request::ReportRequest;
pub use schema::*;
pub use slicer::{slice_months, slice_months_as_of, DateRange, PeriodSlice};
pub use token::{TokenResponse, TokenState};

