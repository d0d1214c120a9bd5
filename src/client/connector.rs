use crate::client::auth::TokenRefresher;
use crate::client::reports::ReportFetcher;
use crate::config::ConnectorConfig;
use crate::error::Result;
use crate::flatten::ReportFlattener;
use crate::request::ReportRequest;
use crate::schema::{FlatRecord, ReportKind};
use crate::slicer::{slice_months, PeriodSlice};
use crate::token::TokenState;
use log::{debug, info};
use reqwest::Client;
use std::collections::BTreeMap;

/// One connector run: slices the configured range, keeps the token fresh,
/// fetches every slice sequentially and flattens the results.
///
/// The run owns its [`TokenState`]; it is never shared with another run.
pub struct ReportConnector {
    config: ConnectorConfig,
    refresher: TokenRefresher,
    fetcher: ReportFetcher,
}

impl ReportConnector {
    pub fn new(config: ConnectorConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::new();
        let refresher = TokenRefresher::with_client(client.clone(), &config.credentials);
        let fetcher = ReportFetcher::with_client(client, config.api_base());

        Ok(Self {
            config,
            refresher,
            fetcher,
        })
    }

    /// Points the connector at other endpoints (sandbox proxies, test servers).
    pub fn with_endpoints(mut self, api_base: impl Into<String>, token_url: impl Into<String>) -> Self {
        let client = Client::new();
        self.refresher =
            TokenRefresher::with_client(client.clone(), &self.config.credentials).with_token_url(token_url);
        self.fetcher = ReportFetcher::with_client(client, api_base);
        self
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn token_state(&self) -> &TokenState {
        self.refresher.state()
    }

    /// Refresh token issued during this run, if the endpoint rotated it.
    pub fn rotated_refresh_token(&self) -> Option<&str> {
        self.refresher.state().rotated_refresh_token()
    }

    pub fn slices(&self) -> Result<Vec<PeriodSlice>> {
        slice_months(self.config.start_date, self.config.end_date)
    }

    /// Fetches and flattens a single slice. Errors are returned as-is so the
    /// caller can decide between aborting and skipping the slice.
    pub async fn read_slice(&mut self, kind: ReportKind, slice: &PeriodSlice) -> Result<Vec<FlatRecord>> {
        let request = ReportRequest::with_options(
            kind,
            &self.config.realm_id,
            slice,
            &self.config.accounting_method,
            &self.config.summarize_column_by,
        );

        let access_token = self.refresher.access_token().await?;
        let tree = self.fetcher.fetch(&request, &access_token).await?;
        let records = ReportFlattener::new(kind).flatten(&tree);

        debug!("[{}] {} records", request, records.len());
        Ok(records)
    }

    /// All slices of one report, concatenated in chronological order.
    /// Stops at the first slice that fails.
    pub async fn read_report(&mut self, kind: ReportKind) -> Result<Vec<FlatRecord>> {
        let slices = self.slices()?;
        info!(
            "Reading {} for realm {} in {} slice(s)",
            kind,
            self.config.realm_id,
            slices.len()
        );

        let mut records = Vec::new();
        for slice in &slices {
            records.extend(self.read_slice(kind, slice).await?);
        }

        info!("Read {} {} records", records.len(), kind);
        Ok(records)
    }

    /// One record stream per configured report.
    pub async fn read_all(&mut self) -> Result<BTreeMap<ReportKind, Vec<FlatRecord>>> {
        let mut streams = BTreeMap::new();

        for kind in self.config.reports.clone() {
            if streams.contains_key(&kind) {
                continue;
            }
            let records = self.read_report(kind).await?;
            streams.insert(kind, records);
        }

        Ok(streams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthCredentials;
    use crate::error::ReportError;
    use chrono::NaiveDate;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config(start: Option<NaiveDate>, end: Option<NaiveDate>) -> ConnectorConfig {
        ConnectorConfig::new(
            "123456789",
            OAuthCredentials {
                client_id: "cid".to_string(),
                client_secret: "csec".to_string(),
                refresh_token: "refresh-1".to_string(),
            },
        )
        .with_dates(start, end)
        .with_reports(vec![ReportKind::BalanceSheet])
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        let result = ReportConnector::new(config(
            NaiveDate::from_ymd_opt(2024, 3, 1),
            NaiveDate::from_ymd_opt(2024, 1, 1),
        ));
        assert!(matches!(result, Err(ReportError::InvalidRange { .. })));
    }

    #[tokio::test]
    async fn test_auth_failure_aborts_before_any_report_request() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(401).body("invalid_client");
            })
            .await;
        let report = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(json!({}));
            })
            .await;

        let mut connector = ReportConnector::new(config(None, None))
            .unwrap()
            .with_endpoints(server.url("/v3"), server.url("/token"));

        let err = connector.read_report(ReportKind::BalanceSheet).await.unwrap_err();
        assert!(err.is_auth());
        report.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_default_slice_omits_dates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(200)
                    .json_body(json!({ "access_token": "a", "expires_in": 3600 }));
            })
            .await;
        let report = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v3/company/123456789/reports/BalanceSheet")
                    .query_param_exists("summarize_column_by");
                then.status(200).json_body(json!({ "Header": {}, "Rows": {} }));
            })
            .await;

        let mut connector = ReportConnector::new(config(None, None))
            .unwrap()
            .with_endpoints(server.url("/v3"), server.url("/token"));

        let records = connector.read_report(ReportKind::BalanceSheet).await.unwrap();
        assert!(records.is_empty());
        report.assert_hits_async(1).await;
    }
}
