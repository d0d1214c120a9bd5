use crate::error::{ReportError, Result};
use crate::request::{DEFAULT_ACCOUNTING_METHOD, DEFAULT_SUMMARIZE_COLUMN_BY};
use crate::schema::ReportKind;
use crate::slicer::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const PRODUCTION_API_BASE: &str = "https://quickbooks.api.intuit.com/v3";
pub const SANDBOX_API_BASE: &str = "https://sandbox-quickbooks.api.intuit.com/v3";
pub const TOKEN_ENDPOINT: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";

#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Company id of the QuickBooks Online account.
    pub realm_id: String,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    pub credentials: OAuthCredentials,

    #[serde(default = "default_reports")]
    pub reports: Vec<ReportKind>,

    #[serde(default = "default_summarize_column_by")]
    pub summarize_column_by: String,

    #[serde(default = "default_accounting_method")]
    pub accounting_method: String,

    #[serde(default)]
    pub sandbox: bool,
}

fn default_reports() -> Vec<ReportKind> {
    ReportKind::ALL.to_vec()
}

fn default_summarize_column_by() -> String {
    DEFAULT_SUMMARIZE_COLUMN_BY.to_string()
}

fn default_accounting_method() -> String {
    DEFAULT_ACCOUNTING_METHOD.to_string()
}

impl ConnectorConfig {
    pub fn new(realm_id: impl Into<String>, credentials: OAuthCredentials) -> Self {
        Self {
            realm_id: realm_id.into(),
            start_date: None,
            end_date: None,
            credentials,
            reports: default_reports(),
            summarize_column_by: default_summarize_column_by(),
            accounting_method: default_accounting_method(),
            sandbox: false,
        }
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_reports(mut self, reports: Vec<ReportKind>) -> Self {
        self.reports = reports;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ConnectorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.realm_id.trim().is_empty() {
            return Err(ReportError::InvalidConfig("realm_id is empty".to_string()));
        }

        for (name, value) in [
            ("client_id", &self.credentials.client_id),
            ("client_secret", &self.credentials.client_secret),
            ("refresh_token", &self.credentials.refresh_token),
        ] {
            if value.trim().is_empty() {
                return Err(ReportError::InvalidConfig(format!(
                    "credentials.{} is empty",
                    name
                )));
            }
        }

        if self.reports.is_empty() {
            return Err(ReportError::InvalidConfig(
                "at least one report must be requested".to_string(),
            ));
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            DateRange::new(start, end)?;
        }

        Ok(())
    }

    pub fn api_base(&self) -> &'static str {
        if self.sandbox {
            SANDBOX_API_BASE
        } else {
            PRODUCTION_API_BASE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_json() -> serde_json::Value {
        json!({
            "realm_id": "123456789",
            "start_date": "2024-01-01",
            "end_date": "2024-12-31",
            "credentials": {
                "client_id": "test_client_id",
                "client_secret": "test_client_secret",
                "refresh_token": "test_refresh_token"
            }
        })
    }

    #[test]
    fn test_defaults() {
        let config = ConnectorConfig::from_json_str(&base_json().to_string()).unwrap();

        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(config.reports, ReportKind::ALL.to_vec());
        assert_eq!(config.summarize_column_by, "Total");
        assert_eq!(config.accounting_method, "Accrual");
        assert_eq!(config.api_base(), PRODUCTION_API_BASE);
    }

    #[test]
    fn test_explicit_reports_and_sandbox() {
        let mut value = base_json();
        value["reports"] = json!(["ProfitAndLoss"]);
        value["sandbox"] = json!(true);
        value["summarize_column_by"] = json!("Classes");

        let config = ConnectorConfig::from_json_str(&value.to_string()).unwrap();
        assert_eq!(config.reports, vec![ReportKind::ProfitAndLoss]);
        assert_eq!(config.api_base(), SANDBOX_API_BASE);
        assert_eq!(config.summarize_column_by, "Classes");
    }

    #[test]
    fn test_inverted_dates_rejected() {
        let mut value = base_json();
        value["start_date"] = json!("2025-01-01");

        let err = ConnectorConfig::from_json_str(&value.to_string()).unwrap_err();
        assert!(matches!(err, ReportError::InvalidRange { .. }));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let mut value = base_json();
        value["credentials"]["client_secret"] = json!("");

        let err = ConnectorConfig::from_json_str(&value.to_string()).unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig(msg) if msg.contains("client_secret")));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, base_json().to_string()).unwrap();

        let config = ConnectorConfig::from_path(&path).unwrap();
        assert_eq!(config.realm_id, "123456789");

        let missing = ConnectorConfig::from_path(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, ReportError::IoError(_)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ConnectorConfig::from_json_str(&base_json().to_string()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("test_client_secret"));
        assert!(!rendered.contains("test_refresh_token"));
    }
}
