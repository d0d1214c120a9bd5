use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Authentication failed (status {status}): {body}")]
    Auth { status: u16, body: String },

    #[error("Report request failed (status {status}): {body}")]
    Transport { status: u16, body: String },

    #[error("Malformed report payload: {0}")]
    MalformedReport(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl ReportError {
    /// True for failures that mean the credentials are unusable: a rejected
    /// refresh exchange or a 401/403 from the report endpoint.
    pub fn is_auth(&self) -> bool {
        matches!(self, ReportError::Auth { .. })
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
