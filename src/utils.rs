use crate::error::{ReportError, Result};
use chrono::{Datelike, Days, NaiveDate};

/// Date format used by the reporting API for query parameters.
pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the given month, computed as the first of the following month
/// minus one day so December rolls into January of the next year.
pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .ok_or_else(|| {
            ReportError::DateError(format!("No last day for month {}-{:02}", year, month))
        })
}

pub fn next_month_start(date: NaiveDate) -> Result<NaiveDate> {
    let year = if date.month() == 12 {
        date.year() + 1
    } else {
        date.year()
    };

    let month = if date.month() == 12 {
        1
    } else {
        date.month() + 1
    };

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        ReportError::DateError(format!("Cannot advance past {}", date))
    })
}

pub fn format_api_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` string as used in connector configuration.
pub fn parse_api_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), API_DATE_FORMAT).map_err(|_| {
        ReportError::DateError(format!(
            "Invalid date format: {}. Expected YYYY-MM-DD",
            value
        ))
    })
}
