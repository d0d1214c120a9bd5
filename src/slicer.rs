use crate::error::{ReportError, Result};
use crate::utils::{first_day_of_month, format_api_date, last_day_of_month, next_month_start};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive date range. Construction enforces `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ReportError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// One report request's worth of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodSlice {
    /// No dates are sent; the report falls back to its own default period.
    ReportDefault,
    /// A range clipped to a single calendar month.
    Month(DateRange),
}

impl PeriodSlice {
    pub fn start_date(&self) -> Option<NaiveDate> {
        match self {
            PeriodSlice::ReportDefault => None,
            PeriodSlice::Month(range) => Some(range.start()),
        }
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        match self {
            PeriodSlice::ReportDefault => None,
            PeriodSlice::Month(range) => Some(range.end()),
        }
    }
}

impl fmt::Display for PeriodSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodSlice::ReportDefault => write!(f, "default period"),
            PeriodSlice::Month(range) => write!(
                f,
                "{}..{}",
                format_api_date(range.start()),
                format_api_date(range.end())
            ),
        }
    }
}

/// Splits `[start, end]` into calendar-month slices, defaulting `end` to today.
///
/// Callers needing deterministic output must pass both bounds, or use
/// [`slice_months_as_of`] with an explicit reference date.
pub fn slice_months(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Vec<PeriodSlice>> {
    slice_months_as_of(start, end, Utc::now().date_naive())
}

/// Same as [`slice_months`] with `today` supplied by the caller.
///
/// # Examples
/// - `2024-01-15..2024-03-10` gives `[01-15, 01-31]`, `[02-01, 02-29]`, `[03-01, 03-10]`
/// - A missing `start` gives a single [`PeriodSlice::ReportDefault`]
pub fn slice_months_as_of(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<Vec<PeriodSlice>> {
    let Some(start) = start else {
        return Ok(vec![PeriodSlice::ReportDefault]);
    };
    let end = end.unwrap_or(today);
    let overall = DateRange::new(start, end)?;

    let mut slices = Vec::new();
    let mut cursor = first_day_of_month(overall.start());

    while cursor <= overall.end() {
        let month_end = last_day_of_month(cursor.year(), cursor.month())?;
        let lower = cursor.max(overall.start());
        let upper = month_end.min(overall.end());

        slices.push(PeriodSlice::Month(DateRange::new(lower, upper)?));
        cursor = next_month_start(cursor)?;
    }

    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(start: NaiveDate, end: NaiveDate) -> PeriodSlice {
        PeriodSlice::Month(DateRange::new(start, end).unwrap())
    }

    #[test]
    fn test_leap_year_three_slices() {
        let slices =
            slice_months(Some(date(2024, 1, 15)), Some(date(2024, 3, 10))).unwrap();

        assert_eq!(
            slices,
            vec![
                month(date(2024, 1, 15), date(2024, 1, 31)),
                month(date(2024, 2, 1), date(2024, 2, 29)),
                month(date(2024, 3, 1), date(2024, 3, 10)),
            ]
        );
    }

    #[test]
    fn test_missing_start_yields_report_default() {
        let slices = slice_months(None, Some(date(2024, 3, 10))).unwrap();
        assert_eq!(slices, vec![PeriodSlice::ReportDefault]);
        assert_eq!(slices[0].start_date(), None);
        assert_eq!(slices[0].end_date(), None);
    }

    #[test]
    fn test_missing_end_defaults_to_today() {
        let today = date(2024, 6, 15);
        let slices = slice_months_as_of(Some(date(2024, 5, 20)), None, today).unwrap();

        assert_eq!(
            slices,
            vec![
                month(date(2024, 5, 20), date(2024, 5, 31)),
                month(date(2024, 6, 1), date(2024, 6, 15)),
            ]
        );
    }

    #[test]
    fn test_start_after_end_is_rejected() {
        let err = slice_months(Some(date(2024, 3, 1)), Some(date(2024, 2, 1))).unwrap_err();
        assert!(matches!(err, ReportError::InvalidRange { .. }));
    }

    #[test]
    fn test_single_day_range() {
        let day = date(2023, 12, 31);
        let slices = slice_months(Some(day), Some(day)).unwrap();
        assert_eq!(slices, vec![month(day, day)]);
    }

    #[test]
    fn test_year_rollover() {
        let slices =
            slice_months(Some(date(2023, 11, 30)), Some(date(2024, 1, 2))).unwrap();

        assert_eq!(
            slices,
            vec![
                month(date(2023, 11, 30), date(2023, 11, 30)),
                month(date(2023, 12, 1), date(2023, 12, 31)),
                month(date(2024, 1, 1), date(2024, 1, 2)),
            ]
        );
    }

    #[test]
    fn test_slices_are_contiguous_and_cover_range() {
        let ranges = [
            (date(2020, 2, 29), date(2021, 3, 1)),
            (date(2023, 1, 1), date(2023, 12, 31)),
            (date(2024, 7, 4), date(2024, 7, 5)),
            (date(2019, 12, 31), date(2020, 1, 1)),
        ];

        for (start, end) in ranges {
            let slices = slice_months(Some(start), Some(end)).unwrap();

            assert_eq!(slices.first().unwrap().start_date(), Some(start));
            assert_eq!(slices.last().unwrap().end_date(), Some(end));

            for pair in slices.windows(2) {
                let prev_end = pair[0].end_date().unwrap();
                let next_start = pair[1].start_date().unwrap();
                assert_eq!(prev_end.succ_opt().unwrap(), next_start);
            }

            for slice in &slices {
                let (s, e) = (slice.start_date().unwrap(), slice.end_date().unwrap());
                assert!(s <= e);
                assert_eq!(s.year(), e.year());
                assert_eq!(s.month(), e.month());
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            month(date(2024, 2, 1), date(2024, 2, 29)).to_string(),
            "2024-02-01..2024-02-29"
        );
        assert_eq!(PeriodSlice::ReportDefault.to_string(), "default period");
    }
}
