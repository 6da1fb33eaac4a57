//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use chrono::{Datelike, DateTime, Days, Months, NaiveDate, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Case folding shared by stored descriptions and search needles.
///
/// Unicode aware, unlike SQLite's `LOWER()`, which only folds ASCII.
pub(crate) fn fold_for_search(text: &str) -> String {
    text.to_lowercase()
}

/// First instant of `day` in UTC.
pub(crate) fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Last representable instant of `day` in UTC (`23:59:59.999999999`).
pub(crate) fn end_of_day(day: NaiveDate) -> ResultEngine<DateTime<Utc>> {
    let next = day
        .checked_add_days(Days::new(1))
        .ok_or_else(|| EngineError::InvalidInput("date out of range".to_string()))?;
    Ok(start_of_day(next) - TimeDelta::nanoseconds(1))
}

/// Returns `[first instant of the month, first instant of next month)` for the
/// month containing `now`.
pub(crate) fn month_bounds(now: DateTime<Utc>) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let out_of_range = || EngineError::InvalidInput("date out of range".to_string());
    let first = now
        .date_naive()
        .with_day0(0)
        .ok_or_else(out_of_range)?;
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or_else(out_of_range)?;
    Ok((start_of_day(first), start_of_day(next)))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn end_of_day_is_last_nanosecond() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let end = end_of_day(day).unwrap();
        assert_eq!(end.date_naive(), day);
        assert_eq!(
            end + TimeDelta::nanoseconds(1),
            Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn month_bounds_cover_calendar_month() {
        let now = Utc.with_ymd_and_hms(2024, 12, 17, 15, 0, 0).unwrap();
        let (from, to) = month_bounds(now).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(to, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn fold_lowercases_non_ascii() {
        assert_eq!(fold_for_search("CAFÉ Crème"), "café crème");
        assert_eq!(fold_for_search("ÄÖÜ"), "äöü");
    }

    #[test]
    fn parse_uuid_labels_error() {
        assert_eq!(
            parse_uuid("nope", "account").unwrap_err(),
            EngineError::InvalidId("invalid account id".to_string())
        );
    }
}
