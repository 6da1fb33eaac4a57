//! Next-occurrence computation for recurring transactions.

use chrono::{DateTime, Days, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// How often a recurring transaction happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringInterval {
    Daily,
    Weekly,
    /// A calendar month of variable length.
    Monthly,
    Yearly,
}

impl RecurringInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Returns the occurrence following `start`.
    ///
    /// Month and year steps keep the day of month when the target month has
    /// it and otherwise clamp to the target month's last day, so Jan 31 is
    /// followed by the end of February and Feb 29 by Feb 28 of the next
    /// (non-leap) year. The time of day is preserved.
    pub fn next_occurrence(self, start: DateTime<Utc>) -> ResultEngine<DateTime<Utc>> {
        let next = match self {
            Self::Daily => start.checked_add_days(Days::new(1)),
            Self::Weekly => start.checked_add_days(Days::new(7)),
            Self::Monthly => start.checked_add_months(Months::new(1)),
            Self::Yearly => start.checked_add_months(Months::new(12)),
        };
        next.ok_or_else(|| EngineError::InvalidInput("date out of range".to_string()))
    }
}

impl TryFrom<&str> for RecurringInterval {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            "YEARLY" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidInput(format!(
                "invalid recurring interval: {other}"
            ))),
        }
    }
}

/// Recurrence settings of a transaction after validation.
///
/// `next_recurring_date` is derived here and nowhere else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Recurrence {
    pub(crate) is_recurring: bool,
    pub(crate) interval: Option<RecurringInterval>,
    pub(crate) next_date: Option<DateTime<Utc>>,
}

impl Recurrence {
    pub(crate) fn resolve(
        is_recurring: bool,
        interval: Option<RecurringInterval>,
        date: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !is_recurring {
            return Ok(Self {
                is_recurring: false,
                interval: None,
                next_date: None,
            });
        }
        let interval = interval.ok_or_else(|| {
            EngineError::InvalidInput(
                "recurring_interval is required for recurring transactions".to_string(),
            )
        })?;
        Ok(Self {
            is_recurring: true,
            interval: Some(interval),
            next_date: Some(interval.next_occurrence(date)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn daily_and_weekly_add_fixed_days() {
        assert_eq!(
            RecurringInterval::Daily.next_occurrence(at(2024, 12, 31)).unwrap(),
            at(2025, 1, 1)
        );
        assert_eq!(
            RecurringInterval::Weekly.next_occurrence(at(2024, 2, 26)).unwrap(),
            at(2024, 3, 4)
        );
    }

    #[test]
    fn monthly_clamps_to_last_day_of_month() {
        assert_eq!(
            RecurringInterval::Monthly.next_occurrence(at(2024, 1, 31)).unwrap(),
            at(2024, 2, 29)
        );
        assert_eq!(
            RecurringInterval::Monthly.next_occurrence(at(2023, 1, 31)).unwrap(),
            at(2023, 2, 28)
        );
        assert_eq!(
            RecurringInterval::Monthly.next_occurrence(at(2024, 12, 15)).unwrap(),
            at(2025, 1, 15)
        );
    }

    #[test]
    fn yearly_moves_leap_day_to_feb_28() {
        assert_eq!(
            RecurringInterval::Yearly.next_occurrence(at(2024, 2, 29)).unwrap(),
            at(2025, 2, 28)
        );
        assert_eq!(
            RecurringInterval::Yearly.next_occurrence(at(2023, 6, 1)).unwrap(),
            at(2024, 6, 1)
        );
    }

    #[test]
    fn unknown_interval_is_rejected() {
        assert_eq!(
            RecurringInterval::try_from("FORTNIGHTLY").unwrap_err(),
            EngineError::InvalidInput("invalid recurring interval: FORTNIGHTLY".to_string())
        );
    }

    #[test]
    fn resolve_requires_interval_when_recurring() {
        assert!(Recurrence::resolve(true, None, at(2024, 1, 1)).is_err());

        let none = Recurrence::resolve(false, Some(RecurringInterval::Daily), at(2024, 1, 1))
            .unwrap();
        assert_eq!(none.interval, None);
        assert_eq!(none.next_date, None);

        let monthly =
            Recurrence::resolve(true, Some(RecurringInterval::Monthly), at(2024, 1, 31)).unwrap();
        assert_eq!(monthly.next_date, Some(at(2024, 2, 29)));
    }
}
