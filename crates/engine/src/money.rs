use std::{fmt, str::FromStr};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Every amount and balance in the engine is stored in minor units to avoid
/// floating-point drift. Transaction amounts are always positive; the sign of
/// their effect on a balance comes from the transaction kind.
///
/// Values are bounded: a single amount never exceeds [`Money::MAX_AMOUNT`]
/// and a balance stays within `±`[`Money::MAX_BALANCE`]. Both bounds are far
/// below `i64::MAX`, so the increments applied by the database can never
/// overflow.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest transaction amount or budget: 1 000 000 000.00.
    pub const MAX_AMOUNT: Money = Money(100_000_000_000);

    /// Largest absolute account balance: 1 000 000 000 000.00.
    pub const MAX_BALANCE: Money = Money(100_000_000_000_000);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if `self` is a valid account balance.
    #[must_use]
    pub const fn is_valid_balance(self) -> bool {
        self.0 >= -Self::MAX_BALANCE.0 && self.0 <= Self::MAX_BALANCE.0
    }

    /// Parses a transaction amount: a decimal strictly greater than zero and
    /// at most [`Money::MAX_AMOUNT`].
    pub fn parse_positive(raw: &str) -> Result<Self, EngineError> {
        let amount: Money = raw.parse()?;
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
        }
        if amount > Self::MAX_AMOUNT {
            return Err(EngineError::InvalidAmount("amount too large".to_string()));
        }
        Ok(amount)
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// Rejects empty strings, non-digits (so `NaN`/`inf` never parse) and more
    /// than 2 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let cents_str = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let units: i64 = units_str.parse().map_err(|_| overflow())?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        if total > Self::MAX_BALANCE.0 {
            return Err(overflow());
        }
        Ok(Money(if negative { -total } else { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(1050).to_string(), "10.50");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("-0.01".parse::<Money>().unwrap().cents(), -1);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_non_numbers() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("NaN".parse::<Money>().is_err());
        assert!("inf".parse::<Money>().is_err());
        assert!("1e3".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn parse_positive_rejects_zero_and_negative() {
        assert_eq!(Money::parse_positive("30.00").unwrap(), Money::new(3000));
        assert_eq!(
            Money::parse_positive("0").unwrap_err(),
            EngineError::InvalidAmount("amount must be > 0".to_string())
        );
        assert!(Money::parse_positive("-5").is_err());
    }

    #[test]
    fn parse_rejects_out_of_range_values() {
        let too_large = EngineError::InvalidAmount("amount too large".to_string());
        assert_eq!(Money::parse_positive("1000000000.00").unwrap(), Money::MAX_AMOUNT);
        assert_eq!(Money::parse_positive("1000000000.01").unwrap_err(), too_large);
        assert_eq!(
            Money::parse_positive("50000000000000000.00").unwrap_err(),
            too_large
        );
        assert_eq!("-1000000000000".parse::<Money>().unwrap(), Money::new(-100_000_000_000_000));
        assert_eq!("1000000000000.01".parse::<Money>().unwrap_err(), too_large);
        assert_eq!("99999999999999999999".parse::<Money>().unwrap_err(), too_large);
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        assert_eq!(Money::new(1).checked_sub(Money::new(3)), Some(Money::new(-2)));
        assert_eq!(Money::new(i64::MAX).checked_add(Money::new(1)), None);
        assert_eq!(Money::new(i64::MIN).checked_sub(Money::new(1)), None);
        assert!(Money::MAX_BALANCE.is_valid_balance());
        assert!(!Money::new(-100_000_000_000_001).is_valid_balance());
    }
}
