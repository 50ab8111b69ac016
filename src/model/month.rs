use crate::report::ReportError;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A calendar month, e.g. `2026-03`. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    first_day: NaiveDate,
}

impl Month {
    /// Creates a `Month`. Fails with `ReportError::InvalidWindow` if `month` is outside 1–12 or
    /// the year is out of range.
    pub fn new(year: i32, month: u32) -> Result<Self, ReportError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or(ReportError::InvalidWindow { year, month })
    }

    /// The month that contains `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first_day: date - Days::new(u64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The month number, 1–12.
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Month::of(date) == *self
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Month {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow::anyhow!("Expected a month formatted as YYYY-MM, got '{s}'"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid year in '{s}'"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid month in '{s}'"))?;
        Ok(Month::new(year, month)?)
    }
}

impl Serialize for Month {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Month::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        assert!(matches!(
            Month::new(2026, 13),
            Err(ReportError::InvalidWindow {
                year: 2026,
                month: 13
            })
        ));
        assert!(Month::new(2026, 0).is_err());
    }

    #[test]
    fn test_date_range() {
        let feb = Month::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), date(2024, 2, 1));
        assert_eq!(feb.last_day(), date(2024, 2, 29));

        let dec = Month::new(2025, 12).unwrap();
        assert_eq!(dec.last_day(), date(2025, 12, 31));
    }

    #[test]
    fn test_of_and_contains() {
        let m = Month::of(date(2026, 3, 17));
        assert_eq!(m, Month::new(2026, 3).unwrap());
        assert!(m.contains(date(2026, 3, 1)));
        assert!(m.contains(date(2026, 3, 31)));
        assert!(!m.contains(date(2026, 4, 1)));
        assert!(!m.contains(date(2025, 3, 15)));
    }

    #[test]
    fn test_label_and_parse() {
        let m = Month::new(2026, 4).unwrap();
        assert_eq!(m.to_string(), "2026-04");
        assert_eq!(Month::from_str("2026-04").unwrap(), m);
        assert!(Month::from_str("2026-13").is_err());
        assert!(Month::from_str("April").is_err());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a = Month::new(2025, 12).unwrap();
        let b = Month::new(2026, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_serializes_as_label() {
        let m = Month::new(2026, 1).unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"2026-01\"");
    }
}
