//! Birth dates and age ranges.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive age bounds accepted by a flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl AgeRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, age: i32) -> bool {
        age >= self.min as i32 && age <= self.max as i32
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} and {}", self.min, self.max)
    }
}

/// Parse a `YYYY-MM-DD` date as produced by a date input.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Calendar age on `today`: one less if the birthday has not come yet.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Age for a raw birth-date value, `None` when it does not parse.
pub fn age_from_raw(raw: &str, today: NaiveDate) -> Option<i32> {
    parse_date(raw).map(|birth| age_on(birth, today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let birth = date(2010, 6, 15);
        assert_eq!(age_on(birth, date(2025, 6, 14)), 14);
        assert_eq!(age_on(birth, date(2025, 6, 15)), 15);
        assert_eq!(age_on(date(2010, 1, 1), date(2025, 3, 1)), 15);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_date("not-a-date").is_none());
        assert!(parse_date("2010-02-30").is_none());
        assert_eq!(parse_date(" 2010-01-01 "), Some(date(2010, 1, 1)));
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = AgeRange::new(16, 100);
        assert!(range.contains(16));
        assert!(range.contains(100));
        assert!(!range.contains(15));
        assert_eq!(range.to_string(), "16 and 100");
    }
}
