//! Calling-code table used by phone validation.

/// Expected number of national digits after the calling code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhoneLength {
    Exact(usize),
    OneOf(&'static [usize]),
    /// No published length; 6 to 12 digits are accepted.
    Unspecified,
}

impl PhoneLength {
    pub const UNSPECIFIED_RANGE: std::ops::RangeInclusive<usize> = 6..=12;

    pub fn accepts(&self, digits: usize) -> bool {
        match self {
            Self::Exact(n) => digits == *n,
            Self::OneOf(ns) => ns.contains(&digits),
            Self::Unspecified => Self::UNSPECIFIED_RANGE.contains(&digits),
        }
    }

    /// Human-readable expectation, e.g. `10`, `8 or 9`, `6-12`.
    pub fn describe(&self) -> String {
        match self {
            Self::Exact(n) => n.to_string(),
            Self::OneOf(ns) => ns
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(" or "),
            Self::Unspecified => format!(
                "{}-{}",
                Self::UNSPECIFIED_RANGE.start(),
                Self::UNSPECIFIED_RANGE.end()
            ),
        }
    }
}

/// One calling-code entry. `code` holds digits only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountryCode {
    pub code: &'static str,
    pub country: &'static str,
    pub length: PhoneLength,
}

const fn cc(code: &'static str, country: &'static str, length: PhoneLength) -> CountryCode {
    CountryCode { code, country, length }
}

use PhoneLength::{Exact, OneOf, Unspecified};

pub static COUNTRY_CODES: &[CountryCode] = &[
    cc("1", "United States / Canada", Exact(10)),
    cc("7", "Russia", Exact(10)),
    cc("20", "Egypt", Exact(10)),
    cc("27", "South Africa", Exact(9)),
    cc("30", "Greece", Exact(10)),
    cc("31", "Netherlands", Exact(9)),
    cc("32", "Belgium", OneOf(&[8, 9])),
    cc("33", "France", Exact(9)),
    cc("34", "Spain", Exact(9)),
    cc("36", "Hungary", OneOf(&[8, 9])),
    cc("39", "Italy", OneOf(&[9, 10])),
    cc("40", "Romania", Exact(9)),
    cc("41", "Switzerland", Exact(9)),
    cc("43", "Austria", Unspecified),
    cc("44", "United Kingdom", Exact(10)),
    cc("45", "Denmark", Exact(8)),
    cc("46", "Sweden", OneOf(&[7, 8, 9])),
    cc("47", "Norway", Exact(8)),
    cc("48", "Poland", Exact(9)),
    cc("49", "Germany", OneOf(&[10, 11])),
    cc("51", "Peru", Exact(9)),
    cc("52", "Mexico", Exact(10)),
    cc("53", "Cuba", Exact(8)),
    cc("54", "Argentina", Exact(10)),
    cc("55", "Brazil", OneOf(&[10, 11])),
    cc("56", "Chile", Exact(9)),
    cc("57", "Colombia", Exact(10)),
    cc("58", "Venezuela", Exact(10)),
    cc("60", "Malaysia", OneOf(&[9, 10])),
    cc("61", "Australia", Exact(9)),
    cc("62", "Indonesia", Unspecified),
    cc("63", "Philippines", Exact(10)),
    cc("64", "New Zealand", OneOf(&[8, 9, 10])),
    cc("65", "Singapore", Exact(8)),
    cc("66", "Thailand", Exact(9)),
    cc("81", "Japan", Exact(10)),
    cc("82", "South Korea", OneOf(&[9, 10])),
    cc("84", "Vietnam", Exact(9)),
    cc("86", "China", Exact(11)),
    cc("90", "Turkey", Exact(10)),
    cc("91", "India", Exact(10)),
    cc("92", "Pakistan", Exact(10)),
    cc("93", "Afghanistan", Exact(9)),
    cc("94", "Sri Lanka", Exact(9)),
    cc("95", "Myanmar", Unspecified),
    cc("98", "Iran", Exact(10)),
    cc("211", "South Sudan", Exact(9)),
    cc("212", "Morocco", Exact(9)),
    cc("213", "Algeria", Exact(9)),
    cc("216", "Tunisia", Exact(8)),
    cc("218", "Libya", Exact(9)),
    cc("220", "Gambia", Exact(7)),
    cc("221", "Senegal", Exact(9)),
    cc("233", "Ghana", Exact(9)),
    cc("234", "Nigeria", Exact(10)),
    cc("249", "Sudan", Exact(9)),
    cc("251", "Ethiopia", Exact(9)),
    cc("254", "Kenya", Exact(9)),
    cc("255", "Tanzania", Exact(9)),
    cc("256", "Uganda", Exact(9)),
    cc("263", "Zimbabwe", Exact(9)),
    cc("351", "Portugal", Exact(9)),
    cc("353", "Ireland", Exact(9)),
    cc("358", "Finland", Unspecified),
    cc("380", "Ukraine", Exact(9)),
    cc("420", "Czech Republic", Exact(9)),
    cc("852", "Hong Kong", Exact(8)),
    cc("880", "Bangladesh", Exact(10)),
    cc("886", "Taiwan", Exact(9)),
    cc("960", "Maldives", Exact(7)),
    cc("961", "Lebanon", OneOf(&[7, 8])),
    cc("962", "Jordan", Exact(9)),
    cc("963", "Syria", Exact(9)),
    cc("964", "Iraq", Exact(10)),
    cc("965", "Kuwait", Exact(8)),
    cc("966", "Saudi Arabia", Exact(9)),
    cc("967", "Yemen", Exact(9)),
    cc("968", "Oman", Exact(8)),
    cc("970", "Palestine", Exact(9)),
    cc("971", "United Arab Emirates", Exact(9)),
    cc("972", "Israel", Exact(9)),
    cc("973", "Bahrain", Exact(8)),
    cc("974", "Qatar", Exact(8)),
];

/// Entry with the longest calling code that prefixes `digits`.
pub fn find_matching_country(digits: &str) -> Option<&'static CountryCode> {
    COUNTRY_CODES
        .iter()
        .filter(|c| digits.starts_with(c.code))
        .max_by_key(|c| c.code.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_prefix_wins() {
        // "212" (Morocco) must beat any shorter code sharing the prefix.
        let m = find_matching_country("212612345678").unwrap();
        assert_eq!(m.country, "Morocco");
        let us = find_matching_country("15551234567").unwrap();
        assert_eq!(us.code, "1");
    }

    #[test]
    fn test_no_match() {
        assert!(find_matching_country("0123456").is_none());
    }

    #[test]
    fn test_codes_are_digits_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for c in COUNTRY_CODES {
            assert!(c.code.chars().all(|ch| ch.is_ascii_digit()), "{}", c.code);
            assert!(seen.insert(c.code), "duplicate code {}", c.code);
        }
    }

    #[test]
    fn test_length_description() {
        assert_eq!(Exact(10).describe(), "10");
        assert_eq!(OneOf(&[8, 9]).describe(), "8 or 9");
        assert_eq!(Unspecified.describe(), "6-12");
    }
}
