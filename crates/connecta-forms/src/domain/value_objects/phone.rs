//! Phone Value Object
//!
//! International phone validation against the calling-code table.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::country_codes::find_matching_country;

const MIN_DIGITS: usize = 4;
const MAX_DIGITS: usize = 15;

/// A phone number that passed validation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber {
    digits: String,
    country: String,
}

impl PhoneNumber {
    /// Validate `raw` and return the normalized number.
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();

        if cleaned.is_empty() {
            return Err(PhoneError::Empty);
        }

        let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::InvalidCharacters);
        }
        if digits.len() < MIN_DIGITS {
            return Err(PhoneError::TooShort);
        }
        if digits.len() > MAX_DIGITS {
            return Err(PhoneError::TooLong);
        }

        let country = find_matching_country(digits).ok_or(PhoneError::UnknownCountryCode)?;
        let national = digits.len() - country.code.len();

        if !country.length.accepts(national) {
            return Err(PhoneError::InvalidLength {
                country: country.country.to_string(),
                expected: country.length.describe(),
                actual: national,
            });
        }

        Ok(Self {
            digits: digits.to_string(),
            country: country.country.to_string(),
        })
    }

    /// Digits only, including the calling code.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Format as E.164
    pub fn to_e164(&self) -> String {
        format!("+{}", self.digits)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_e164())
    }
}

/// Strip every non-digit character (`+`, spaces, dashes...).
pub fn sanitize_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneError {
    #[error("Phone number is empty or contains no digits")]
    Empty,
    #[error("Phone number contains invalid characters")]
    InvalidCharacters,
    #[error("Phone number is too short (minimum 4 digits)")]
    TooShort,
    #[error("Phone number is too long (maximum 15 digits)")]
    TooLong,
    #[error("No matching country code found")]
    UnknownCountryCode,
    #[error("Invalid phone length for {country}. Expected {expected} digits after country code, got {actual}")]
    InvalidLength {
        country: String,
        expected: String,
        actual: usize,
    },
}

/// A rejected entry from a batch check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidPhone {
    pub phone_number: String,
    pub reason: String,
}

/// Validate many numbers, returning only the rejected ones.
pub fn validate_all<S: AsRef<str>>(numbers: &[S]) -> Vec<InvalidPhone> {
    numbers
        .iter()
        .filter_map(|n| {
            PhoneNumber::parse(n.as_ref()).err().map(|e| InvalidPhone {
                phone_number: n.as_ref().to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::country_codes::COUNTRY_CODES;
    use proptest::prelude::*;

    #[test]
    fn test_egyptian_mobile() {
        let phone = PhoneNumber::parse("201012345678").unwrap();
        assert_eq!(phone.to_e164(), "+201012345678");
        assert_eq!(phone.country(), "Egypt");
    }

    #[test]
    fn test_formatting_characters_are_ignored() {
        let phone = PhoneNumber::parse("+20 101-234-5678").unwrap();
        assert_eq!(phone.digits(), "201012345678");
    }

    #[test]
    fn test_wrong_national_length() {
        let err = PhoneNumber::parse("+2010123456").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid phone length for Egypt. Expected 10 digits after country code, got 8"
        );
    }

    #[test]
    fn test_bounds_and_empty() {
        assert_eq!(PhoneNumber::parse("abc"), Err(PhoneError::Empty));
        assert_eq!(PhoneNumber::parse("+123"), Err(PhoneError::TooShort));
        assert_eq!(PhoneNumber::parse("1234567890123456"), Err(PhoneError::TooLong));
        assert_eq!(PhoneNumber::parse("++201012345678"), Err(PhoneError::InvalidCharacters));
        assert_eq!(PhoneNumber::parse("0101234567"), Err(PhoneError::UnknownCountryCode));
    }

    #[test]
    fn test_validate_all_reports_only_invalid() {
        let invalid = validate_all(&["+201012345678", "12", "+15551234567"]);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].phone_number, "12");
    }

    #[test]
    fn test_sanitize_digits() {
        assert_eq!(sanitize_digits("+20 (101) 234-5678"), "201012345678");
    }

    fn reference_validity(raw: &str) -> bool {
        let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
        let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
        if digits.is_empty()
            || !digits.chars().all(|c| c.is_ascii_digit())
            || digits.len() < 4
            || digits.len() > 15
        {
            return false;
        }
        let best = COUNTRY_CODES
            .iter()
            .filter(|c| digits.starts_with(c.code))
            .max_by_key(|c| c.code.len());
        match best {
            Some(c) => c.length.accepts(digits.len() - c.code.len()),
            None => false,
        }
    }

    proptest! {
        #[test]
        fn valid_iff_longest_prefix_and_length_match(raw in "[+]?[0-9 ()-]{0,20}") {
            prop_assert_eq!(PhoneNumber::parse(&raw).is_ok(), reference_validity(&raw));
        }

        #[test]
        fn every_country_accepts_its_own_length(idx in 0..COUNTRY_CODES.len(), fill in "[0-9]{12}") {
            let country = &COUNTRY_CODES[idx];
            let national = match country.length {
                crate::domain::value_objects::PhoneLength::Exact(n) => n,
                crate::domain::value_objects::PhoneLength::OneOf(ns) => ns[0],
                crate::domain::value_objects::PhoneLength::Unspecified => 8,
            };
            let number = format!("{}{}", country.code, &fill[..national.min(12)]);
            prop_assume!(number.len() <= 15);
            // A longer code may legitimately claim the number.
            let winner = crate::domain::value_objects::find_matching_country(&number).unwrap();
            prop_assume!(winner.code == country.code);
            prop_assert!(PhoneNumber::parse(&number).is_ok());
        }
    }
}
