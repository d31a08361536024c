//! Value Objects module
//!
//! Immutable, validated domain primitives.

pub mod birth_date;
pub mod country_codes;
pub mod phone;
pub mod script;

pub use birth_date::{age_from_raw, age_on, parse_date, AgeRange};
pub use country_codes::{find_matching_country, CountryCode, PhoneLength, COUNTRY_CODES};
pub use phone::{sanitize_digits, validate_all, InvalidPhone, PhoneError, PhoneNumber};
pub use script::Script;
