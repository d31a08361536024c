//! Validation Rule Set
//!
//! Every field carries exactly one [`Rule`]. A rule is a pure function of the
//! field's value, the whole form (for conditional requirements) and the
//! evaluation context (for age arithmetic). `None` means valid.

use regex::Regex;
use std::sync::OnceLock;

use super::conditions::{Condition, EvalContext};
use super::state::FormState;
use super::value::FieldValue;
use super::value_objects::{age_on, parse_date, AgeRange, PhoneNumber};

pub const REQUIRED: &str = "This field is required";

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z\s'-]+$").expect("valid name pattern"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// First/last name: required, at least 2 characters, letters, spaces,
    /// hyphens and apostrophes only. `label` prefixes the required message.
    PersonName { label: String },
    Phone,
    BirthDate(AgeRange),
    RequiredText { message: String },
    RequiredChoice { message: String },
    /// Multi-select with at least one item.
    RequiredMany { message: String },
    /// Checkbox that must be ticked.
    Confirmation { message: String },
    Email,
    /// Must start with `http` when non-empty.
    Url { required: bool },
    WordLimit { max: usize, required: bool },
    /// Required only while `when` holds.
    RequiredWhen { when: Condition, message: String },
    /// Required while any case holds; the first holding case names the message.
    RequiredCases(Vec<(Condition, String)>),
    Optional,
}

impl Rule {
    pub fn person_name(label: &str) -> Self {
        Self::PersonName { label: label.into() }
    }

    pub fn required_text(message: &str) -> Self {
        Self::RequiredText { message: message.into() }
    }

    pub fn required_choice(message: &str) -> Self {
        Self::RequiredChoice { message: message.into() }
    }

    pub fn required_many(message: &str) -> Self {
        Self::RequiredMany { message: message.into() }
    }

    pub fn confirmation() -> Self {
        Self::Confirmation { message: "You must accept this confirmation".into() }
    }

    pub fn required_when(when: Condition, message: &str) -> Self {
        Self::RequiredWhen { when, message: message.into() }
    }

    /// Error message for `value`, or `None` when it is acceptable.
    pub fn check(
        &self,
        _field: &str,
        value: &FieldValue,
        form: &FormState,
        ctx: &EvalContext,
    ) -> Option<String> {
        let text = value.as_text().map(str::trim).unwrap_or("");

        match self {
            Self::PersonName { label } => {
                if text.is_empty() {
                    Some(format!("{} name is required", label))
                } else if text.chars().count() < 2 {
                    Some("Must be at least 2 characters".into())
                } else if !name_pattern().is_match(text) {
                    Some("Only letters, spaces, hyphens, and apostrophes allowed".into())
                } else {
                    None
                }
            }
            Self::Phone => {
                if text.is_empty() {
                    return Some("Phone number is required".into());
                }
                PhoneNumber::parse(text).err().map(|e| e.to_string())
            }
            Self::BirthDate(range) => {
                if text.is_empty() {
                    return Some("Birth date is required".into());
                }
                let Some(birth) = parse_date(text) else {
                    return Some("Invalid date".into());
                };
                let age = age_on(birth, ctx.today);
                (!range.contains(age)).then(|| format!("Age must be between {}", range))
            }
            Self::RequiredText { message } | Self::RequiredChoice { message } => {
                value.is_blank().then(|| message.clone())
            }
            Self::RequiredMany { message } => {
                let selected = value.as_many().map(|v| !v.is_empty()).unwrap_or(false);
                (!selected).then(|| message.clone())
            }
            Self::Confirmation { message } => {
                (!value.as_flag().unwrap_or(false)).then(|| message.clone())
            }
            Self::Email => {
                if text.is_empty() {
                    Some(REQUIRED.into())
                } else if !email_pattern().is_match(text) {
                    Some("Please enter a valid email address".into())
                } else {
                    None
                }
            }
            Self::Url { required } => {
                if text.is_empty() {
                    required.then(|| REQUIRED.to_string())
                } else if !text.starts_with("http") {
                    Some("Please enter a valid URL starting with http:// or https://".into())
                } else {
                    None
                }
            }
            Self::WordLimit { max, required } => {
                if text.is_empty() {
                    return required.then(|| REQUIRED.to_string());
                }
                let words = text.split_whitespace().count();
                (words > *max).then(|| format!("Maximum {} words allowed", max))
            }
            Self::RequiredWhen { when, message } => {
                (when.holds(form, ctx) && value.is_blank()).then(|| message.clone())
            }
            Self::RequiredCases(cases) => {
                if !value.is_blank() {
                    return None;
                }
                cases
                    .iter()
                    .find(|(when, _)| when.holds(form, ctx))
                    .map(|(_, message)| message.clone())
            }
            Self::Optional => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx_in(year: i32) -> EvalContext {
        EvalContext::new(NaiveDate::from_ymd_opt(year, 6, 1).unwrap())
    }

    fn check(rule: &Rule, value: FieldValue) -> Option<String> {
        rule.check("field", &value, &FormState::new(), &ctx_in(2025))
    }

    #[test]
    fn test_person_name() {
        let rule = Rule::person_name("First");
        assert_eq!(check(&rule, "".into()).unwrap(), "First name is required");
        assert_eq!(check(&rule, "A".into()).unwrap(), "Must be at least 2 characters");
        assert_eq!(
            check(&rule, "R2D2".into()).unwrap(),
            "Only letters, spaces, hyphens, and apostrophes allowed"
        );
        assert!(check(&rule, "Mary-Jane O'Neil".into()).is_none());
    }

    #[test]
    fn test_birth_date_2010_rejected_at_sixteen() {
        let rule = Rule::BirthDate(AgeRange::new(16, 100));
        assert_eq!(
            check(&rule, "2010-01-01".into()).unwrap(),
            "Age must be between 16 and 100"
        );
        assert!(check(&rule, "2000-01-01".into()).is_none());
        assert_eq!(check(&rule, "".into()).unwrap(), "Birth date is required");
        assert_eq!(check(&rule, "01/01/2000".into()).unwrap(), "Invalid date");
    }

    #[test]
    fn test_tournament_age_range_admits_children() {
        let rule = Rule::BirthDate(AgeRange::new(7, 80));
        assert!(check(&rule, "2010-01-01".into()).is_none());
        assert!(check(&rule, "2020-01-01".into()).is_some());
    }

    #[test]
    fn test_phone_rule_surfaces_reason() {
        assert_eq!(check(&Rule::Phone, "".into()).unwrap(), "Phone number is required");
        assert_eq!(check(&Rule::Phone, "12".into()).unwrap(), "Phone number is too short (minimum 4 digits)");
        assert!(check(&Rule::Phone, "+20 101 234 5678".into()).is_none());
    }

    #[test]
    fn test_required_many_and_confirmation() {
        let many = Rule::required_many("Please select at least one favorite game");
        assert!(check(&many, FieldValue::Many(vec![])).is_some());
        assert!(check(&many, FieldValue::many(["valorant"])).is_none());
        assert!(check(&Rule::confirmation(), FieldValue::Flag(false)).is_some());
        assert!(check(&Rule::confirmation(), FieldValue::Flag(true)).is_none());
    }

    #[test]
    fn test_url_and_word_limit() {
        let url = Rule::Url { required: false };
        assert!(check(&url, "".into()).is_none());
        assert!(check(&url, "www.example.com".into()).is_some());
        assert!(check(&url, "https://example.com".into()).is_none());

        let words = Rule::WordLimit { max: 3, required: true };
        assert_eq!(check(&words, "".into()).unwrap(), REQUIRED);
        assert!(check(&words, "  one two   three ".into()).is_none());
        assert_eq!(check(&words, "one two three four".into()).unwrap(), "Maximum 3 words allowed");
    }

    #[test]
    fn test_email() {
        assert!(check(&Rule::Email, "dev@studio.eg".into()).is_none());
        assert!(check(&Rule::Email, "dev@studio".into()).is_some());
    }

    #[test]
    fn test_required_when_follows_predicate() {
        let rule = Rule::required_when(
            Condition::equals("areaOfInterest", "gaming"),
            "Please tell us your favorite game",
        );
        let mut form = FormState::from_pairs([("areaOfInterest", FieldValue::text("design"))]);
        let ctx = ctx_in(2025);
        assert!(rule.check("favoriteGame", &"".into(), &form, &ctx).is_none());
        form.set("areaOfInterest", FieldValue::text("gaming"));
        assert!(rule.check("favoriteGame", &"".into(), &form, &ctx).is_some());
        assert!(rule.check("favoriteGame", &"fc26".into(), &form, &ctx).is_none());
    }

    #[test]
    fn test_required_cases_picks_first_holding_message() {
        let rule = Rule::RequiredCases(vec![
            (Condition::equals("educationDegree", "high-school"), "School name is required".into()),
            (Condition::equals("educationDegree", "bachelor"), "University name is required".into()),
        ]);
        let ctx = ctx_in(2025);
        let mut form = FormState::from_pairs([("educationDegree", FieldValue::text("bachelor"))]);
        assert_eq!(
            rule.check("schoolName", &"".into(), &form, &ctx).unwrap(),
            "University name is required"
        );
        form.set("educationDegree", FieldValue::text("high-school"));
        assert_eq!(
            rule.check("schoolName", &"".into(), &form, &ctx).unwrap(),
            "School name is required"
        );
        form.set("educationDegree", FieldValue::text("phd"));
        assert!(rule.check("schoolName", &"".into(), &form, &ctx).is_none());
    }
}
