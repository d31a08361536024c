//! Predicates over form state that drive field visibility.

use chrono::NaiveDate;

use super::state::FormState;
use super::value_objects::age_from_raw;

/// Inputs a predicate may need besides the form itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalContext {
    pub today: NaiveDate,
}

impl EvalContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Single value equals `value`.
    Equals { field: String, value: String },
    /// Single value is one of `values`.
    OneOf { field: String, values: Vec<String> },
    /// Multi-select contains `value`.
    Includes { field: String, value: String },
    /// Age derived from a birth-date field is below `years`. False when the
    /// date is missing or does not parse.
    AgeBelow { field: String, years: i32 },
    All(Vec<Condition>),
}

impl Condition {
    pub fn equals(field: &str, value: &str) -> Self {
        Self::Equals { field: field.into(), value: value.into() }
    }

    pub fn one_of(field: &str, values: &[&str]) -> Self {
        Self::OneOf {
            field: field.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn includes(field: &str, value: &str) -> Self {
        Self::Includes { field: field.into(), value: value.into() }
    }

    pub fn age_below(field: &str, years: i32) -> Self {
        Self::AgeBelow { field: field.into(), years }
    }

    pub fn holds(&self, form: &FormState, ctx: &EvalContext) -> bool {
        match self {
            Self::Equals { field, value } => form.text(field) == value,
            Self::OneOf { field, values } => {
                let current = form.text(field);
                values.iter().any(|v| v == current)
            }
            Self::Includes { field, value } => form
                .get(field)
                .map(|v| v.includes(value))
                .unwrap_or(false),
            Self::AgeBelow { field, years } => age_from_raw(form.text(field), ctx.today)
                .map(|age| age < *years)
                .unwrap_or(false),
            Self::All(conditions) => conditions.iter().all(|c| c.holds(form, ctx)),
        }
    }

    /// Fields this predicate reads.
    pub fn depends_on(&self) -> Vec<&str> {
        match self {
            Self::Equals { field, .. }
            | Self::OneOf { field, .. }
            | Self::Includes { field, .. }
            | Self::AgeBelow { field, .. } => vec![field.as_str()],
            Self::All(conditions) => conditions.iter().flat_map(|c| c.depends_on()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::FieldValue;

    fn ctx() -> EvalContext {
        EvalContext::new(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap())
    }

    #[test]
    fn test_school_eligibility() {
        let eligible = Condition::All(vec![
            Condition::one_of("educationDegree", &["high-school", "bachelor"]),
            Condition::age_below("birthDate", 27),
        ]);
        let mut form = FormState::from_pairs([
            ("educationDegree", FieldValue::text("bachelor")),
            ("birthDate", FieldValue::text("2004-05-05")),
        ]);
        assert!(eligible.holds(&form, &ctx()));

        form.set("educationDegree", FieldValue::text("master"));
        assert!(!eligible.holds(&form, &ctx()));

        form.set("educationDegree", FieldValue::text("high-school"));
        form.set("birthDate", FieldValue::text("1990-01-01"));
        assert!(!eligible.holds(&form, &ctx()));

        form.set("birthDate", FieldValue::text(""));
        assert!(!eligible.holds(&form, &ctx()));
        assert_eq!(eligible.depends_on(), vec!["educationDegree", "birthDate"]);
    }

    #[test]
    fn test_includes_other() {
        let other = Condition::includes("gameGenre", "Other");
        let form = FormState::from_pairs([("gameGenre", FieldValue::many(["rpg", "Other"]))]);
        assert!(other.holds(&form, &ctx()));
        assert!(!other.holds(&FormState::new(), &ctx()));
    }
}
