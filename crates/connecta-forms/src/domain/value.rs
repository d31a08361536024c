//! Field values held by a form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current value of one form field.
///
/// Dates are carried as `YYYY-MM-DD` text, exactly as the date input
/// produces them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Many(Vec<String>),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn many<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Many(values.into_iter().map(Into::into).collect())
    }

    /// Empty value of the same shape.
    pub fn cleared(&self) -> Self {
        match self {
            Self::Text(_) => Self::Text(String::new()),
            Self::Flag(_) => Self::Flag(false),
            Self::Many(_) => Self::Many(Vec::new()),
        }
    }

    /// Blank text (after trimming), an unchecked flag or an empty selection.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Flag(b) => !b,
            Self::Many(v) => v.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_many(&self) -> Option<&[String]> {
        match self {
            Self::Many(v) => Some(v),
            _ => None,
        }
    }

    /// Whether a multi-select contains `item`, or a single value equals it.
    pub fn includes(&self, item: &str) -> bool {
        match self {
            Self::Many(v) => v.iter().any(|s| s == item),
            Self::Text(s) => s == item,
            Self::Flag(_) => false,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Flag(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
            Self::Many(v) => write!(f, "{}", v.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blankness() {
        assert!(FieldValue::text("   ").is_blank());
        assert!(!FieldValue::text(" a ").is_blank());
        assert!(FieldValue::Flag(false).is_blank());
        assert!(FieldValue::Many(vec![]).is_blank());
        assert!(!FieldValue::many(["valorant"]).is_blank());
    }

    #[test]
    fn test_cleared_keeps_shape() {
        assert_eq!(FieldValue::many(["a"]).cleared(), FieldValue::Many(vec![]));
        assert_eq!(FieldValue::Flag(true).cleared(), FieldValue::Flag(false));
        assert_eq!(FieldValue::text("x").cleared(), FieldValue::text(""));
    }

    #[test]
    fn test_untagged_json_shape() {
        let json = serde_json::to_string(&FieldValue::many(["a", "b"])).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        let back: FieldValue = serde_json::from_str(r#""2010-01-01""#).unwrap();
        assert_eq!(back, FieldValue::text("2010-01-01"));
        let flag: FieldValue = serde_json::from_str("true").unwrap();
        assert_eq!(flag, FieldValue::Flag(true));
    }
}
