//! Record-store data shapes shared by every adapter.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored record. Schema fields live in `fields` under their remote names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "collectionName", default, skip_serializing_if = "String::is_empty")]
    pub collection_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn bool_field(&self, name: &str) -> bool {
        self.fields.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Values of a field that may be stored as a single string or an array.
    pub fn strings_field(&self, name: &str) -> Vec<String> {
        match self.fields.get(name) {
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Creation time; accepts both `2025-01-02 10:00:00.000Z` and RFC 3339.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.created.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%d %H:%M:%S%.f")
                    .ok()
                    .map(|n| n.and_utc())
            })
    }
}

/// Typed record filter, rendered to the backend's expression syntax by the
/// remote adapter and evaluated directly by the in-memory one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    Eq(String, String),
    /// Case-insensitive substring match.
    Like(String, String),
    Or(Vec<Filter>),
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<String>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn like(field: &str, value: impl Into<String>) -> Self {
        Self::Like(field.into(), value.into())
    }

    /// Backend filter expression with string literals escaped.
    pub fn to_expression(&self) -> String {
        match self {
            Self::Eq(field, value) => format!("{} = \"{}\"", field, escape(value)),
            Self::Like(field, value) => format!("{} ~ \"{}\"", field, escape(value)),
            Self::Or(parts) => join(parts, " || "),
            Self::And(parts) => join(parts, " && "),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Eq(field, value) => field_text(record, field)
                .map(|v| v == *value)
                .unwrap_or(false),
            Self::Like(field, value) => field_text(record, field)
                .map(|v| v.to_lowercase().contains(&value.to_lowercase()))
                .unwrap_or(false),
            Self::Or(parts) => parts.iter().any(|p| p.matches(record)),
            Self::And(parts) => parts.iter().all(|p| p.matches(record)),
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn join(parts: &[Filter], op: &str) -> String {
    let rendered: Vec<String> = parts
        .iter()
        .map(|p| format!("({})", p.to_expression()))
        .collect();
    rendered.join(op)
}

fn field_text(record: &Record, field: &str) -> Option<String> {
    if field == "id" {
        return Some(record.id.clone());
    }
    match record.fields.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    /// Backend sort expression, e.g. `-created`.
    pub sort: Option<String>,
    pub filter: Option<Filter>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 30,
            sort: None,
            filter: None,
        }
    }
}

/// One page of a list call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub items: Vec<Record>,
}

/// Result of a password authentication.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub record: Record,
}

/// One queued create request of a batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchCreate {
    pub collection: String,
    pub body: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: Value) -> Record {
        serde_json::from_value(fields).unwrap()
    }

    #[test]
    fn test_filter_expression_escapes_quotes() {
        let f = Filter::eq("phoneNumber", r#"20" || id != ""#);
        assert_eq!(f.to_expression(), r#"phoneNumber = "20\" || id != \"""#);
        let or = Filter::Or(vec![Filter::like("en_name", "cairo"), Filter::like("ar_name", "cairo")]);
        assert_eq!(or.to_expression(), r#"(en_name ~ "cairo") || (ar_name ~ "cairo")"#);
    }

    #[test]
    fn test_filter_matches() {
        let r = record(json!({"id": "u1", "phoneNumber": "201012345678", "name": "Mona Adel"}));
        assert!(Filter::eq("phoneNumber", "201012345678").matches(&r));
        assert!(!Filter::eq("phoneNumber", "2010").matches(&r));
        assert!(Filter::like("name", "mona").matches(&r));
        assert!(Filter::eq("id", "u1").matches(&r));
    }

    #[test]
    fn test_record_field_shapes() {
        let r = record(json!({
            "id": "u1",
            "created": "2025-03-04 10:11:12.123Z",
            "favoriteGame": ["valorant", "fc26"],
            "areaOfInterest": "gaming",
            "verified": true
        }));
        assert_eq!(r.strings_field("favoriteGame"), vec!["valorant", "fc26"]);
        assert_eq!(r.strings_field("areaOfInterest"), vec!["gaming"]);
        assert!(r.bool_field("verified"));
        let created = r.created_at().unwrap();
        assert_eq!(created.format("%Y-%m").to_string(), "2025-03");
    }
}
