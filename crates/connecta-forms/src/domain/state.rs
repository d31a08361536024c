//! Per-wizard state maps: values, touched flags and error messages.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::value::FieldValue;

/// Field name to current value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState {
    values: BTreeMap<String, FieldValue>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Text value of a field, empty when missing or not text.
    pub fn text(&self, field: &str) -> &str {
        self.values
            .get(field)
            .and_then(FieldValue::as_text)
            .unwrap_or("")
    }

    /// Selected items of a multi-select, empty when missing.
    pub fn many(&self, field: &str) -> &[String] {
        self.values
            .get(field)
            .and_then(FieldValue::as_many)
            .unwrap_or(&[])
    }

    pub fn flag(&self, field: &str) -> bool {
        self.values
            .get(field)
            .and_then(FieldValue::as_flag)
            .unwrap_or(false)
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.values.insert(field.into(), value);
    }

    /// Replace a field's value with the empty value of the same shape.
    pub fn clear_field(&mut self, field: &str) {
        if let Some(value) = self.values.get_mut(field) {
            *value = value.cleared();
        }
    }

    /// Discard every value and start again from `defaults`.
    pub fn reset_to(&mut self, defaults: &FormState) {
        self.values.clone_from(&defaults.values);
    }

    /// Whether every field is blank (nothing worth persisting).
    pub fn is_blank(&self) -> bool {
        self.values.values().all(FieldValue::is_blank)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Fields the user has interacted with (blurred).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TouchedState {
    fields: BTreeSet<String>,
}

impl TouchedState {
    pub fn touch(&mut self, field: impl Into<String>) {
        self.fields.insert(field.into());
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn untouch(&mut self, field: &str) {
        self.fields.remove(field);
    }

    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        self.fields.retain(|f| keep(f));
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Field name to validation message. A field without an entry is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorState {
    messages: BTreeMap<String, String>,
}

impl ErrorState {
    /// Record `message` for `field`; `None` removes the entry.
    pub fn set(&mut self, field: impl Into<String>, message: Option<String>) {
        let field = field.into();
        match message {
            Some(m) if !m.is_empty() => {
                self.messages.insert(field, m);
            }
            _ => {
                self.messages.remove(&field);
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.messages.get(field).map(String::as_str)
    }

    pub fn has(&self, field: &str) -> bool {
        self.messages.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) {
        self.messages.remove(field);
    }

    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        self.messages.retain(|f, _| keep(f));
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.messages.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
