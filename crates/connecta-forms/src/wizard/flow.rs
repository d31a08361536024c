//! Declarative flow configuration: fields, rules, options and step plans.

use serde::Serialize;

use crate::domain::{AgeRange, Condition, FieldValue, FormState, Rule};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Date,
    Phone,
    Email,
    Url,
    TextArea,
    Select,
    MultiSelect,
    Checkbox,
    /// Free text with remote suggestions from the school/university lists.
    Autocomplete,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: &str, label: &str) -> Self {
        Self { value: value.into(), label: label.into() }
    }
}

/// Build an option list from `(value, label)` pairs.
pub fn options(pairs: &[(&str, &str)]) -> Vec<FieldOption> {
    pairs.iter().map(|(v, l)| FieldOption::new(v, l)).collect()
}

#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub default: FieldValue,
    pub rule: Rule,
    pub options: Vec<FieldOption>,
    /// Shown (and validated) only while this holds.
    pub visible_when: Option<Condition>,
    pub placeholder: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &str, label: &str, kind: FieldKind, rule: Rule) -> Self {
        let default = match kind {
            FieldKind::MultiSelect => FieldValue::Many(Vec::new()),
            FieldKind::Checkbox => FieldValue::Flag(false),
            _ => FieldValue::Text(String::new()),
        };
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            default,
            rule,
            options: Vec::new(),
            visible_when: None,
            placeholder: None,
        }
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn visible_when(mut self, condition: Condition) -> Self {
        self.visible_when = Some(condition);
        self
    }

    pub fn with_default(mut self, value: FieldValue) -> Self {
        self.default = value;
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct StepSpec {
    pub title: String,
    pub fields: Vec<String>,
    /// Advancing needs a remote record lookup first (returning users).
    pub requires_lookup: bool,
}

impl StepSpec {
    pub fn new(title: &str, fields: &[&str]) -> Self {
        Self {
            title: title.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            requires_lookup: false,
        }
    }

    pub fn with_lookup(mut self) -> Self {
        self.requires_lookup = true;
        self
    }
}

/// One answer of a step-0 choice and the steps it leads to.
#[derive(Clone, Debug)]
pub struct Branch {
    pub value: String,
    pub label: String,
    pub steps: Vec<StepSpec>,
}

/// Step-0 question whose answer selects the rest of the sequence.
#[derive(Clone, Debug)]
pub struct Discriminator {
    pub question: String,
    pub branches: Vec<Branch>,
}

impl Discriminator {
    pub fn branch(&self, value: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.value == value)
    }
}

#[derive(Clone, Debug)]
pub enum StepPlan {
    Linear(Vec<StepSpec>),
    Branching(Discriminator),
}

#[derive(Clone, Debug)]
pub struct FlowDefinition {
    pub key: String,
    pub title: String,
    /// Remote collection records are written to.
    pub collection: String,
    /// Draft storage key.
    pub draft_key: String,
    pub fields: Vec<FieldSpec>,
    pub plan: StepPlan,
    pub age_range: AgeRange,
    pub success_message: String,
}

impl FlowDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Fresh form with every declared default.
    pub fn defaults(&self) -> FormState {
        FormState::from_pairs(self.fields.iter().map(|f| (f.name.clone(), f.default.clone())))
    }

    /// Replace the accepted age range, including the birth-date rule.
    pub fn with_age_range(mut self, range: AgeRange) -> Self {
        self.age_range = range;
        for field in &mut self.fields {
            if let Rule::BirthDate(_) = field.rule {
                field.rule = Rule::BirthDate(range);
            }
        }
        self
    }

    pub fn discriminator(&self) -> Option<&Discriminator> {
        match &self.plan {
            StepPlan::Branching(d) => Some(d),
            StepPlan::Linear(_) => None,
        }
    }
}
