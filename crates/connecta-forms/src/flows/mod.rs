//! Flows module
//!
//! The registration flows that ship with the engine. Each one is a
//! declarative [`FlowDefinition`] plus the [`RecordMapping`] that turns a
//! finished form into the remote record.

pub mod attendee;
pub mod exhibition;
pub mod options;
pub mod tournament;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::application::submission::RecordMapping;
use crate::domain::{sanitize_digits, AgeRange, FieldValue, FormState};
use crate::error::FormsError;
use crate::wizard::FlowDefinition;

/// Suffix of the placeholder credential the backend requires for every
/// created user record.
const PLACEHOLDER_PASSWORD_SUFFIX: &str = "TempPassword123!";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Attendee,
    Tournament,
    Exhibition,
}

impl FlowKind {
    pub const ALL: [FlowKind; 3] = [Self::Attendee, Self::Tournament, Self::Exhibition];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attendee => "attendee",
            Self::Tournament => "tournament",
            Self::Exhibition => "exhibition",
        }
    }

    pub fn default_age_range(&self) -> AgeRange {
        match self {
            Self::Attendee => attendee::AGE_RANGE,
            Self::Tournament => tournament::AGE_RANGE,
            Self::Exhibition => AgeRange::new(16, 100),
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowKind {
    type Err = FormsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FormsError::UnknownFlow(s.to_string()))
    }
}

/// A flow definition together with its record mapping.
#[derive(Clone)]
pub struct Flow {
    pub kind: FlowKind,
    pub definition: Arc<FlowDefinition>,
    pub mapping: Arc<dyn RecordMapping>,
}

impl Flow {
    pub fn new(kind: FlowKind) -> Self {
        Self::with_age_range(kind, kind.default_age_range())
    }

    pub fn with_age_range(kind: FlowKind, range: AgeRange) -> Self {
        let (definition, mapping): (FlowDefinition, Arc<dyn RecordMapping>) = match kind {
            FlowKind::Attendee => (attendee::definition(), Arc::new(attendee::AttendeeMapping)),
            FlowKind::Tournament => (tournament::definition(), Arc::new(tournament::TournamentMapping)),
            FlowKind::Exhibition => (exhibition::definition(), Arc::new(exhibition::ExhibitionMapping)),
        };
        Self {
            kind,
            definition: Arc::new(definition.with_age_range(range)),
            mapping,
        }
    }
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow").field("kind", &self.kind).finish()
    }
}

pub(crate) fn placeholder_password(digits: &str) -> String {
    format!("{}{}", digits, PLACEHOLDER_PASSWORD_SUFFIX)
}

pub(crate) fn full_name(form: &FormState) -> String {
    format!("{} {}", form.text("firstName").trim(), form.text("lastName").trim())
}

pub(crate) fn sanitized_phone(form: &FormState) -> String {
    sanitize_digits(form.text("phoneNumber"))
}

pub(crate) fn to_json(value: Option<&FieldValue>) -> Value {
    match value {
        Some(FieldValue::Text(s)) => Value::String(s.trim().to_string()),
        Some(FieldValue::Flag(b)) => Value::Bool(*b),
        Some(FieldValue::Many(items)) => Value::from(items.clone()),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_kind_parse() {
        assert_eq!("Tournament".parse::<FlowKind>().unwrap(), FlowKind::Tournament);
        assert!(matches!("expo".parse::<FlowKind>(), Err(FormsError::UnknownFlow(_))));
    }

    #[test]
    fn test_age_range_override_reaches_rule() {
        let flow = Flow::with_age_range(FlowKind::Attendee, AgeRange::new(18, 60));
        assert_eq!(flow.definition.age_range, AgeRange::new(18, 60));
        let rule = &flow.definition.field("birthDate").unwrap().rule;
        assert_eq!(rule, &crate::domain::Rule::BirthDate(AgeRange::new(18, 60)));
    }

    #[test]
    fn test_every_step_field_is_declared() {
        for kind in FlowKind::ALL {
            let flow = Flow::new(kind);
            let def = &flow.definition;
            let specs: Vec<_> = match &def.plan {
                crate::wizard::StepPlan::Linear(steps) => steps.clone(),
                crate::wizard::StepPlan::Branching(d) => {
                    d.branches.iter().flat_map(|b| b.steps.clone()).collect()
                }
            };
            for step in specs {
                for field in &step.fields {
                    assert!(def.has_field(field), "{} declares no field {}", kind, field);
                }
            }
        }
    }
}
