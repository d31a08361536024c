//! Conditional Field Resolver
//!
//! Pure derivation of the step list from the current form. Nothing here is
//! cached: callers resolve again after every change.

use serde::Serialize;

use super::flow::{FlowDefinition, StepPlan, StepSpec};
use crate::domain::{EvalContext, FormState};

/// A resolved step: only the fields visible right now.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Step {
    pub title: String,
    pub fields: Vec<String>,
    pub requires_lookup: bool,
    /// Step-0 branch question; answered with a choice, not fields.
    pub is_choice: bool,
}

pub fn is_visible(flow: &FlowDefinition, field: &str, form: &FormState, ctx: &EvalContext) -> bool {
    match flow.field(field).and_then(|f| f.visible_when.as_ref()) {
        Some(condition) => condition.holds(form, ctx),
        None => true,
    }
}

/// Conditional fields whose predicate is currently false.
pub fn hidden_fields<'a>(flow: &'a FlowDefinition, form: &FormState, ctx: &EvalContext) -> Vec<&'a str> {
    flow.fields
        .iter()
        .filter(|f| f.visible_when.as_ref().is_some_and(|c| !c.holds(form, ctx)))
        .map(|f| f.name.as_str())
        .collect()
}

fn resolve(spec: &StepSpec, flow: &FlowDefinition, form: &FormState, ctx: &EvalContext) -> Step {
    Step {
        title: spec.title.clone(),
        fields: spec
            .fields
            .iter()
            .filter(|f| is_visible(flow, f, form, ctx))
            .cloned()
            .collect(),
        requires_lookup: spec.requires_lookup,
        is_choice: false,
    }
}

/// Ordered steps for the current form and (for branching flows) the chosen
/// branch. A branching flow with no answer yet has only the choice step.
pub fn resolve_steps(
    flow: &FlowDefinition,
    form: &FormState,
    choice: Option<&str>,
    ctx: &EvalContext,
) -> Vec<Step> {
    match &flow.plan {
        StepPlan::Linear(specs) => specs.iter().map(|s| resolve(s, flow, form, ctx)).collect(),
        StepPlan::Branching(discriminator) => {
            let mut steps = vec![Step {
                title: discriminator.question.clone(),
                fields: Vec::new(),
                requires_lookup: false,
                is_choice: true,
            }];
            if let Some(branch) = choice.and_then(|c| discriminator.branch(c)) {
                steps.extend(branch.steps.iter().map(|s| resolve(s, flow, form, ctx)));
            }
            steps
        }
    }
}
