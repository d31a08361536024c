//! Form Wizard Engine
//!
//! One parameterized engine drives every flow. The step list is resolved
//! from the form on every call; the only stored position is the step index.
//!
//! Consistency policies:
//! - a conditional field whose predicate turns false loses its value, its
//!   touched flag and its error, on every value change that flips it;
//! - retreating forgets touched flags and errors of the step being left;
//! - retreating to step 0 forgets the branch choice and any looked-up record,
//!   and retreating out of the step after a lookup forgets the record;
//! - a successful advance keeps touched flags and errors only for fields of
//!   steps `0..=new`.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::flow::FlowDefinition;
use super::resolver::{hidden_fields, resolve_steps, Step};
use crate::domain::{ErrorState, EvalContext, FieldValue, FormState, TouchedState};
use crate::error::WizardError;
use crate::ports::{Clock, Record};

/// Result of an [`Wizard::advance`] attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Now on this step index.
    Moved(usize),
    /// These fields failed; they are now touched and carry errors.
    Blocked(Vec<String>),
    /// The step is valid but needs a record lookup before moving on.
    LookupRequired,
    /// Step 0 of a branching flow is answered with [`Wizard::choose`].
    ChoiceRequired,
    /// Already on the last step; submit instead.
    AtLastStep,
}

/// Serializable view of a wizard for front ends.
#[derive(Clone, Debug, Serialize)]
pub struct WizardView {
    pub flow: String,
    pub step: usize,
    pub total_steps: usize,
    pub title: String,
    pub fields: Vec<String>,
    pub can_advance: bool,
    pub progress: f32,
    pub errors: ErrorState,
}

pub struct Wizard {
    flow: Arc<FlowDefinition>,
    clock: Arc<dyn Clock>,
    form: FormState,
    touched: TouchedState,
    errors: ErrorState,
    current: usize,
    choice: Option<String>,
    existing: Option<Record>,
    submitting: bool,
}

impl Wizard {
    pub fn new(flow: Arc<FlowDefinition>, clock: Arc<dyn Clock>) -> Self {
        let form = flow.defaults();
        Self {
            flow,
            clock,
            form,
            touched: TouchedState::default(),
            errors: ErrorState::default(),
            current: 0,
            choice: None,
            existing: None,
            submitting: false,
        }
    }

    pub fn flow(&self) -> &FlowDefinition {
        &self.flow
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn touched(&self) -> &TouchedState {
        &self.touched
    }

    pub fn errors(&self) -> &ErrorState {
        &self.errors
    }

    pub fn choice(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    pub fn existing_record(&self) -> Option<&Record> {
        self.existing.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    fn ctx(&self) -> EvalContext {
        EvalContext::new(self.clock.today())
    }

    pub fn steps(&self) -> Vec<Step> {
        resolve_steps(&self.flow, &self.form, self.choice.as_deref(), &self.ctx())
    }

    pub fn current_step(&self) -> Step {
        let mut steps = self.steps();
        let index = self.current.min(steps.len().saturating_sub(1));
        steps.swap_remove(index)
    }

    pub fn is_last_step(&self) -> bool {
        self.current + 1 >= self.steps().len()
    }

    /// Completion percentage of the current position.
    pub fn progress(&self) -> f32 {
        let total = self.steps().len().max(1);
        (self.current + 1) as f32 / total as f32 * 100.0
    }

    /// Error to display: only once the field has been touched.
    pub fn visible_error(&self, field: &str) -> Option<&str> {
        if self.touched.is_touched(field) {
            self.errors.get(field)
        } else {
            None
        }
    }

    /// Run the field's rule against the current form.
    pub fn validate_field(&self, field: &str) -> Option<String> {
        let spec = self.flow.field(field)?;
        let value = self.form.get(field).cloned().unwrap_or_default();
        spec.rule.check(field, &value, &self.form, &self.ctx())
    }

    /// Store a new value. Returns the conditional fields cleared because
    /// their predicate no longer holds.
    pub fn set_value(&mut self, field: &str, value: FieldValue) -> Result<Vec<String>, WizardError> {
        if !self.flow.has_field(field) {
            return Err(WizardError::UnknownField(field.to_string()));
        }
        self.form.set(field, value);
        if self.touched.is_touched(field) {
            let message = self.validate_field(field);
            self.errors.set(field, message);
        }
        Ok(self.clear_hidden())
    }

    fn clear_hidden(&mut self) -> Vec<String> {
        let ctx = self.ctx();
        let hidden: Vec<String> = hidden_fields(&self.flow, &self.form, &ctx)
            .into_iter()
            .map(String::from)
            .collect();
        let mut cleared = Vec::new();
        for field in hidden {
            let stale = self.form.get(field.as_str()).map(|v| !v.is_blank()).unwrap_or(false)
                || self.touched.is_touched(&field)
                || self.errors.has(&field);
            if stale {
                self.form.clear_field(&field);
                self.touched.untouch(&field);
                self.errors.remove(&field);
                debug!(flow = %self.flow.key, field = %field, "Cleared hidden field");
                cleared.push(field);
            }
        }
        cleared
    }

    /// Mark a field touched and validate it alone.
    pub fn blur(&mut self, field: &str) -> Result<Option<String>, WizardError> {
        if !self.flow.has_field(field) {
            return Err(WizardError::UnknownField(field.to_string()));
        }
        self.touched.touch(field);
        let message = self.validate_field(field);
        self.errors.set(field, message.clone());
        Ok(message)
    }

    /// Answer the step-0 question of a branching flow and move to step 1.
    pub fn choose(&mut self, value: &str) -> Result<usize, WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        let discriminator = self.flow.discriminator().ok_or(WizardError::NoChoiceStep)?;
        if discriminator.branch(value).is_none() {
            return Err(WizardError::UnknownChoice(value.to_string()));
        }
        self.choice = Some(value.to_string());
        self.existing = None;
        self.current = 1;
        Ok(self.current)
    }

    /// Fields of the current step that fail their rule or carry an error.
    fn failing_fields(&self, step: &Step) -> Vec<String> {
        step.fields
            .iter()
            .filter(|f| self.validate_field(f).is_some() || self.errors.has(f))
            .cloned()
            .collect()
    }

    /// Pure: every field of the current step is valid and error-free.
    pub fn can_advance(&self) -> bool {
        let step = self.current_step();
        if step.is_choice {
            return false;
        }
        self.failing_fields(&step).is_empty()
    }

    /// Touch and validate every field of `step`; returns the failing ones.
    fn validate_step(&mut self, step: &Step) -> Vec<String> {
        let mut failing = Vec::new();
        for field in &step.fields {
            self.touched.touch(field.as_str());
            let message = self.validate_field(field);
            if message.is_some() {
                failing.push(field.clone());
            }
            self.errors.set(field.as_str(), message);
        }
        failing
    }

    pub fn advance(&mut self) -> Result<Advance, WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        let step = self.current_step();
        if step.is_choice {
            return Ok(Advance::ChoiceRequired);
        }
        let failing = self.validate_step(&step);
        if !failing.is_empty() {
            return Ok(Advance::Blocked(failing));
        }
        if step.requires_lookup && self.existing.is_none() {
            return Ok(Advance::LookupRequired);
        }
        let steps = self.steps();
        if self.current + 1 >= steps.len() {
            return Ok(Advance::AtLastStep);
        }
        self.current += 1;
        let reachable: Vec<&String> = steps[..=self.current]
            .iter()
            .flat_map(|s| s.fields.iter())
            .collect();
        let keep = |f: &str| reachable.iter().any(|r| r.as_str() == f);
        self.touched.retain(keep);
        self.errors.retain(keep);
        Ok(Advance::Moved(self.current))
    }

    /// Attach the record found by a returning-user lookup.
    pub fn set_existing_record(&mut self, record: Option<Record>) {
        self.existing = record;
    }

    pub fn retreat(&mut self) -> Result<usize, WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        if self.current == 0 {
            return Ok(0);
        }
        let steps = self.steps();
        if let Some(leaving) = steps.get(self.current) {
            for field in &leaving.fields {
                self.touched.untouch(field);
                self.errors.remove(field);
            }
        }
        self.current -= 1;
        if self.current == 0 && self.flow.discriminator().is_some() {
            self.choice = None;
            self.existing = None;
        } else if steps.get(self.current).map(|s| s.requires_lookup).unwrap_or(false) {
            self.existing = None;
        }
        Ok(self.current)
    }

    /// Enter the submitting state. Only from a valid last step.
    pub fn begin_submit(&mut self) -> Result<(), WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        let step = self.current_step();
        if step.is_choice || !self.is_last_step() {
            return Err(WizardError::NotOnLastStep);
        }
        let failing = self.validate_step(&step);
        if !failing.is_empty() {
            return Err(WizardError::InvalidStep(failing));
        }
        self.submitting = true;
        Ok(())
    }

    /// Leave the submitting state. Success resets everything; failure keeps
    /// the data and attaches any field-level messages.
    pub fn finish_submit(&mut self, success: bool, field_errors: &[(String, String)]) {
        if success {
            self.reset();
            return;
        }
        self.submitting = false;
        for (field, message) in field_errors {
            if self.flow.has_field(field) {
                self.touched.touch(field.as_str());
                self.errors.set(field.as_str(), Some(message.clone()));
            }
        }
    }

    pub fn reset(&mut self) {
        self.form.reset_to(&self.flow.defaults());
        self.touched.clear();
        self.errors.clear();
        self.current = 0;
        self.choice = None;
        self.existing = None;
        self.submitting = false;
    }

    pub fn snapshot(&self) -> FormState {
        self.form.clone()
    }

    /// Load draft values. Unknown fields and values of the wrong shape are
    /// ignored; hidden fields are cleared afterwards.
    pub fn restore(&mut self, data: &FormState) {
        for (field, value) in data.iter() {
            let Some(spec) = self.flow.field(field) else {
                continue;
            };
            if std::mem::discriminant(&spec.default) == std::mem::discriminant(value) {
                self.form.set(field, value.clone());
            }
        }
        self.clear_hidden();
    }

    pub fn view(&self) -> WizardView {
        let step = self.current_step();
        WizardView {
            flow: self.flow.key.clone(),
            step: self.current,
            total_steps: self.steps().len(),
            title: step.title,
            fields: step.fields,
            can_advance: self.can_advance(),
            progress: self.progress(),
            errors: self.errors.clone(),
        }
    }
}
