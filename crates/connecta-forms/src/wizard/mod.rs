//! Wizard module
//!
//! Declarative flow definitions, the conditional field resolver and the
//! engine that walks a flow step by step.

pub mod engine;
pub mod flow;
pub mod resolver;

pub use engine::{Advance, Wizard, WizardView};
pub use flow::{
    options, Branch, Discriminator, FieldKind, FieldOption, FieldSpec, FlowDefinition, StepPlan, StepSpec,
};
pub use resolver::{hidden_fields, is_visible, resolve_steps, Step};
