//! Domain module
//!
//! Form values, state maps, visibility predicates and validation rules.
//! Nothing in here performs I/O.

pub mod conditions;
pub mod rules;
pub mod state;
pub mod value;
pub mod value_objects;

pub use conditions::{Condition, EvalContext};
pub use rules::Rule;
pub use state::{ErrorState, FormState, TouchedState};
pub use value::FieldValue;
pub use value_objects::*;
