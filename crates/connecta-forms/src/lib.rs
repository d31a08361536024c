//! Connecta Registration Forms
//!
//! Multi-step registration wizards for Connecta events, validated field by
//! field and submitted to a hosted PocketBase backend.
//!
//! ## Architecture
//!
//! - **Domain Layer**: field values, state maps, visibility conditions,
//!   validation rules, phone and birth-date value objects
//! - **Wizard Layer**: declarative flow definitions, the conditional field
//!   resolver and the step engine
//! - **Flows**: attendee, tournament and exhibition registration
//! - **Ports Layer**: record store, draft store and clock interfaces
//! - **Application Layer**: submission adapter, registration sessions,
//!   admin dashboard, suggestions, batch import, error boundary
//! - **Infrastructure Layer**: PocketBase REST client, file drafts,
//!   in-memory doubles
//!
//! The engine performs no I/O; every remote call goes through a
//! [`ports::RecordStore`] injected into the application services.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod flows;
pub mod infrastructure;
pub mod ports;
pub mod wizard;

// Re-exports for convenience
pub use application::{
    AdminService, BatchImporter, DashboardStats, ErrorBoundary, Notice, RegistrationSession, RemoteSuggester,
    StepOutcome, SubmissionAdapter, SubmissionOutcome, SubmitOutcome,
};
pub use config::FormsConfig;
pub use domain::{AgeRange, Condition, FieldValue, FormState, PhoneNumber, Rule};
pub use error::{DraftError, FormsError, ImportError, Result, StoreError, WizardError};
pub use flows::{Flow, FlowKind};
pub use infrastructure::{FileDraftStore, InMemoryDraftStore, InMemoryRecordStore, PocketBaseClient};
pub use ports::{Clock, DraftStore, RecordStore, SystemClock};
pub use wizard::{Advance, Wizard, WizardView};
