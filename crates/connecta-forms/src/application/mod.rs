//! Application layer
//!
//! Use cases built on the wizard engine and the outbound ports: submission,
//! sessions with drafts, admin analytics, suggestions, batch import and the
//! rendering error boundary.

pub mod boundary;
pub mod dashboard;
pub mod import;
pub mod notice;
pub mod session;
pub mod submission;
pub mod suggestions;

pub use boundary::{ErrorBoundary, Recovery, RecoveryAction, Rendered};
pub use dashboard::{AdminService, DashboardStats, LoginError, SortColumn, UserFilter, UserRow, VerificationFilter};
pub use import::{BatchImporter, ImportReport, DEFAULT_BATCH_SIZE};
pub use notice::{Notice, NoticeKind};
pub use session::{RegistrationSession, RestoredDraft, StepOutcome, SubmitOutcome};
pub use submission::{LookupOutcome, RecordMapping, SubmissionAdapter, SubmissionOutcome, SubmitTarget};
pub use suggestions::{RemoteSuggester, SuggestionSettings, Suggestions};
