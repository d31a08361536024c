//! Error types for Connecta forms

use std::collections::BTreeMap;
use thiserror::Error;

/// Failure talking to the hosted record store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend answered with an error body. `fields` holds per-field
    /// messages keyed by remote field name.
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        fields: BTreeMap<String, String>,
    },

    /// Request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Response arrived but could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl StoreError {
    /// HTTP-style status; `0` for transport failures.
    pub fn status(&self) -> u16 {
        match self {
            Self::Rejected { status, .. } => *status,
            Self::Network(_) => 0,
            Self::NotFound(_) => 404,
            Self::Unauthorized(_) => 401,
            Self::Decode(_) => 500,
        }
    }
}

/// Failure reading or writing a draft.
#[derive(Error, Debug)]
pub enum DraftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("draft is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Wizard transition refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("a submission is already in flight")]
    SubmissionInFlight,

    #[error("submission is only possible from the last step")]
    NotOnLastStep,

    #[error("current step has invalid fields: {}", .0.join(", "))]
    InvalidStep(Vec<String>),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("this flow has no choice step")]
    NoChoiceStep,

    #[error("unknown choice: {0}")]
    UnknownChoice(String),
}

/// Failure of the batch importer before any batch was sent.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("cannot read import file: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("import file is missing column `{0}`")]
    MissingColumn(String),
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum FormsError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("unknown flow: {0}")]
    UnknownFlow(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FormsError>;
