//! Remote Submission Adapter
//!
//! Turns a finished form into a create or update call against the record
//! store and maps every failure to a user-facing outcome. Nothing escapes as
//! an error: callers always receive a [`SubmissionOutcome`].

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{sanitize_digits, FormState};
use crate::error::StoreError;
use crate::flows::Flow;
use crate::ports::{Filter, Record, RecordStore};

pub const NETWORK_ERROR: &str = "Network error. Please check your internet connection.";
pub const COLLECTION_NOT_FOUND: &str = "Collection not found. Please contact support.";
pub const SUBMIT_FAILED: &str = "Failed to submit application. Please try again.";
pub const CHECK_INPUT: &str = "Please check your input and try again.";
pub const NO_ACCOUNT: &str = "No account found with this phone number. Please register as a new user.";
pub const LOOKUP_FAILED: &str = "Failed to verify phone number. Please try again.";

/// Per-flow translation between the local form and the remote record.
pub trait RecordMapping: Send + Sync {
    /// Payload for a new record.
    fn create_payload(&self, form: &FormState) -> Value;

    /// Payload patching an existing record; `None` when the flow never
    /// updates.
    fn update_payload(&self, _form: &FormState) -> Option<Value> {
        None
    }

    /// Local field that owns errors reported for a remote field.
    fn local_field(&self, remote: &str) -> String {
        remote.to_string()
    }
}

/// Which write a submission performs.
#[derive(Clone, Copy, Debug)]
pub enum SubmitTarget<'a> {
    Create,
    /// Returning user; `None` when the lookup found nobody.
    Update(Option<&'a Record>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmissionOutcome {
    Created(Record),
    Updated(Record),
    /// Returning-user path without a matching account. No write happened.
    NoAccount { message: String },
    /// The backend refused the data; `fields` are keyed by local field name.
    Rejected {
        message: String,
        fields: Vec<(String, String)>,
        code: u16,
    },
    Failed { message: String },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Created(_) | Self::Updated(_))
    }

    /// User-facing message of a failed outcome.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::NoAccount { message } | Self::Rejected { message, .. } | Self::Failed { message } => {
                Some(message)
            }
            Self::Created(_) | Self::Updated(_) => None,
        }
    }

    pub fn field_errors(&self) -> &[(String, String)] {
        match self {
            Self::Rejected { fields, .. } => fields,
            _ => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LookupOutcome {
    Found(Record),
    NotFound { message: String },
    Failed { message: String },
}

pub struct SubmissionAdapter {
    store: Arc<dyn RecordStore>,
}

impl SubmissionAdapter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Find an account by phone number, compared digits-only.
    pub async fn lookup_by_phone(&self, collection: &str, raw_phone: &str) -> LookupOutcome {
        let digits = sanitize_digits(raw_phone);
        if digits.is_empty() {
            return LookupOutcome::NotFound { message: NO_ACCOUNT.into() };
        }
        debug!(collection = %collection, "Looking up account by phone");

        let filter = Filter::eq("phoneNumber", digits);
        match self.store.full_list(collection, Some(&filter)).await {
            Ok(records) => match records.into_iter().next() {
                Some(record) => {
                    info!(collection = %collection, id = %record.id, "Found returning user");
                    LookupOutcome::Found(record)
                }
                None => LookupOutcome::NotFound { message: NO_ACCOUNT.into() },
            },
            Err(e) => {
                warn!(collection = %collection, error = %e, "Phone lookup failed");
                LookupOutcome::Failed { message: LOOKUP_FAILED.into() }
            }
        }
    }

    pub async fn submit(&self, flow: &Flow, form: &FormState, target: SubmitTarget<'_>) -> SubmissionOutcome {
        let collection = flow.definition.collection.as_str();
        let result = match target {
            SubmitTarget::Create => {
                let payload = flow.mapping.create_payload(form);
                self.store.create(collection, &payload).await.map(SubmissionOutcome::Created)
            }
            SubmitTarget::Update(None) => {
                warn!(flow = %flow.kind, "Returning-user submission without an account");
                return SubmissionOutcome::NoAccount { message: NO_ACCOUNT.into() };
            }
            SubmitTarget::Update(Some(existing)) => {
                let Some(payload) = flow.mapping.update_payload(form) else {
                    warn!(flow = %flow.kind, "Flow has no update path");
                    return SubmissionOutcome::Failed { message: SUBMIT_FAILED.into() };
                };
                self.store
                    .update(collection, &existing.id, &payload)
                    .await
                    .map(SubmissionOutcome::Updated)
            }
        };

        match result {
            Ok(outcome) => {
                info!(flow = %flow.kind, collection = %collection, "Submission stored");
                outcome
            }
            Err(e) => {
                warn!(flow = %flow.kind, status = e.status(), error = %e, "Submission failed");
                describe_failure(&e, flow)
            }
        }
    }
}

/// Map a store error to the outcome shown to the user.
pub fn describe_failure(error: &StoreError, flow: &Flow) -> SubmissionOutcome {
    match error {
        StoreError::Network(_) => SubmissionOutcome::Failed { message: NETWORK_ERROR.into() },
        StoreError::NotFound(_) => SubmissionOutcome::Failed { message: COLLECTION_NOT_FOUND.into() },
        StoreError::Rejected { status, fields, .. } if !fields.is_empty() => {
            let mut local: Vec<(String, String)> = Vec::new();
            for (remote, message) in fields {
                let field = flow.mapping.local_field(remote);
                if !local.iter().any(|(f, _)| *f == field) {
                    local.push((field, message.clone()));
                }
            }
            let message = local
                .first()
                .map(|(_, m)| m.clone())
                .unwrap_or_else(|| CHECK_INPUT.into());
            SubmissionOutcome::Rejected { message, fields: local, code: *status }
        }
        StoreError::Rejected { status: 404, .. } => {
            SubmissionOutcome::Failed { message: COLLECTION_NOT_FOUND.into() }
        }
        StoreError::Rejected { status, .. } if *status >= 500 => {
            SubmissionOutcome::Failed { message: SUBMIT_FAILED.into() }
        }
        StoreError::Rejected { status, .. } => SubmissionOutcome::Rejected {
            message: CHECK_INPUT.into(),
            fields: Vec::new(),
            code: *status,
        },
        StoreError::Unauthorized(_) | StoreError::Decode(_) => {
            SubmissionOutcome::Failed { message: SUBMIT_FAILED.into() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;
    use crate::flows::{tournament, FlowKind};
    use crate::infrastructure::memory::InMemoryRecordStore;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn adapter() -> (Arc<InMemoryRecordStore>, SubmissionAdapter) {
        let store = Arc::new(InMemoryRecordStore::new());
        (store.clone(), SubmissionAdapter::new(store))
    }

    fn tournament_form() -> FormState {
        let mut form = tournament::definition().defaults();
        form.set("phoneNumber", FieldValue::text("+20 101 234 5678"));
        form.set("favoriteGame", FieldValue::many(["tekken8"]));
        form
    }

    #[tokio::test]
    async fn test_returning_without_account_never_creates() {
        let (store, adapter) = adapter();
        let flow = Flow::new(FlowKind::Tournament);

        let outcome = adapter.submit(&flow, &tournament_form(), SubmitTarget::Update(None)).await;

        assert_eq!(outcome, SubmissionOutcome::NoAccount { message: NO_ACCOUNT.into() });
        assert_eq!(store.create_count(), 0);
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn test_lookup_then_update() {
        let (store, adapter) = adapter();
        store.seed("users", json!({ "name": "Mona Adel", "phoneNumber": "201012345678" }));
        let flow = Flow::new(FlowKind::Tournament);

        let LookupOutcome::Found(existing) = adapter.lookup_by_phone("users", "+20 101-234-5678").await else {
            panic!("expected the seeded account");
        };
        let outcome = adapter
            .submit(&flow, &tournament_form(), SubmitTarget::Update(Some(&existing)))
            .await;

        let SubmissionOutcome::Updated(record) = outcome else {
            panic!("expected an update");
        };
        assert_eq!(record.strings_field(tournament::TOURNAMENTS_FIELD), vec!["tekken8"]);
        assert_eq!(store.create_count(), 0);
    }

    #[tokio::test]
    async fn test_lookup_not_found_and_failure() {
        let (store, adapter) = adapter();
        assert_eq!(
            adapter.lookup_by_phone("users", "201099999999").await,
            LookupOutcome::NotFound { message: NO_ACCOUNT.into() }
        );
        store.fail_next(StoreError::Network("offline".into()));
        assert_eq!(
            adapter.lookup_by_phone("users", "201099999999").await,
            LookupOutcome::Failed { message: LOOKUP_FAILED.into() }
        );
    }

    #[tokio::test]
    async fn test_field_errors_map_to_local_names() {
        let (store, adapter) = adapter();
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), "Cannot be blank.".to_string());
        fields.insert("phoneNumber".to_string(), "Value must be unique.".to_string());
        store.fail_next(StoreError::Rejected { status: 400, message: "Failed to create record.".into(), fields });

        let flow = Flow::new(FlowKind::Tournament);
        let outcome = adapter.submit(&flow, &tournament_form(), SubmitTarget::Create).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Rejected {
                message: "Cannot be blank.".into(),
                fields: vec![
                    ("firstName".into(), "Cannot be blank.".into()),
                    ("phoneNumber".into(), "Value must be unique.".into()),
                ],
                code: 400,
            }
        );
    }

    #[test]
    fn test_generic_messages() {
        let flow = Flow::new(FlowKind::Attendee);
        let message = |e: StoreError| describe_failure(&e, &flow).message().map(String::from);

        assert_eq!(message(StoreError::Network("reset".into())).as_deref(), Some(NETWORK_ERROR));
        assert_eq!(message(StoreError::NotFound("users".into())).as_deref(), Some(COLLECTION_NOT_FOUND));
        let server = StoreError::Rejected { status: 502, message: "bad gateway".into(), fields: BTreeMap::new() };
        assert_eq!(message(server).as_deref(), Some(SUBMIT_FAILED));
        let bare = StoreError::Rejected { status: 400, message: "nope".into(), fields: BTreeMap::new() };
        assert_eq!(message(bare).as_deref(), Some(CHECK_INPUT));
    }
}
