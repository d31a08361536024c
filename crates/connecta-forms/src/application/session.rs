//! Registration session
//!
//! Binds one [`Wizard`] to the submission adapter and a draft store. The
//! session is shared behind an `Arc`; wizard state sits in a mutex that is
//! only held between awaits, never across one.
//!
//! Two flags cover the asynchronous edges: `in_flight` lets exactly one
//! submission reach the network, and `alive` is cleared on teardown so that
//! responses arriving afterwards are dropped without touching state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::notice::Notice;
use super::submission::{LookupOutcome, SubmissionAdapter, SubmissionOutcome, SubmitTarget};
use crate::domain::FieldValue;
use crate::error::WizardError;
use crate::flows::Flow;
use crate::ports::{Clock, Draft, DraftStore};
use crate::wizard::{Advance, Wizard, WizardView};

/// Drafts older than this are still restored, with a note in the log.
const STALE_DRAFT_DAYS: i64 = 7;

#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    Moved(usize),
    Blocked(Vec<String>),
    ChoiceRequired,
    AtLastStep,
    /// Lookup failed or found nobody; the step did not change.
    Notice(Notice),
    /// The session was torn down while waiting.
    Detached,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Submitted(Notice),
    /// Data kept; field errors (if any) are on the wizard.
    Failed(Notice),
    AlreadySubmitting,
    Refused(WizardError),
    Detached,
}

/// A draft that was loaded into the wizard.
#[derive(Clone, Debug, PartialEq)]
pub struct RestoredDraft {
    pub saved_at: DateTime<Utc>,
    pub stale: bool,
}

pub struct RegistrationSession {
    flow: Flow,
    adapter: Arc<SubmissionAdapter>,
    drafts: Arc<dyn DraftStore>,
    clock: Arc<dyn Clock>,
    wizard: Mutex<Wizard>,
    alive: AtomicBool,
    in_flight: AtomicBool,
}

impl RegistrationSession {
    pub fn new(
        flow: Flow,
        adapter: Arc<SubmissionAdapter>,
        drafts: Arc<dyn DraftStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let wizard = Wizard::new(flow.definition.clone(), clock.clone());
        Self {
            flow,
            adapter,
            drafts,
            clock,
            wizard: Mutex::new(wizard),
            alive: AtomicBool::new(true),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Stop applying late responses.
    pub fn teardown(&self) {
        self.alive.store(false, Ordering::SeqCst);
        debug!(flow = %self.flow.kind, "Session torn down");
    }

    /// Read access to the wizard.
    pub fn with_wizard<R>(&self, f: impl FnOnce(&Wizard) -> R) -> R {
        f(&self.wizard.lock())
    }

    pub fn view(&self) -> WizardView {
        self.wizard.lock().view()
    }

    /// Load the saved draft, if any. Corrupt drafts are logged and ignored.
    pub fn restore_draft(&self) -> Option<RestoredDraft> {
        let key = &self.flow.definition.draft_key;
        let draft = match self.drafts.load(key) {
            Ok(Some(draft)) => draft,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring unreadable draft");
                return None;
            }
        };

        let age = self.clock.now() - draft.saved_at;
        let stale = age > Duration::days(STALE_DRAFT_DAYS);
        if stale {
            info!(key = %key, days = age.num_days(), "Restoring draft older than a week");
        } else {
            info!(key = %key, minutes = age.num_minutes(), "Restoring draft");
        }
        self.wizard.lock().restore(&draft.data);
        Some(RestoredDraft { saved_at: draft.saved_at, stale })
    }

    /// Drop the saved draft and start over.
    pub fn clear_draft(&self) {
        if let Err(e) = self.drafts.clear(&self.flow.definition.draft_key) {
            warn!(error = %e, "Failed to clear draft");
        }
        self.wizard.lock().reset();
    }

    /// Save the form as the draft. A form back at its defaults removes the
    /// draft so an older one does not come back on the next start.
    fn persist(&self, wizard: &Wizard) {
        let data = wizard.snapshot();
        if data == self.flow.definition.defaults() {
            if let Err(e) = self.drafts.clear(&self.flow.definition.draft_key) {
                warn!(error = %e, "Failed to clear draft");
            }
            return;
        }
        let draft = Draft { data, saved_at: self.clock.now() };
        if let Err(e) = self.drafts.save(&self.flow.definition.draft_key, &draft) {
            warn!(error = %e, "Failed to save draft");
        }
    }

    pub fn set_value(&self, field: &str, value: FieldValue) -> Result<Vec<String>, WizardError> {
        let mut wizard = self.wizard.lock();
        let cleared = wizard.set_value(field, value)?;
        self.persist(&wizard);
        Ok(cleared)
    }

    pub fn blur(&self, field: &str) -> Result<Option<String>, WizardError> {
        self.wizard.lock().blur(field)
    }

    pub fn choose(&self, value: &str) -> Result<usize, WizardError> {
        self.wizard.lock().choose(value)
    }

    pub fn retreat(&self) -> Result<usize, WizardError> {
        self.wizard.lock().retreat()
    }

    /// Advance, performing the returning-user lookup when the step needs it.
    pub async fn advance(&self) -> Result<StepOutcome, WizardError> {
        let phone = {
            let mut wizard = self.wizard.lock();
            match wizard.advance()? {
                Advance::Moved(step) => return Ok(StepOutcome::Moved(step)),
                Advance::Blocked(fields) => return Ok(StepOutcome::Blocked(fields)),
                Advance::ChoiceRequired => return Ok(StepOutcome::ChoiceRequired),
                Advance::AtLastStep => return Ok(StepOutcome::AtLastStep),
                Advance::LookupRequired => wizard.form().text("phoneNumber").to_string(),
            }
        };

        let lookup = self
            .adapter
            .lookup_by_phone(&self.flow.definition.collection, &phone)
            .await;
        if !self.is_alive() {
            return Ok(StepOutcome::Detached);
        }

        match lookup {
            LookupOutcome::Found(record) => {
                let mut wizard = self.wizard.lock();
                wizard.set_existing_record(Some(record));
                Ok(match wizard.advance()? {
                    Advance::Moved(step) => StepOutcome::Moved(step),
                    Advance::Blocked(fields) => StepOutcome::Blocked(fields),
                    Advance::ChoiceRequired => StepOutcome::ChoiceRequired,
                    Advance::AtLastStep | Advance::LookupRequired => StepOutcome::AtLastStep,
                })
            }
            LookupOutcome::NotFound { message } | LookupOutcome::Failed { message } => {
                Ok(StepOutcome::Notice(Notice::error(message)))
            }
        }
    }

    /// Submit from the last step. A second call while one is pending returns
    /// [`SubmitOutcome::AlreadySubmitting`] without any network call.
    pub async fn submit(&self) -> SubmitOutcome {
        if !self.is_alive() {
            return SubmitOutcome::Detached;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(flow = %self.flow.kind, "Ignoring duplicate submit");
            return SubmitOutcome::AlreadySubmitting;
        }

        let _slot = SubmitSlot { session: self };
        self.submit_once().await
    }

    async fn submit_once(&self) -> SubmitOutcome {
        let (form, returning, existing) = {
            let mut wizard = self.wizard.lock();
            if let Err(e) = wizard.begin_submit() {
                return SubmitOutcome::Refused(e);
            }
            let returning = wizard.steps().iter().any(|s| s.requires_lookup);
            (wizard.snapshot(), returning, wizard.existing_record().cloned())
        };

        let target = if returning {
            SubmitTarget::Update(existing.as_ref())
        } else {
            SubmitTarget::Create
        };
        let outcome = self.adapter.submit(&self.flow, &form, target).await;

        if !self.is_alive() {
            debug!(flow = %self.flow.kind, "Dropping submission response after teardown");
            return SubmitOutcome::Detached;
        }

        let mut wizard = self.wizard.lock();
        match outcome {
            SubmissionOutcome::Created(_) | SubmissionOutcome::Updated(_) => {
                wizard.finish_submit(true, &[]);
                drop(wizard);
                if let Err(e) = self.drafts.clear(&self.flow.definition.draft_key) {
                    warn!(error = %e, "Failed to clear draft after submission");
                }
                SubmitOutcome::Submitted(Notice::success(self.flow.definition.success_message.clone()))
            }
            failed => {
                wizard.finish_submit(false, failed.field_errors());
                let message = failed.message().unwrap_or(super::submission::SUBMIT_FAILED);
                SubmitOutcome::Failed(Notice::error(message))
            }
        }
    }
}

/// Holds the submit slot for one submission. Dropping it frees the slot and
/// leaves the wizard's submitting state, also when the submitting future is
/// cancelled before the response arrives.
struct SubmitSlot<'a> {
    session: &'a RegistrationSession,
}

impl Drop for SubmitSlot<'_> {
    fn drop(&mut self) {
        let mut wizard = self.session.wizard.lock();
        if wizard.is_submitting() {
            debug!(flow = %self.session.flow.kind, "Submission ended without a response");
            wizard.finish_submit(false, &[]);
        }
        drop(wizard);
        self.session.in_flight.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::submission::NO_ACCOUNT;
    use crate::error::StoreError;
    use crate::flows::{tournament, FlowKind};
    use crate::infrastructure::memory::{InMemoryDraftStore, InMemoryRecordStore};
    use crate::ports::FixedClock;
    use serde_json::json;
    use tokio::sync::Notify;

    struct Harness {
        store: Arc<InMemoryRecordStore>,
        drafts: Arc<InMemoryDraftStore>,
        session: Arc<RegistrationSession>,
    }

    fn harness_with(kind: FlowKind, store: InMemoryRecordStore) -> Harness {
        let store = Arc::new(store);
        let drafts = Arc::new(InMemoryDraftStore::new());
        let session = Arc::new(RegistrationSession::new(
            Flow::new(kind),
            Arc::new(SubmissionAdapter::new(store.clone())),
            drafts.clone(),
            Arc::new(FixedClock::on(2025, 10, 1)),
        ));
        Harness { store, drafts, session }
    }

    fn harness(kind: FlowKind) -> Harness {
        harness_with(kind, InMemoryRecordStore::new())
    }

    async fn fill_attendee(session: &RegistrationSession) {
        for (field, value) in [("firstName", "Mona"), ("lastName", "Adel")] {
            session.set_value(field, value.into()).unwrap();
        }
        assert_eq!(session.advance().await.unwrap(), StepOutcome::Moved(1));
        for (field, value) in [("phoneNumber", "201012345678"), ("birthDate", "2000-02-02")] {
            session.set_value(field, value.into()).unwrap();
        }
        assert_eq!(session.advance().await.unwrap(), StepOutcome::Moved(2));
        for (field, value) in [("educationDegree", "bachelor"), ("areaOfInterest", "design")] {
            session.set_value(field, value.into()).unwrap();
        }
    }

    #[tokio::test]
    async fn test_two_rapid_submits_send_one_request() {
        let gate = Arc::new(Notify::new());
        let h = harness_with(FlowKind::Attendee, InMemoryRecordStore::with_gate(gate.clone()));
        fill_attendee(&h.session).await;

        let first = tokio::spawn({
            let session = h.session.clone();
            async move { session.submit().await }
        });
        while h.store.create_count() == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(h.session.submit().await, SubmitOutcome::AlreadySubmitting);
        gate.notify_one();

        let outcome = first.await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
        assert_eq!(h.store.create_count(), 1);
        assert_eq!(h.store.records("users").len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_submit_frees_the_session() {
        let gate = Arc::new(Notify::new());
        let h = harness_with(FlowKind::Attendee, InMemoryRecordStore::with_gate(gate.clone()));
        fill_attendee(&h.session).await;

        let first = tokio::spawn({
            let session = h.session.clone();
            async move { session.submit().await }
        });
        while h.store.create_count() == 0 {
            tokio::task::yield_now().await;
        }
        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());

        h.session.with_wizard(|w| {
            assert!(!w.is_submitting());
            assert_eq!(w.form().text("firstName"), "Mona");
        });
        gate.notify_one();

        assert!(matches!(h.session.submit().await, SubmitOutcome::Submitted(_)));
        assert_eq!(h.store.create_count(), 2);
        assert_eq!(h.store.records("users").len(), 1);
    }

    #[tokio::test]
    async fn test_retreat_works_after_cancelled_submit() {
        let gate = Arc::new(Notify::new());
        let h = harness_with(FlowKind::Attendee, InMemoryRecordStore::with_gate(gate.clone()));
        fill_attendee(&h.session).await;

        let first = tokio::spawn({
            let session = h.session.clone();
            async move { session.submit().await }
        });
        while h.store.create_count() == 0 {
            tokio::task::yield_now().await;
        }
        first.abort();
        let _ = first.await;

        assert_eq!(h.session.retreat().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_success_resets_and_clears_draft() {
        let h = harness(FlowKind::Attendee);
        fill_attendee(&h.session).await;
        assert!(h.drafts.load("connecta2025_attendee_draft").unwrap().is_some());

        let SubmitOutcome::Submitted(notice) = h.session.submit().await else {
            panic!("expected success");
        };
        assert!(!notice.is_error());
        assert!(h.drafts.load("connecta2025_attendee_draft").unwrap().is_none());
        h.session.with_wizard(|w| {
            assert_eq!(w.current_index(), 0);
            assert!(w.form().is_blank());
        });
    }

    #[tokio::test]
    async fn test_failure_keeps_data_and_maps_fields() {
        let h = harness(FlowKind::Attendee);
        fill_attendee(&h.session).await;
        let mut fields = std::collections::BTreeMap::new();
        fields.insert("phoneNumber".to_string(), "Value must be unique.".to_string());
        h.store.fail_next(StoreError::Rejected { status: 400, message: "Failed".into(), fields });

        let SubmitOutcome::Failed(notice) = h.session.submit().await else {
            panic!("expected failure");
        };
        assert_eq!(notice.message, "Value must be unique.");
        h.session.with_wizard(|w| {
            assert_eq!(w.current_index(), 2);
            assert!(!w.is_submitting());
            assert_eq!(w.form().text("firstName"), "Mona");
            assert_eq!(w.visible_error("phoneNumber"), Some("Value must be unique."));
        });
    }

    #[tokio::test]
    async fn test_draft_round_trip_on_fresh_session() {
        let h = harness(FlowKind::Attendee);
        h.session.set_value("firstName", "Mona".into()).unwrap();
        h.session.set_value("birthDate", "2000-02-02".into()).unwrap();
        let expected = h.session.with_wizard(|w| w.snapshot());

        let fresh = RegistrationSession::new(
            Flow::new(FlowKind::Attendee),
            Arc::new(SubmissionAdapter::new(h.store.clone())),
            h.drafts.clone(),
            Arc::new(FixedClock::on(2025, 10, 20)),
        );
        let restored = fresh.restore_draft().unwrap();
        assert!(restored.stale);
        assert_eq!(fresh.with_wizard(|w| w.snapshot()), expected);
    }

    #[tokio::test]
    async fn test_untouched_form_is_not_saved() {
        let h = harness(FlowKind::Tournament);
        h.session.set_value("firstName", "".into()).unwrap();
        assert_eq!(h.drafts.save_count(), 0);
    }

    #[tokio::test]
    async fn test_form_back_at_defaults_removes_draft() {
        let h = harness(FlowKind::Attendee);
        h.session.set_value("firstName", "Mona".into()).unwrap();
        assert!(h.drafts.load("connecta2025_attendee_draft").unwrap().is_some());

        h.session.set_value("firstName", "".into()).unwrap();
        assert!(h.drafts.load("connecta2025_attendee_draft").unwrap().is_none());
        assert_eq!(h.drafts.save_count(), 1);
    }

    #[tokio::test]
    async fn test_returning_user_not_found_blocks() {
        let h = harness(FlowKind::Tournament);
        h.session.choose(tournament::RETURNING_USER).unwrap();
        h.session.set_value("phoneNumber", "201012345678".into()).unwrap();

        let outcome = h.session.advance().await.unwrap();
        assert_eq!(outcome, StepOutcome::Notice(Notice::error(NO_ACCOUNT)));
        h.session.with_wizard(|w| assert_eq!(w.current_index(), 1));
        assert_eq!(h.store.create_count(), 0);
    }

    #[tokio::test]
    async fn test_returning_user_updates_tournaments() {
        let h = harness(FlowKind::Tournament);
        let user = h.store.seed("users", json!({ "name": "Mona Adel", "phoneNumber": "201012345678" }));
        h.session.choose(tournament::RETURNING_USER).unwrap();
        h.session.set_value("phoneNumber", "+20 101 234 5678".into()).unwrap();
        assert_eq!(h.session.advance().await.unwrap(), StepOutcome::Moved(2));

        h.session.set_value("favoriteGame", FieldValue::many(["valorant"])).unwrap();
        assert!(matches!(h.session.submit().await, SubmitOutcome::Submitted(_)));

        let stored = &h.store.records("users")[0];
        assert_eq!(stored.id, user.id);
        assert_eq!(stored.strings_field(tournament::TOURNAMENTS_FIELD), vec!["valorant"]);
        assert_eq!(h.store.create_count(), 0);
    }

    #[tokio::test]
    async fn test_response_after_teardown_is_dropped() {
        let gate = Arc::new(Notify::new());
        let h = harness_with(FlowKind::Attendee, InMemoryRecordStore::with_gate(gate.clone()));
        fill_attendee(&h.session).await;

        let pending = tokio::spawn({
            let session = h.session.clone();
            async move { session.submit().await }
        });
        while h.store.create_count() == 0 {
            tokio::task::yield_now().await;
        }
        h.session.teardown();
        gate.notify_one();

        assert_eq!(pending.await.unwrap(), SubmitOutcome::Detached);
        h.session.with_wizard(|w| assert_eq!(w.form().text("firstName"), "Mona"));
        assert!(h.drafts.load("connecta2025_attendee_draft").unwrap().is_some());
    }
}
