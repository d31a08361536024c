//! In-memory store implementations for testing

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::error::{DraftError, StoreError};
use crate::ports::{AuthSession, BatchCreate, Draft, DraftStore, ListQuery, Record, RecordPage, RecordStore};

/// In-memory record store (for testing)
#[derive(Default)]
pub struct InMemoryRecordStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
    accounts: RwLock<HashMap<(String, String), (String, Record)>>,
    failure: Mutex<Option<StoreError>>,
    gate: Option<Arc<Notify>>,
    creates: AtomicUsize,
    updates: AtomicUsize,
    lists: AtomicUsize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every create/update until `gate` is notified.
    pub fn with_gate(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// Insert a record directly; missing `id`/`created` are filled in.
    pub fn seed(&self, collection: &str, fields: Value) -> Record {
        let record = Self::build(collection, None, &fields);
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    pub fn add_account(&self, collection: &str, identity: &str, password: &str, fields: Value) {
        let record = Self::build(collection, None, &fields);
        self.accounts.write().insert(
            (collection.to_string(), identity.to_string()),
            (password.to_string(), record),
        );
    }

    /// The next write call fails with `error`.
    pub fn fail_next(&self, error: StoreError) {
        *self.failure.lock() = Some(error);
    }

    pub fn records(&self, collection: &str) -> Vec<Record> {
        self.collections.read().get(collection).cloned().unwrap_or_default()
    }

    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn list_count(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    fn build(collection: &str, id: Option<&str>, fields: &Value) -> Record {
        let mut record: Record = serde_json::from_value(fields.clone()).unwrap_or_default();
        if record.id.is_empty() {
            record.id = id.map(String::from).unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        }
        if record.created.is_none() {
            record.created = Some(Utc::now().to_rfc3339());
        }
        record.collection_name = collection.to_string();
        record
    }

    async fn write_gate(&self) -> Result<(), StoreError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.failure.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&self, collection: &str, payload: &Value) -> Result<Record, StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.write_gate().await?;
        Ok(self.seed(collection, payload.clone()))
    }

    async fn update(&self, collection: &str, id: &str, payload: &Value) -> Result<Record, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.write_gate().await?;
        let mut collections = self.collections.write();
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection, id)))?;
        if let Value::Object(fields) = payload {
            for (key, value) in fields {
                record.fields.insert(key.clone(), value.clone());
            }
        }
        record.updated = Some(Utc::now().to_rfc3339());
        Ok(record.clone())
    }

    async fn list(&self, collection: &str, query: &ListQuery) -> Result<RecordPage, StoreError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failure.lock().take() {
            return Err(error);
        }
        let mut matching: Vec<Record> = self
            .records(collection)
            .into_iter()
            .filter(|r| query.filter.as_ref().map(|f| f.matches(r)).unwrap_or(true))
            .collect();
        if query.sort.as_deref() == Some("-created") {
            matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        }

        let per_page = query.per_page.max(1);
        let total_items = matching.len() as u64;
        let total_pages = ((matching.len() as u32) + per_page - 1) / per_page;
        let start = ((query.page.max(1) - 1) * per_page) as usize;
        let items = matching.into_iter().skip(start).take(per_page as usize).collect();
        Ok(RecordPage {
            page: query.page,
            per_page,
            total_items,
            total_pages,
            items,
        })
    }

    async fn authenticate(
        &self,
        collection: &str,
        identity: &str,
        password: &str,
    ) -> Result<AuthSession, StoreError> {
        let accounts = self.accounts.read();
        match accounts.get(&(collection.to_string(), identity.to_string())) {
            Some((stored, record)) if stored == password => Ok(AuthSession {
                token: format!("token-{}", record.id),
                record: record.clone(),
            }),
            _ => Err(StoreError::Rejected {
                status: 400,
                message: "Failed to authenticate.".into(),
                fields: Default::default(),
            }),
        }
    }

    async fn batch_create(&self, requests: &[BatchCreate]) -> Result<usize, StoreError> {
        self.creates.fetch_add(requests.len(), Ordering::SeqCst);
        self.write_gate().await?;
        for request in requests {
            self.seed(&request.collection, request.body.clone());
        }
        Ok(requests.len())
    }
}

/// In-memory draft store (for testing)
#[derive(Default)]
pub struct InMemoryDraftStore {
    drafts: RwLock<HashMap<String, Draft>>,
    saves: AtomicUsize,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl DraftStore for InMemoryDraftStore {
    fn load(&self, key: &str) -> Result<Option<Draft>, DraftError> {
        Ok(self.drafts.read().get(key).cloned())
    }

    fn save(&self, key: &str, draft: &Draft) -> Result<(), DraftError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.drafts.write().insert(key.to_string(), draft.clone());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), DraftError> {
        self.drafts.write().remove(key);
        Ok(())
    }
}
