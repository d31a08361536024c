//! Outbound ports
//!
//! Hexagonal architecture: the interfaces that infrastructure must implement.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::records::{AuthSession, BatchCreate, Filter, ListQuery, Record, RecordPage};
use crate::domain::FormState;
use crate::error::{DraftError, StoreError};

/// Page size used when walking every page of a collection.
pub const FULL_LIST_BATCH: u32 = 500;

/// Hosted record store (collections of JSON records).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a record in `collection`
    async fn create(&self, collection: &str, payload: &Value) -> Result<Record, StoreError>;

    /// Patch an existing record
    async fn update(&self, collection: &str, id: &str, payload: &Value) -> Result<Record, StoreError>;

    /// Fetch one page
    async fn list(&self, collection: &str, query: &ListQuery) -> Result<RecordPage, StoreError>;

    /// Fetch every record matching `filter`, page by page.
    async fn full_list(&self, collection: &str, filter: Option<&Filter>) -> Result<Vec<Record>, StoreError> {
        let mut query = ListQuery {
            page: 1,
            per_page: FULL_LIST_BATCH,
            sort: None,
            filter: filter.cloned(),
        };
        let mut records = Vec::new();
        loop {
            let page = self.list(collection, &query).await?;
            let fetched = page.items.len();
            records.extend(page.items);
            if fetched < query.per_page as usize || query.page >= page.total_pages {
                break;
            }
            query.page += 1;
        }
        Ok(records)
    }

    /// Password login against an auth collection
    async fn authenticate(
        &self,
        collection: &str,
        identity: &str,
        password: &str,
    ) -> Result<AuthSession, StoreError>;

    /// Send queued creates in one request; returns the number created.
    async fn batch_create(&self, requests: &[BatchCreate]) -> Result<usize, StoreError>;
}

/// Snapshot of an in-progress form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub data: FormState,
    pub saved_at: DateTime<Utc>,
}

/// Local key-value persistence for drafts.
pub trait DraftStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Draft>, DraftError>;
    fn save(&self, key: &str, draft: &Draft) -> Result<(), DraftError>;
    fn clear(&self, key: &str) -> Result<(), DraftError>;
}

/// Time source, injectable so age rules are deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Midday UTC on the given date.
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        let now = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .map(|n| n.and_utc())
            .unwrap_or_else(Utc::now);
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
