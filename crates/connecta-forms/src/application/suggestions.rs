//! Autocomplete suggestions.
//!
//! Local option lists are filtered in place. School and university names
//! come from the backend: short queries never leave the process, and within a
//! burst of keystrokes only the last query is sent.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::Script;
use crate::ports::{Filter, ListQuery, RecordStore};

pub const SCHOOLS_COLLECTION: &str = "schools";
pub const UNIVERSITIES_COLLECTION: &str = "universities";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SuggestionSettings {
    pub min_chars: usize,
    pub limit: usize,
    pub debounce: Duration,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            min_chars: 2,
            limit: 10,
            debounce: Duration::from_millis(300),
        }
    }
}

/// Collection holding names for an education level.
pub fn collection_for(education: &str) -> &'static str {
    if education == "high-school" {
        SCHOOLS_COLLECTION
    } else {
        UNIVERSITIES_COLLECTION
    }
}

/// Filter a fixed list: case-insensitive substring, capped at `limit`.
pub fn filter_local<'a>(items: &'a [String], query: &str, settings: &SuggestionSettings) -> Vec<&'a str> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < settings.min_chars {
        return Vec::new();
    }
    items
        .iter()
        .filter(|item| item.to_lowercase().contains(&query))
        .take(settings.limit)
        .map(String::as_str)
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Suggestions {
    Found(Vec<String>),
    /// Below the minimum length; nothing was sent.
    TooShort,
    /// A newer query arrived; this result is discarded.
    Superseded,
    Failed,
}

pub struct RemoteSuggester {
    store: Arc<dyn RecordStore>,
    settings: SuggestionSettings,
    generation: AtomicU64,
}

impl RemoteSuggester {
    pub fn new(store: Arc<dyn RecordStore>, settings: SuggestionSettings) -> Self {
        Self {
            store,
            settings,
            generation: AtomicU64::new(0),
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub async fn suggest(&self, collection: &str, query: &str) -> Suggestions {
        let query = query.trim();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if query.chars().count() < self.settings.min_chars {
            return Suggestions::TooShort;
        }

        tokio::time::sleep(self.settings.debounce).await;
        if !self.is_current(generation) {
            return Suggestions::Superseded;
        }

        let column = Script::detect(query).name_column();
        let list = ListQuery {
            page: 1,
            per_page: self.settings.limit as u32,
            sort: Some(column.to_string()),
            filter: Some(Filter::like(column, query)),
        };
        debug!(collection = %collection, column = %column, "Fetching suggestions");

        let page = match self.store.list(collection, &list).await {
            Ok(page) => page,
            Err(e) => {
                warn!(collection = %collection, error = %e, "Suggestion lookup failed");
                return Suggestions::Failed;
            }
        };
        if !self.is_current(generation) {
            return Suggestions::Superseded;
        }

        Suggestions::Found(
            page.items
                .iter()
                .filter_map(|r| r.str_field(column))
                .map(String::from)
                .take(self.settings.limit)
                .collect(),
        )
    }
}
