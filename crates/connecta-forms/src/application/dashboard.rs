//! Admin analytics over registered users.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::ports::{AuthSession, ListQuery, Record, RecordPage, RecordStore};

pub const USERS_COLLECTION: &str = "users";
pub const ADMINS_COLLECTION: &str = "admins";
pub const PAGE_SIZE: u32 = 50;
pub const INVALID_LOGIN: &str = "Invalid email or password.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{}", INVALID_LOGIN)]
    InvalidCredentials,
}

/// A user record flattened for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub birth_date: String,
    pub education_degree: String,
    pub area_of_interest: String,
    pub favorite_games: Vec<String>,
    pub verified: bool,
    pub created: Option<DateTime<Utc>>,
}

impl From<&Record> for UserRow {
    fn from(record: &Record) -> Self {
        let text = |name: &str| record.str_field(name).unwrap_or_default().to_string();
        Self {
            id: record.id.clone(),
            name: text("name"),
            phone_number: text("phoneNumber"),
            birth_date: text("birthDate"),
            education_degree: text("educationDegree"),
            area_of_interest: text("areaOfInterest"),
            favorite_games: record.strings_field("favoriteGame"),
            verified: record.bool_field("verified"),
            created: record.created_at(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub verified_users: usize,
    /// Percent of `total_users`, one decimal.
    pub verified_percent: f64,
    pub new_this_week: usize,
    pub top_interest: String,
    pub education: Vec<(String, usize)>,
    pub interests: Vec<(String, usize)>,
    pub top_games: Vec<(String, usize)>,
    /// `YYYY-MM` to sign-ups, oldest first.
    pub monthly_growth: Vec<(String, usize)>,
    pub unique_interests: Vec<String>,
    pub unique_educations: Vec<String>,
    pub unique_games: Vec<String>,
}

fn count<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for value in values.filter(|v| !v.is_empty()) {
        let entry = counts.entry(value).or_insert_with(|| {
            order.push(value);
            0
        });
        *entry += 1;
    }
    order.into_iter().map(|v| (v.to_string(), counts[v])).collect()
}

fn descending(mut counts: Vec<(String, usize)>) -> Vec<(String, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

impl DashboardStats {
    pub fn compute(page: &RecordPage, now: DateTime<Utc>) -> Self {
        let users: Vec<UserRow> = page.items.iter().map(UserRow::from).collect();
        let total_users = page.total_items;
        let verified_users = users.iter().filter(|u| u.verified).count();
        let verified_percent = if total_users == 0 {
            0.0
        } else {
            (verified_users as f64 / total_users as f64 * 1000.0).round() / 10.0
        };

        let week_ago = now - Duration::days(7);
        let new_this_week = users
            .iter()
            .filter(|u| u.created.map(|c| c >= week_ago).unwrap_or(false))
            .count();

        let interests = descending(count(users.iter().map(|u| u.area_of_interest.as_str())));
        let top_interest = interests
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| "N/A".into());

        let mut top_games = descending(count(
            users.iter().flat_map(|u| u.favorite_games.iter().map(String::as_str)),
        ));
        top_games.truncate(5);

        let mut monthly: BTreeMap<String, usize> = BTreeMap::new();
        for created in users.iter().filter_map(|u| u.created) {
            *monthly.entry(created.format("%Y-%m").to_string()).or_default() += 1;
        }

        Self {
            total_users,
            verified_users,
            verified_percent,
            new_this_week,
            top_interest,
            education: count(users.iter().map(|u| u.education_degree.as_str())),
            interests,
            top_games,
            monthly_growth: monthly.into_iter().collect(),
            unique_interests: unique(users.iter().map(|u| u.area_of_interest.as_str())),
            unique_educations: unique(users.iter().map(|u| u.education_degree.as_str())),
            unique_games: unique(users.iter().flat_map(|u| u.favorite_games.iter().map(String::as_str))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum VerificationFilter {
    #[default]
    Any,
    Verified,
    Unverified,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SortColumn {
    #[default]
    Name,
    Phone,
    Joined,
}

/// Search, filters and ordering of the user table.
#[derive(Clone, Debug, Default)]
pub struct UserFilter {
    /// Case-insensitive match on name or phone.
    pub search: Option<String>,
    pub interest: Option<String>,
    pub education: Option<String>,
    pub game: Option<String>,
    pub status: VerificationFilter,
    pub sort: SortColumn,
    pub descending: bool,
}

impl UserFilter {
    pub fn matches(&self, user: &UserRow) -> bool {
        let search = self.search.as_deref().map(str::to_lowercase).unwrap_or_default();
        let matches_search = search.is_empty()
            || user.name.to_lowercase().contains(&search)
            || user.phone_number.to_lowercase().contains(&search);
        let equals = |wanted: &Option<String>, actual: &str| wanted.as_deref().map_or(true, |w| w == actual);
        let matches_game = self
            .game
            .as_deref()
            .map_or(true, |g| user.favorite_games.iter().any(|f| f == g));
        let matches_status = match self.status {
            VerificationFilter::Any => true,
            VerificationFilter::Verified => user.verified,
            VerificationFilter::Unverified => !user.verified,
        };
        matches_search
            && equals(&self.interest, &user.area_of_interest)
            && equals(&self.education, &user.education_degree)
            && matches_game
            && matches_status
    }

    pub fn apply(&self, users: &[UserRow]) -> Vec<UserRow> {
        let mut rows: Vec<UserRow> = users.iter().filter(|u| self.matches(u)).cloned().collect();
        rows.sort_by(|a, b| {
            let ordering = match self.sort {
                SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                SortColumn::Phone => a.phone_number.cmp(&b.phone_number),
                SortColumn::Joined => a.created.cmp(&b.created),
            };
            if self.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        rows
    }
}

/// Admin use cases: login and the user overview.
pub struct AdminService {
    store: Arc<dyn RecordStore>,
}

impl AdminService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, LoginError> {
        if email.trim().is_empty() {
            return Err(LoginError::Missing("Email"));
        }
        if password.is_empty() {
            return Err(LoginError::Missing("Password"));
        }
        match self.store.authenticate(ADMINS_COLLECTION, email.trim(), password).await {
            Ok(session) => {
                info!(admin = %session.record.id, "Admin signed in");
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Admin login failed");
                Err(LoginError::InvalidCredentials)
            }
        }
    }

    /// Newest users, first page.
    pub async fn recent_users(&self) -> Result<RecordPage, StoreError> {
        let query = ListQuery {
            page: 1,
            per_page: PAGE_SIZE,
            sort: Some("-created".into()),
            filter: None,
        };
        self.store.list(USERS_COLLECTION, &query).await
    }
}
