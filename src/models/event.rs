use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::error::AppError;
use crate::models::datetime;
use crate::validation::{DateRange, Page};

/// Moderation lifecycle of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "event_state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    Pending,
    Published,
    Canceled,
}

impl EventState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventState::Pending => "PENDING",
            EventState::Published => "PUBLISHED",
            EventState::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(EventState::Pending),
            "PUBLISHED" => Ok(EventState::Published),
            "CANCELED" => Ok(EventState::Canceled),
            other => Err(format!("Unknown event state: {other}")),
        }
    }
}

/// Ordering of search results. Every variant falls back to id ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventSort {
    #[default]
    Id,
    EventDate,
    Views,
}

impl EventSort {
    fn order_by(&self) -> &'static str {
        match self {
            EventSort::Id => "id ASC",
            EventSort::EventDate => "event_date ASC, id ASC",
            EventSort::Views => "views DESC, id ASC",
        }
    }
}

impl FromStr for EventSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EVENT_DATE" => Ok(EventSort::EventDate),
            "VIEWS" => Ok(EventSort::Views),
            other => Err(format!("Unknown sort: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, sqlx::FromRow)]
pub struct Location {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be within [-90, 90]"))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be within [-180, 180]"))]
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category_id: i64,
    pub initiator_id: i64,
    pub paid: bool,
    #[sqlx(flatten)]
    pub location: Location,
    #[serde(with = "datetime")]
    pub event_date: DateTime<Utc>,
    pub participant_limit: i32,
    pub confirmed_requests: i32,
    pub request_moderation: bool,
    pub state: EventState,
    #[serde(with = "datetime")]
    pub created_on: DateTime<Utc>,
    #[serde(with = "datetime::option")]
    pub published_on: Option<DateTime<Utc>>,
    pub views: i64,
    #[serde(skip)]
    pub version: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    #[validate(length(min = 3, max = 120, message = "Title must be 3-120 characters"))]
    pub title: String,

    #[validate(length(min = 20, max = 2000, message = "Annotation must be 20-2000 characters"))]
    pub annotation: String,

    #[validate(length(min = 20, max = 7000, message = "Description must be 20-7000 characters"))]
    pub description: String,

    pub category: i64,

    #[serde(with = "datetime")]
    pub event_date: DateTime<Utc>,

    #[validate(nested)]
    pub location: Location,

    #[serde(default)]
    pub paid: bool,

    #[serde(default)]
    #[validate(range(min = 0, message = "Participant limit must not be negative"))]
    pub participant_limit: i32,

    #[serde(default = "default_request_moderation")]
    pub request_moderation: bool,
}

fn default_request_moderation() -> bool {
    true
}

/// Content fields shared by owner and admin updates. Absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[validate(length(min = 3, max = 120, message = "Title must be 3-120 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 20, max = 2000, message = "Annotation must be 20-2000 characters"))]
    pub annotation: Option<String>,

    #[validate(length(min = 20, max = 7000, message = "Description must be 20-7000 characters"))]
    pub description: Option<String>,

    pub category: Option<i64>,

    #[serde(default, with = "datetime::option")]
    pub event_date: Option<DateTime<Utc>>,

    #[validate(nested)]
    pub location: Option<Location>,

    pub paid: Option<bool>,

    #[validate(range(min = 0, message = "Participant limit must not be negative"))]
    pub participant_limit: Option<i32>,

    pub request_moderation: Option<bool>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.annotation.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.event_date.is_none()
            && self.location.is_none()
            && self.paid.is_none()
            && self.participant_limit.is_none()
            && self.request_moderation.is_none()
    }

    pub fn apply(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(annotation) = self.annotation {
            event.annotation = annotation;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(category) = self.category {
            event.category_id = category;
        }
        if let Some(event_date) = self.event_date {
            event.event_date = event_date;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(paid) = self.paid {
            event.paid = paid;
        }
        if let Some(limit) = self.participant_limit {
            event.participant_limit = limit;
        }
        if let Some(moderation) = self.request_moderation {
            event.request_moderation = moderation;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStateAction {
    CancelReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminStateAction {
    PublishEvent,
    RejectEvent,
}

impl AdminStateAction {
    pub fn target(&self) -> EventState {
        match self {
            AdminStateAction::PublishEvent => EventState::Published,
            AdminStateAction::RejectEvent => EventState::Canceled,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventUser {
    #[serde(flatten)]
    #[validate(nested)]
    pub patch: EventPatch,
    pub state_action: Option<UserStateAction>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventAdmin {
    #[serde(flatten)]
    #[validate(nested)]
    pub patch: EventPatch,
    pub state_action: Option<AdminStateAction>,
}

/// A validated event ready for insertion; the store assigns id and counters.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category_id: i64,
    pub initiator_id: i64,
    pub paid: bool,
    pub location: Location,
    pub event_date: DateTime<Utc>,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub state: EventState,
    pub created_on: DateTime<Utc>,
}

/// Search criteria. Empty lists and `None` mean "no restriction".
#[derive(Debug, Clone, Default)]
pub struct EventFilters {
    pub text: Option<String>,
    pub initiators: Vec<i64>,
    pub states: Vec<EventState>,
    pub categories: Vec<i64>,
    pub paid: Option<bool>,
    pub range: DateRange,
    pub only_available: bool,
    pub sort: EventSort,
}

impl EventFilters {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            let needle = text.to_lowercase();
            let hit = [&event.title, &event.annotation, &event.description]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        (self.initiators.is_empty() || self.initiators.contains(&event.initiator_id))
            && (self.states.is_empty() || self.states.contains(&event.state))
            && (self.categories.is_empty() || self.categories.contains(&event.category_id))
            && self.paid.is_none_or(|paid| event.paid == paid)
            && self.range.contains(event.event_date)
            && (!self.only_available || event.is_available())
    }

    pub fn compare(&self, a: &Event, b: &Event) -> Ordering {
        let primary = match self.sort {
            EventSort::Id => Ordering::Equal,
            EventSort::EventDate => a.event_date.cmp(&b.event_date),
            EventSort::Views => b.views.cmp(&a.views),
        };
        primary.then(a.id.cmp(&b.id))
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Event {
    /// Participant limit 0 means unlimited.
    pub fn is_available(&self) -> bool {
        self.participant_limit == 0 || self.confirmed_requests < self.participant_limit
    }

    pub async fn search(
        pool: &PgPool,
        filters: &EventFilters,
        page: Page,
    ) -> Result<Vec<Event>, AppError> {
        let pattern = filters
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("%{}%", escape_like(t)));
        let initiators = (!filters.initiators.is_empty()).then(|| filters.initiators.clone());
        let states = (!filters.states.is_empty()).then(|| {
            filters
                .states
                .iter()
                .map(|s| s.as_str().to_string())
                .collect::<Vec<_>>()
        });
        let categories = (!filters.categories.is_empty()).then(|| filters.categories.clone());

        let sql = format!(
            "SELECT * FROM events \
             WHERE ($1::text IS NULL OR title ILIKE $1 OR annotation ILIKE $1 OR description ILIKE $1) \
             AND ($2::int8[] IS NULL OR initiator_id = ANY($2)) \
             AND ($3::text[] IS NULL OR state::text = ANY($3)) \
             AND ($4::int8[] IS NULL OR category_id = ANY($4)) \
             AND ($5::bool IS NULL OR paid = $5) \
             AND ($6::timestamptz IS NULL OR event_date >= $6) \
             AND ($7::timestamptz IS NULL OR event_date <= $7) \
             AND (NOT $8 OR participant_limit = 0 OR confirmed_requests < participant_limit) \
             ORDER BY {} LIMIT $9 OFFSET $10",
            filters.sort.order_by()
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(pattern)
            .bind(initiators)
            .bind(states)
            .bind(categories)
            .bind(filters.paid)
            .bind(filters.range.start)
            .bind(filters.range.end)
            .bind(filters.only_available)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        Ok(events)
    }

    pub async fn list_by_initiator(
        pool: &PgPool,
        initiator_id: i64,
        page: Page,
    ) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE initiator_id = $1 ORDER BY created_on DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(initiator_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;
        Ok(events)
    }

    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(event)
    }

    pub async fn create(pool: &PgPool, draft: EventDraft) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(
            "INSERT INTO events (title, annotation, description, category_id, initiator_id, paid, lat, lon, event_date, participant_limit, request_moderation, state, created_on) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
        )
        .bind(&draft.title)
        .bind(&draft.annotation)
        .bind(&draft.description)
        .bind(draft.category_id)
        .bind(draft.initiator_id)
        .bind(draft.paid)
        .bind(draft.location.lat)
        .bind(draft.location.lon)
        .bind(draft.event_date)
        .bind(draft.participant_limit)
        .bind(draft.request_moderation)
        .bind(draft.state)
        .bind(draft.created_on)
        .fetch_one(pool)
        .await?;
        Ok(event)
    }

    /// Write back an event read at `event.version`. Fails when another writer
    /// got there first.
    pub async fn update(pool: &PgPool, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET title = $3, annotation = $4, description = $5, category_id = $6, paid = $7, lat = $8, lon = $9, event_date = $10, participant_limit = $11, request_moderation = $12, state = $13, published_on = $14, version = version + 1 WHERE id = $1 AND version = $2 RETURNING *",
        )
        .bind(event.id)
        .bind(event.version)
        .bind(&event.title)
        .bind(&event.annotation)
        .bind(&event.description)
        .bind(event.category_id)
        .bind(event.paid)
        .bind(event.location.lat)
        .bind(event.location.lon)
        .bind(event.event_date)
        .bind(event.participant_limit)
        .bind(event.request_moderation)
        .bind(event.state)
        .bind(event.published_on)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            AppError::ConcurrentModification(format!(
                "Event {} was modified concurrently, reload and retry",
                event.id
            ))
        })
    }

    pub async fn increment_views(pool: &PgPool, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE events SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
