use chrono::Utc;

use super::EventService;
use crate::error::AppError;
use crate::models::event::{Event, EventFilters, EventSort, EventState};
use crate::validation::{DateRange, Page};

/// Criteria of the public catalogue search.
#[derive(Debug, Clone, Default)]
pub struct PublicSearch {
    pub text: Option<String>,
    pub categories: Vec<i64>,
    pub paid: Option<bool>,
    pub range: DateRange,
    pub only_available: bool,
    pub sort: EventSort,
}

/// Criteria of the moderation search; every list is optional.
#[derive(Debug, Clone, Default)]
pub struct AdminSearch {
    pub users: Vec<i64>,
    pub states: Vec<EventState>,
    pub categories: Vec<i64>,
    pub range: DateRange,
}

impl EventService {
    /// Published events only. Without a `rangeStart` past events are hidden.
    pub async fn list_public_events(
        &self,
        search: PublicSearch,
        page: Page,
    ) -> Result<Vec<Event>, AppError> {
        let range = DateRange {
            start: search.range.start.or_else(|| Some(Utc::now())),
            end: search.range.end,
        };
        let filters = EventFilters {
            text: search.text.filter(|t| !t.trim().is_empty()),
            states: vec![EventState::Published],
            categories: search.categories,
            paid: search.paid,
            range,
            only_available: search.only_available,
            sort: search.sort,
            ..Default::default()
        };
        let events = self.store.search_events(&filters, page).await?;
        tracing::info!("Found {} public events", events.len());
        Ok(events)
    }

    pub async fn get_public_event(&self, id: i64) -> Result<Event, AppError> {
        let mut event = self
            .store
            .find_event(id)
            .await?
            .filter(|e| e.state == EventState::Published)
            .ok_or_else(|| AppError::NotFound(format!("Event with id={id} was not found")))?;
        self.store.increment_views(id).await?;
        event.views += 1;
        tracing::info!("Found public event {id}");
        Ok(event)
    }

    pub async fn list_owner_events(&self, user_id: i64, page: Page) -> Result<Vec<Event>, AppError> {
        let events = self.store.list_events_by_initiator(user_id, page).await?;
        tracing::info!("Found {} events of user {user_id}", events.len());
        Ok(events)
    }

    pub async fn get_owner_event(&self, user_id: i64, event_id: i64) -> Result<Event, AppError> {
        self.store
            .find_event(event_id)
            .await?
            .filter(|e| e.initiator_id == user_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Event with id={event_id} was not found for user {user_id}"
                ))
            })
    }

    /// Unlike the public search, no implicit lower date bound applies.
    pub async fn list_admin_events(
        &self,
        search: AdminSearch,
        page: Page,
    ) -> Result<Vec<Event>, AppError> {
        let filters = EventFilters {
            initiators: search.users,
            states: search.states,
            categories: search.categories,
            range: search.range,
            ..Default::default()
        };
        let events = self.store.search_events(&filters, page).await?;
        tracing::info!("Found {} events for moderation", events.len());
        Ok(events)
    }
}
