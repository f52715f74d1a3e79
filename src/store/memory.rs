use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Store;
use crate::error::AppError;
use crate::models::category::{Category, CreateCategory};
use crate::models::event::{Event, EventDraft, EventFilters};
use crate::models::user::{CreateUser, User};
use crate::validation::Page;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    categories: BTreeMap<i64, Category>,
    events: BTreeMap<i64, Event>,
    next_user_id: i64,
    next_category_id: i64,
    next_event_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Process-local store with the same ordering and locking rules as Postgres.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn set_counters(&self, id: i64, views: i64, confirmed_requests: i32) {
        let mut tables = self.tables.write().await;
        if let Some(event) = tables.events.get_mut(&id) {
            event.views = views;
            event.confirmed_requests = confirmed_requests;
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_user(&self, input: CreateUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == input.email) {
            return Err(AppError::Conflict(format!(
                "User with email {} already exists",
                input.email
            )));
        }
        let id = next_id(&mut tables.next_user_id);
        let user = User {
            id,
            name: input.name,
            email: input.email,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn list_users(&self, ids: &[i64], page: Page) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        let users: Vec<&User> = tables
            .users
            .values()
            .filter(|u| ids.is_empty() || ids.contains(&u.id))
            .collect();
        Ok(users[page.bounds(users.len())]
            .iter()
            .map(|u| (*u).clone())
            .collect())
    }

    async fn user_exists(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.read().await.users.contains_key(&id))
    }

    async fn create_category(&self, input: CreateCategory) -> Result<Category, AppError> {
        let mut tables = self.tables.write().await;
        let name = input.name.trim().to_string();
        if tables.categories.values().any(|c| c.name == name) {
            return Err(AppError::Conflict(format!(
                "Category {name} already exists"
            )));
        }
        let id = next_id(&mut tables.next_category_id);
        let category = Category { id, name };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self, page: Page) -> Result<Vec<Category>, AppError> {
        let tables = self.tables.read().await;
        let categories: Vec<&Category> = tables.categories.values().collect();
        Ok(categories[page.bounds(categories.len())]
            .iter()
            .map(|c| (*c).clone())
            .collect())
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn create_event(&self, draft: EventDraft) -> Result<Event, AppError> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.next_event_id);
        let event = Event {
            id,
            title: draft.title,
            annotation: draft.annotation,
            description: draft.description,
            category_id: draft.category_id,
            initiator_id: draft.initiator_id,
            paid: draft.paid,
            location: draft.location,
            event_date: draft.event_date,
            participant_limit: draft.participant_limit,
            confirmed_requests: 0,
            request_moderation: draft.request_moderation,
            state: draft.state,
            created_on: draft.created_on,
            published_on: None,
            views: 0,
            version: 0,
        };
        tables.events.insert(id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>, AppError> {
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn search_events(
        &self,
        filters: &EventFilters,
        page: Page,
    ) -> Result<Vec<Event>, AppError> {
        let tables = self.tables.read().await;
        let mut events: Vec<&Event> = tables
            .events
            .values()
            .filter(|e| filters.matches(e))
            .collect();
        events.sort_by(|a, b| filters.compare(a, b));
        Ok(events[page.bounds(events.len())]
            .iter()
            .map(|e| (*e).clone())
            .collect())
    }

    async fn list_events_by_initiator(
        &self,
        initiator_id: i64,
        page: Page,
    ) -> Result<Vec<Event>, AppError> {
        let tables = self.tables.read().await;
        let mut events: Vec<&Event> = tables
            .events
            .values()
            .filter(|e| e.initiator_id == initiator_id)
            .collect();
        events.sort_by(|a, b| b.created_on.cmp(&a.created_on).then(b.id.cmp(&a.id)));
        Ok(events[page.bounds(events.len())]
            .iter()
            .map(|e| (*e).clone())
            .collect())
    }

    async fn update_event(&self, event: &Event) -> Result<Event, AppError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .events
            .get_mut(&event.id)
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event.id)))?;
        if stored.version != event.version {
            return Err(AppError::ConcurrentModification(format!(
                "Event {} was modified concurrently, reload and retry",
                event.id
            )));
        }
        *stored = Event {
            id: stored.id,
            initiator_id: stored.initiator_id,
            created_on: stored.created_on,
            confirmed_requests: stored.confirmed_requests,
            views: stored.views,
            version: stored.version + 1,
            ..event.clone()
        };
        Ok(stored.clone())
    }

    async fn increment_views(&self, id: i64) -> Result<(), AppError> {
        if let Some(event) = self.tables.write().await.events.get_mut(&id) {
            event.views += 1;
        }
        Ok(())
    }
}
