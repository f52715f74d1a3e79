use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::{EventRules, EventService};
use crate::models::category::{Category, CreateCategory};
use crate::models::event::{
    AdminStateAction, CreateEvent, Event, EventPatch, Location, UpdateEventAdmin,
};
use crate::models::user::{CreateUser, User};
use crate::store::{MemoryStore, Store};
use crate::validation::{Page, Paging};

pub(crate) struct Fixture {
    pub store: Arc<MemoryStore>,
    pub service: EventService,
}

pub(crate) fn fixture() -> Fixture {
    fixture_with(EventRules::default())
}

pub(crate) fn fixture_with(rules: EventRules) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let service = EventService::new(store.clone(), rules);
    Fixture { store, service }
}

pub(crate) fn page(from: i64, size: i64) -> Page {
    Paging::default().page(Some(from), Some(size)).unwrap()
}

pub(crate) fn new_event(category: i64, event_date: DateTime<Utc>) -> CreateEvent {
    CreateEvent {
        title: "Summer concert".to_string(),
        annotation: "Open air concert in the city park".to_string(),
        description: "Local bands play from sunset until late in the evening".to_string(),
        category,
        event_date,
        location: Location {
            lat: 59.93,
            lon: 30.31,
        },
        paid: false,
        participant_limit: 0,
        request_moderation: true,
    }
}

impl Fixture {
    pub async fn user(&self, name: &str) -> User {
        self.store
            .create_user(CreateUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
            })
            .await
            .unwrap()
    }

    pub async fn category(&self, name: &str) -> Category {
        self.store
            .create_category(CreateCategory {
                name: name.to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn submit(&self, user_id: i64, category_id: i64, days_ahead: i64) -> Event {
        let input = new_event(category_id, Utc::now() + Duration::days(days_ahead));
        self.service.create_event(user_id, input).await.unwrap()
    }

    pub async fn publish(&self, event_id: i64) -> Event {
        let update = UpdateEventAdmin {
            patch: EventPatch::default(),
            state_action: Some(AdminStateAction::PublishEvent),
        };
        self.service
            .update_admin_event(event_id, update)
            .await
            .unwrap()
    }
}
