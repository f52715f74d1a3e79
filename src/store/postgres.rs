use async_trait::async_trait;
use sqlx::PgPool;

use super::Store;
use crate::error::AppError;
use crate::models::category::{Category, CreateCategory};
use crate::models::event::{Event, EventDraft, EventFilters};
use crate::models::user::{CreateUser, User};
use crate::validation::Page;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, input: CreateUser) -> Result<User, AppError> {
        User::create(&self.pool, input).await
    }

    async fn list_users(&self, ids: &[i64], page: Page) -> Result<Vec<User>, AppError> {
        User::list(&self.pool, ids, page).await
    }

    async fn user_exists(&self, id: i64) -> Result<bool, AppError> {
        User::exists(&self.pool, id).await
    }

    async fn create_category(&self, input: CreateCategory) -> Result<Category, AppError> {
        Category::create(&self.pool, input).await
    }

    async fn list_categories(&self, page: Page) -> Result<Vec<Category>, AppError> {
        Category::list(&self.pool, page).await
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        Category::find(&self.pool, id).await
    }

    async fn create_event(&self, draft: EventDraft) -> Result<Event, AppError> {
        Event::create(&self.pool, draft).await
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>, AppError> {
        Event::find(&self.pool, id).await
    }

    async fn search_events(
        &self,
        filters: &EventFilters,
        page: Page,
    ) -> Result<Vec<Event>, AppError> {
        Event::search(&self.pool, filters, page).await
    }

    async fn list_events_by_initiator(
        &self,
        initiator_id: i64,
        page: Page,
    ) -> Result<Vec<Event>, AppError> {
        Event::list_by_initiator(&self.pool, initiator_id, page).await
    }

    async fn update_event(&self, event: &Event) -> Result<Event, AppError> {
        Event::update(&self.pool, event).await
    }

    async fn increment_views(&self, id: i64) -> Result<(), AppError> {
        Event::increment_views(&self.pool, id).await
    }
}
