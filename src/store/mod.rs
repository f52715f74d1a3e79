//! Persistence seam for users, categories and events.
//!
//! `PgStore` is the production backend; `MemoryStore` keeps the same
//! semantics in process and backs the test suite.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::category::{Category, CreateCategory};
use crate::models::event::{Event, EventDraft, EventFilters};
use crate::models::user::{CreateUser, User};
use crate::validation::Page;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;

    async fn create_user(&self, input: CreateUser) -> Result<User, AppError>;

    /// Users ordered by id; an empty `ids` slice means all users.
    async fn list_users(&self, ids: &[i64], page: Page) -> Result<Vec<User>, AppError>;

    async fn user_exists(&self, id: i64) -> Result<bool, AppError>;

    async fn create_category(&self, input: CreateCategory) -> Result<Category, AppError>;

    async fn list_categories(&self, page: Page) -> Result<Vec<Category>, AppError>;

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError>;

    async fn create_event(&self, draft: EventDraft) -> Result<Event, AppError>;

    async fn find_event(&self, id: i64) -> Result<Option<Event>, AppError>;

    /// Filtered, sorted and paginated search. Ties always break on id ascending.
    async fn search_events(
        &self,
        filters: &EventFilters,
        page: Page,
    ) -> Result<Vec<Event>, AppError>;

    /// Events of one initiator, newest first.
    async fn list_events_by_initiator(
        &self,
        initiator_id: i64,
        page: Page,
    ) -> Result<Vec<Event>, AppError>;

    /// Persist an edited event. `event.version` must still be current,
    /// otherwise `ConcurrentModification` is returned and nothing is written.
    async fn update_event(&self, event: &Event) -> Result<Event, AppError>;

    /// Best-effort view counter bump; does not touch the version.
    async fn increment_views(&self, id: i64) -> Result<(), AppError>;
}
