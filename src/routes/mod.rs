pub mod api;
pub mod extract;

use std::sync::Arc;

use crate::services::EventService;
use crate::store::Store;
use crate::validation::Paging;

/// Shared by every handler; built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub events: EventService,
    pub paging: Paging,
}
