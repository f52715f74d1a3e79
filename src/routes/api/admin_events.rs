use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::event::{Event, UpdateEventAdmin};
use crate::routes::AppState;
use crate::routes::extract::{AppJson, AppQuery};
use crate::services::AdminSearch;
use crate::validation::{DateRange, parse_ids, parse_states};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEventsQuery {
    #[serde(default)]
    pub user_ids: Vec<String>,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

/// GET /admin/events
pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AdminEventsQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let page = state.paging.page(query.from, query.size)?;
    let search = AdminSearch {
        users: parse_ids("userIds", &query.user_ids)?,
        states: parse_states(&query.states)?,
        categories: parse_ids("categories", &query.categories)?,
        range: DateRange::parse(query.range_start.as_deref(), query.range_end.as_deref())?,
    };
    let events = state.events.list_admin_events(search, page).await?;
    Ok(Json(events))
}

/// PATCH /admin/events/{event_id}
pub async fn update(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    AppJson(input): AppJson<UpdateEventAdmin>,
) -> Result<Json<Event>, AppError> {
    let event = state.events.update_admin_event(event_id, input).await?;
    Ok(Json(event))
}
