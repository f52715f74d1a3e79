use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::PageQuery;
use crate::error::AppError;
use crate::models::event::{CreateEvent, Event, UpdateEventUser};
use crate::routes::AppState;
use crate::routes::extract::{AppJson, AppQuery};

pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let page = state.paging.page(query.from, query.size)?;
    let events = state.events.list_owner_events(user_id, page).await?;
    Ok(Json(events))
}

pub async fn get(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<Event>, AppError> {
    let event = state.events.get_owner_event(user_id, event_id).await?;
    Ok(Json(event))
}

pub async fn create(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    AppJson(input): AppJson<CreateEvent>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state.events.create_event(user_id, input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    AppJson(input): AppJson<UpdateEventUser>,
) -> Result<Json<Event>, AppError> {
    let event = state
        .events
        .update_owner_event(user_id, event_id, input)
        .await?;
    Ok(Json(event))
}
