use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::event::Event;
use crate::routes::AppState;
use crate::routes::extract::AppQuery;
use crate::services::PublicSearch;
use crate::validation::{DateRange, parse_ids, parse_sort};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicEventsQuery {
    pub text: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub paid: Option<bool>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
    #[serde(default)]
    pub only_available: bool,
    pub sort: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

/// GET /events
pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PublicEventsQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let page = state.paging.page(query.from, query.size)?;
    let search = PublicSearch {
        text: query.text,
        categories: parse_ids("categories", &query.categories)?,
        paid: query.paid,
        range: DateRange::parse(query.range_start.as_deref(), query.range_end.as_deref())?,
        only_available: query.only_available,
        sort: parse_sort(query.sort.as_deref())?,
    };
    let events = state.events.list_public_events(search, page).await?;
    Ok(Json(events))
}

/// GET /events/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, AppError> {
    let event = state.events.get_public_event(id).await?;
    Ok(Json(event))
}
