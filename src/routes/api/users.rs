use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::user::{CreateUser, User};
use crate::routes::AppState;
use crate::routes::extract::{AppJson, AppQuery};
use crate::validation::{parse_ids, validate_payload};

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    #[serde(default)]
    pub ids: Vec<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UsersQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let page = state.paging.page(query.from, query.size)?;
    let ids = parse_ids("ids", &query.ids)?;
    let users = state.store.list_users(&ids, page).await?;
    Ok(Json(users))
}

pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    validate_payload("new user", &input)?;
    let user = state.store.create_user(input).await?;
    tracing::info!("User {} created", user.id);
    Ok((StatusCode::CREATED, Json(user)))
}
