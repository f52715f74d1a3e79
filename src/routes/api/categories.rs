use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::PageQuery;
use crate::error::AppError;
use crate::models::category::{Category, CreateCategory};
use crate::routes::AppState;
use crate::routes::extract::{AppJson, AppQuery};
use crate::validation::validate_payload;

pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<Vec<Category>>, AppError> {
    let page = state.paging.page(query.from, query.size)?;
    let categories = state.store.list_categories(page).await?;
    Ok(Json(categories))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, AppError> {
    state
        .store
        .find_category(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Category with id={id} was not found")))
}

pub async fn create(
    State(state): State<AppState>,
    AppJson(mut input): AppJson<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    input.name = input.name.trim().to_string();
    validate_payload("new category", &input)?;
    let category = state.store.create_category(input).await?;
    tracing::info!("Category {} created", category.id);
    Ok((StatusCode::CREATED, Json(category)))
}
