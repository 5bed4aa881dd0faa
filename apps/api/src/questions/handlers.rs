use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::question::{NewQuestion, QuestionPatch, QuestionRow};
use crate::questions::filter::QuestionFilter;
use crate::questions::repository::Page;
use crate::state::AppState;

const DEFAULT_HTTP_LIMIT: u32 = 10;

fn default_limit() -> u32 {
    DEFAULT_HTTP_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub tags: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub tags: Option<String>,
    pub difficulty: Option<String>,
}

/// GET /api/questions/
pub async fn handle_list_questions(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<QuestionRow>>, AppError> {
    let filter = QuestionFilter::new(params.tags.as_deref(), params.difficulty.as_deref());
    let page = Page {
        skip: params.skip,
        limit: params.limit,
    };
    Ok(Json(state.questions.list(&filter, page).await?))
}

/// GET /api/questions/random/
pub async fn handle_random_question(
    State(state): State<AppState>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<QuestionRow>, AppError> {
    let filter = QuestionFilter::new(params.tags.as_deref(), params.difficulty.as_deref());
    Ok(Json(state.questions.get_random(&filter).await?))
}

/// GET /api/questions/:id
pub async fn handle_get_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<QuestionRow>, AppError> {
    Ok(Json(state.questions.get_by_id(id).await?))
}

/// POST /api/questions/
pub async fn handle_create_question(
    State(state): State<AppState>,
    Json(req): Json<NewQuestion>,
) -> Result<(StatusCode, Json<QuestionRow>), AppError> {
    let created = state.questions.create(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/questions/:id
pub async fn handle_update_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<QuestionPatch>,
) -> Result<Json<QuestionRow>, AppError> {
    Ok(Json(state.questions.update(id, patch).await?))
}

/// DELETE /api/questions/:id
pub async fn handle_delete_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.questions.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Question {id} not found")))
    }
}
