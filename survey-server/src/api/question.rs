//! Question API Handlers
//!
//! Admin endpoints for defining, ordering and removing survey questions.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use survey_core::domain::question::Question;
use survey_core::domain::role::Role;
use survey_core::dto::question::{CreateQuestion, ReorderQuestions};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::service::question_service;
use crate::state::AppState;

/// Optional `?role=` filter shared by listing endpoints
#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: Option<String>,
}

impl RoleQuery {
    pub fn parse(&self) -> ApiResult<Option<Role>> {
        self.role
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .map(|r| r.parse::<Role>().map_err(ApiError::BadRequest))
            .transpose()
    }
}

/// POST /api/questions
pub async fn create_question(
    State(state): State<AppState>,
    Json(req): Json<CreateQuestion>,
) -> ApiResult<(StatusCode, Json<Question>)> {
    tracing::info!("Creating question: {}", req.text);

    let question = question_service::create_question(&state.pool, req).await?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// GET /api/questions?role=
/// List questions in display order
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
) -> ApiResult<Json<Vec<Question>>> {
    let role = query.parse()?;
    tracing::debug!("Listing questions (role: {:?})", role);

    let questions = question_service::list_questions(&state.pool, role).await?;

    Ok(Json(questions))
}

/// GET /api/questions/{id}
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Question>> {
    tracing::debug!("Getting question: {}", id);

    let question = question_service::get_question(&state.pool, id).await?;

    Ok(Json(question))
}

/// PUT /api/questions/{id}
/// Replace a question's definition
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateQuestion>,
) -> ApiResult<Json<Question>> {
    tracing::info!("Updating question: {}", id);

    let question = question_service::update_question(&state.pool, id, req).await?;

    Ok(Json(question))
}

/// DELETE /api/questions/{id}
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting question: {}", id);

    question_service::delete_question(&state.pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/questions/reorder
pub async fn reorder_questions(
    State(state): State<AppState>,
    Json(req): Json<ReorderQuestions>,
) -> ApiResult<Json<Vec<Question>>> {
    tracing::info!("Reordering {} questions", req.question_ids.len());

    let questions = question_service::reorder_questions(&state.pool, req.question_ids).await?;

    Ok(Json(questions))
}
