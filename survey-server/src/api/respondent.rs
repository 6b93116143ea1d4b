//! Respondent API Handlers
//!
//! Public endpoints reached through a survey link: link info, starting or
//! resuming a session, answering and completing.

use axum::{
    Json,
    extract::{Path, State},
};
use survey_core::dto::link::PublicLinkInfo;
use survey_core::dto::response::SubmitAnswer;
use survey_core::dto::session::{SessionProgress, StartSession, StartedSession};
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::service::{link_service, session_service};
use crate::state::AppState;

/// GET /api/s/{code}
/// What the landing page needs before starting
pub async fn get_link_info(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<PublicLinkInfo>> {
    tracing::debug!("Looking up survey link: {}", code);

    let link = link_service::get_link_by_code(&state.pool, &code).await?;

    Ok(Json(PublicLinkInfo::from(&link)))
}

/// POST /api/s/{code}/start
/// Start a session, or pick up the respondent's open one
pub async fn start_session(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<StartSession>,
) -> ApiResult<Json<StartedSession>> {
    tracing::info!("Start requested on link: {}", code);

    let started = session_service::start_session(&state.pool, &code, &req.fingerprint).await?;

    Ok(Json(started))
}

/// GET /api/s/{code}/sessions/{session_id}
pub async fn resume_session(
    State(state): State<AppState>,
    Path((code, session_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<SessionProgress>> {
    tracing::debug!("Resuming session {} via link {}", session_id, code);

    let progress = session_service::resume_session(&state.pool, &code, session_id).await?;

    Ok(Json(progress))
}

/// POST /api/sessions/{id}/answers
/// Record or replace one answer, returning the updated progress
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitAnswer>,
) -> ApiResult<Json<SessionProgress>> {
    tracing::debug!("Answer for question {} in session {}", req.question_id, id);

    let progress =
        session_service::submit_answer(&state.pool, id, req, state.config.max_audio_bytes)
            .await?;

    Ok(Json(progress))
}

/// POST /api/sessions/{id}/complete
pub async fn complete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionProgress>> {
    tracing::info!("Completing session: {}", id);

    let progress = session_service::complete_session(&state.pool, id).await?;

    Ok(Json(progress))
}
