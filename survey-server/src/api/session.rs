//! Session API Handlers
//!
//! Admin views over collected sessions and their responses.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use survey_core::domain::response::Response;
use survey_core::domain::session::Session;
use survey_core::dto::link::SessionFilter;
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::service::session_service;
use crate::state::AppState;

/// GET /api/sessions?link_id=
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(filter): Query<SessionFilter>,
) -> ApiResult<Json<Vec<Session>>> {
    tracing::debug!("Listing sessions (link: {:?})", filter.link_id);

    let sessions = session_service::list_sessions(&state.pool, filter.link_id).await?;

    Ok(Json(sessions))
}

/// GET /api/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Session>> {
    let session = session_service::get_session(&state.pool, id).await?;
    Ok(Json(session))
}

/// GET /api/sessions/{id}/responses
pub async fn list_responses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Response>>> {
    tracing::debug!("Listing responses of session: {}", id);

    let responses = session_service::list_responses(&state.pool, id).await?;

    Ok(Json(responses))
}

/// GET /api/sessions/{id}/answers/{question_id}/audio
/// Raw audio bytes with their recorded content type
pub async fn get_audio(
    State(state): State<AppState>,
    Path((id, question_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let audio = session_service::get_audio(&state.pool, id, question_id).await?;

    Ok(([(header::CONTENT_TYPE, audio.mime_type)], audio.data))
}
