//! API Error Handling
//!
//! Unified error type and the mapping from service errors to HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::link_service::LinkError;
use crate::service::question_service::QuestionError;
use crate::service::session_service::SessionError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Gone(String),
    DatabaseError(sqlx::Error),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Gone(msg) => (StatusCode::GONE, msg),
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}

impl From<QuestionError> for ApiError {
    fn from(err: QuestionError) -> Self {
        match err {
            QuestionError::NotFound(id) => ApiError::NotFound(format!("Question {} not found", id)),
            QuestionError::ValidationError(msg) => ApiError::BadRequest(msg),
            QuestionError::InUse(msg) => ApiError::Conflict(msg),
            QuestionError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

impl From<LinkError> for ApiError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::NotFound(id) => ApiError::NotFound(format!("Link {} not found", id)),
            LinkError::CodeNotFound(code) => {
                ApiError::NotFound(format!("Survey link '{}' not found", code))
            }
            LinkError::ValidationError(msg) => ApiError::BadRequest(msg),
            LinkError::CodeGenerationFailed => {
                ApiError::InternalError("Could not generate a unique link code".to_string())
            }
            LinkError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::LinkNotFound(code) => {
                ApiError::NotFound(format!("Survey link '{}' not found", code))
            }
            SessionError::LinkUnavailable(status) => {
                ApiError::Gone(format!("Survey link is {}", status))
            }
            SessionError::NotFound(id) => ApiError::NotFound(format!("Session {} not found", id)),
            SessionError::QuestionNotFound(id) => {
                ApiError::NotFound(format!("Question {} not found", id))
            }
            SessionError::QuestionNotVisible(id) => ApiError::BadRequest(format!(
                "Question {} is not part of this session right now",
                id
            )),
            SessionError::AlreadyCompleted(id) => {
                ApiError::Conflict(format!("Session {} is already completed", id))
            }
            SessionError::Incomplete(_) => {
                ApiError::BadRequest("Required questions are still unanswered".to_string())
            }
            SessionError::InvalidAnswer(msg) | SessionError::InvalidAudio(msg) => {
                ApiError::BadRequest(msg)
            }
            SessionError::AudioNotFound(id) => {
                ApiError::NotFound(format!("No audio recorded for question {}", id))
            }
            SessionError::Internal(msg) => ApiError::InternalError(msg),
            SessionError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
