//! API Module
//!
//! HTTP API layer for the survey server.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod link;
pub mod question;
pub mod respondent;
pub mod session;
pub mod stats;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Slack on top of the base64-encoded audio for the rest of the answer JSON
const BODY_OVERHEAD: usize = 64 * 1024;

/// Create the main router with all endpoints
pub fn create_router(state: AppState) -> Router {
    // Audio arrives base64-encoded inside JSON: 4 bytes per 3 decoded.
    let body_limit = state.config.max_audio_bytes.div_ceil(3) * 4 + BODY_OVERHEAD;

    let api_routes = Router::new()
        // Question endpoints
        .route(
            "/questions",
            post(question::create_question).get(question::list_questions),
        )
        .route("/questions/reorder", post(question::reorder_questions))
        .route(
            "/questions/{id}",
            get(question::get_question)
                .put(question::update_question)
                .delete(question::delete_question),
        )
        // Link endpoints
        .route("/links", post(link::create_link).get(link::list_links))
        .route("/links/{id}", get(link::get_link).delete(link::delete_link))
        .route("/links/{id}/deactivate", post(link::deactivate_link))
        .route("/links/{id}/qr.svg", get(link::get_link_qr))
        // Respondent endpoints
        .route("/s/{code}", get(respondent::get_link_info))
        .route("/s/{code}/start", post(respondent::start_session))
        .route(
            "/s/{code}/sessions/{session_id}",
            get(respondent::resume_session),
        )
        .route("/sessions/{id}/answers", post(respondent::submit_answer))
        .route("/sessions/{id}/complete", post(respondent::complete_session))
        // Session results
        .route("/sessions", get(session::list_sessions))
        .route("/sessions/{id}", get(session::get_session))
        .route("/sessions/{id}/responses", get(session::list_responses))
        .route(
            "/sessions/{id}/answers/{question_id}/audio",
            get(session::get_audio),
        )
        .route("/stats", get(stats::get_stats));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
