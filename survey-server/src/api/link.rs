//! Link API Handlers
//!
//! Admin endpoints for distribution links.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use survey_core::dto::link::{CreateLink, LinkSummary};
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::service::link_service;
use crate::state::AppState;

/// POST /api/links
/// Create a link; the tracking code is generated here
pub async fn create_link(
    State(state): State<AppState>,
    Json(req): Json<CreateLink>,
) -> ApiResult<(StatusCode, Json<LinkSummary>)> {
    tracing::info!("Creating {} link", req.role);

    let link =
        link_service::create_link(&state.pool, req, state.config.link_code_length).await?;

    Ok((
        StatusCode::CREATED,
        Json(link_service::summarize(link, &state.config.public_url)),
    ))
}

/// GET /api/links
pub async fn list_links(State(state): State<AppState>) -> ApiResult<Json<Vec<LinkSummary>>> {
    tracing::debug!("Listing links");

    let links = link_service::list_links(&state.pool).await?;

    Ok(Json(
        links
            .into_iter()
            .map(|link| link_service::summarize(link, &state.config.public_url))
            .collect(),
    ))
}

/// GET /api/links/{id}
pub async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LinkSummary>> {
    tracing::debug!("Getting link: {}", id);

    let link = link_service::get_link(&state.pool, id).await?;

    Ok(Json(link_service::summarize(link, &state.config.public_url)))
}

/// POST /api/links/{id}/deactivate
pub async fn deactivate_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LinkSummary>> {
    tracing::info!("Deactivating link: {}", id);

    let link = link_service::deactivate_link(&state.pool, id).await?;

    Ok(Json(link_service::summarize(link, &state.config.public_url)))
}

/// DELETE /api/links/{id}
pub async fn delete_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting link: {}", id);

    link_service::delete_link(&state.pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/links/{id}/qr.svg
/// Placeholder QR image of the link's survey URL
pub async fn get_link_qr(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let link = link_service::get_link(&state.pool, id).await?;
    let svg = link_service::qr_svg(&link, &state.config.public_url);

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
