//! Stats API Handler

use axum::{
    Json,
    extract::{Query, State},
};
use survey_core::dto::stats::SurveyStats;

use crate::api::error::ApiResult;
use crate::api::question::RoleQuery;
use crate::service::stats_service;
use crate::state::AppState;

/// GET /api/stats?role=
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
) -> ApiResult<Json<SurveyStats>> {
    let role = query.parse()?;
    tracing::debug!("Computing stats (role: {:?})", role);

    let stats = stats_service::get_stats(&state.pool, role).await?;

    Ok(Json(stats))
}
