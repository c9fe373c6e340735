use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{RecommendationRequest, ScoredRecommendation},
    routes::AppState,
};

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<ScoredRecommendation>>> {
    tracing::info!(
        request_id = %request_id,
        subject = %request.subject_user_id,
        domain = ?request.domain,
        limit = request.options.limit,
        offset = request.options.offset,
        "Processing recommendation request"
    );

    let recommendations = state.engine.recommend(&request).await?;

    tracing::info!(
        request_id = %request_id,
        returned = recommendations.len(),
        "Recommendation request completed"
    );

    Ok(Json(recommendations))
}
