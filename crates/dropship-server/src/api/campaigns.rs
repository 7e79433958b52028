use axum::{
    extract::{Path, State},
    Extension, Json,
};
use dropship_core::Campaign;
use dropship_engine::PriceSuggestion;
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_engine_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct ApprovalData {
    campaign_id: Uuid,
    queued: usize,
}

pub(super) async fn list_campaigns(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<Campaign>>> {
    ApiResponse::new(req_id.0, state.engine.campaigns().await)
}

pub(super) async fn approve_campaign(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ApprovalData>>, ApiError> {
    let queued = state
        .engine
        .approve_content(id)
        .await
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(
        req_id.0,
        ApprovalData {
            campaign_id: id,
            queued,
        },
    ))
}

pub(super) async fn price_suggestions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PriceSuggestion>>>, ApiError> {
    let suggestions = state
        .engine
        .price_suggestions(id)
        .await
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(req_id.0, suggestions))
}
