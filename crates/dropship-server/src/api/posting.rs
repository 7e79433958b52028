use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use dropship_core::Platform;
use dropship_engine::optimal_posting_times;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct OptimalTimesQuery {
    pub platform: Option<String>,
}

pub(super) async fn queue_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<BTreeMap<Platform, usize>>> {
    ApiResponse::new(req_id.0, state.engine.queue_status().await)
}

#[allow(clippy::unused_async)] // axum handler
pub(super) async fn optimal_times(
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OptimalTimesQuery>,
) -> Result<Json<ApiResponse<Vec<DateTime<Utc>>>>, ApiError> {
    let platform = match query.platform.as_deref() {
        None => Platform::TikTok,
        Some(raw) => raw
            .parse::<Platform>()
            .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?,
    };
    Ok(ApiResponse::new(
        req_id.0,
        optimal_posting_times(platform, Utc::now()),
    ))
}
