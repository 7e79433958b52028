use axum::{extract::State, Extension, Json};
use dropship_engine::{Analytics, EarningsProjection};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

pub(super) async fn get_analytics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Analytics>> {
    ApiResponse::new(req_id.0, state.engine.analytics().await)
}

pub(super) async fn get_projection(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<EarningsProjection>> {
    ApiResponse::new(req_id.0, state.engine.earnings_projection().await)
}
