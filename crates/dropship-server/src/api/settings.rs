use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use dropship_core::{AutomationSettings, SettingsPatch};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

pub(super) async fn get_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<AutomationSettings>> {
    ApiResponse::new(req_id.0, state.engine.settings().await)
}

/// Partial update. Fields are range-checked here; the engine itself merges
/// without validation.
pub(super) async fn update_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<SettingsPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<AutomationSettings>>, ApiError> {
    let Json(patch) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    patch
        .validate()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let settings = state.engine.update_settings(patch).await;
    Ok(ApiResponse::new(req_id.0, settings))
}
