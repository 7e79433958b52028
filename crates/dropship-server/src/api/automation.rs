use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct AutomationState {
    running: bool,
    /// Whether this request changed the state.
    changed: bool,
}

pub(super) async fn start(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<AutomationState>> {
    let changed = state.engine.start().await;
    ApiResponse::new(
        req_id.0,
        AutomationState {
            running: true,
            changed,
        },
    )
}

pub(super) async fn stop(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<AutomationState>> {
    let changed = state.engine.stop().await;
    ApiResponse::new(
        req_id.0,
        AutomationState {
            running: false,
            changed,
        },
    )
}
