mod affiliates;
mod analytics;
mod automation;
mod campaigns;
mod posting;
mod settings;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use dropship_engine::AutomationEngine;
use serde::Serialize;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub engine: AutomationEngine,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    automation_running: bool,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_engine_error(request_id: String, error: &dropship_engine::EngineError) -> ApiError {
    match error {
        dropship_engine::EngineError::CampaignNotFound(id) => {
            ApiError::new(request_id, "not_found", format!("campaign {id} not found"))
        }
        other => {
            tracing::error!(error = %other, "engine operation failed");
            ApiError::new(request_id, "internal_error", "engine operation failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn read_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/analytics", get(analytics::get_analytics))
        .route("/api/v1/projection", get(analytics::get_projection))
        .route("/api/v1/campaigns", get(campaigns::list_campaigns))
        .route(
            "/api/v1/campaigns/{id}/pricing",
            get(campaigns::price_suggestions),
        )
        .route("/api/v1/settings", get(settings::get_settings))
        .route("/api/v1/affiliates", get(affiliates::list_affiliates))
        .route(
            "/api/v1/affiliates/performance",
            get(affiliates::performance),
        )
        .route("/api/v1/posting/queue", get(posting::queue_status))
        .route(
            "/api/v1/posting/optimal-times",
            get(posting::optimal_times),
        )
}

fn control_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/settings", axum::routing::patch(settings::update_settings))
        .route(
            "/api/v1/campaigns/{id}/approve",
            post(campaigns::approve_campaign),
        )
        .route("/api/v1/automation/start", post(automation::start))
        .route("/api/v1/automation/stop", post(automation::stop))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ))
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    let limited_routes = read_router()
        .merge(control_router(auth))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ));

    Router::new()
        .merge(public_routes)
        .merge(limited_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    ApiResponse::new(
        req_id.0,
        HealthData {
            status: "ok",
            automation_running: state.engine.is_running().await,
        },
    )
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
