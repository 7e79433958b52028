use axum::{
    extract::{Query, State},
    Extension, Json,
};
use dropship_engine::{find_profitable_programs, programs_for_niche, AffiliateReport, RankedProgram};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AffiliatesQuery {
    pub niche: Option<String>,
}

#[allow(clippy::unused_async)] // axum handler
pub(super) async fn list_affiliates(
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AffiliatesQuery>,
) -> Json<ApiResponse<Vec<RankedProgram>>> {
    let programs = match query.niche.as_deref().map(str::trim) {
        Some(niche) if !niche.is_empty() => programs_for_niche(niche),
        _ => find_profitable_programs(),
    };
    ApiResponse::new(req_id.0, programs)
}

/// Tracked figures per profitable program, with strategy advice.
pub(super) async fn performance(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<AffiliateReport>> {
    ApiResponse::new(req_id.0, state.engine.affiliate_report().await)
}
