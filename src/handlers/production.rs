use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use super::common::DateQuery;
use super::AppState;
use crate::aggregation::production::ProductionReport;
use crate::{ApiResponse, ApiResult};

/// Pieces to bake per product and per customer for one day
#[utoipa::path(
    get,
    path = "/api/v1/production",
    summary = "Production report",
    params(DateQuery),
    responses(
        (status = 200, description = "Production views", body = ApiResponse<ProductionReport>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "production"
)]
pub async fn get_production(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> ApiResult<ProductionReport> {
    let report = state.services.production.report(query.date).await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Flip an order's production completion and return the refreshed report
#[utoipa::path(
    post,
    path = "/api/v1/production/orders/{id}/toggle",
    summary = "Toggle production complete",
    params(("id" = Uuid, Path, description = "Order ID"), DateQuery),
    responses(
        (status = 200, description = "Refreshed production views", body = ApiResponse<ProductionReport>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "production"
)]
pub async fn toggle_production(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> ApiResult<ProductionReport> {
    let report = state.services.production.toggle(id, query.date).await?;
    Ok(Json(ApiResponse::success(report)))
}
