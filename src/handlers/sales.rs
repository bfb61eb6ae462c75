use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use super::common::DateQuery;
use super::AppState;
use crate::aggregation::sales::SalesReport;
use crate::{ApiResponse, ApiResult};

/// Revenue for one day and overall, broken down by baker
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    summary = "Sales report",
    params(DateQuery),
    responses(
        (status = 200, description = "Sales views", body = ApiResponse<SalesReport>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "sales"
)]
pub async fn get_sales(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> ApiResult<SalesReport> {
    let report = state.services.sales.report(query.date).await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    post,
    path = "/api/v1/sales/orders/{id}/mark-paid",
    summary = "Mark order paid",
    params(("id" = Uuid, Path, description = "Order ID"), DateQuery),
    responses(
        (status = 200, description = "Refreshed sales views", body = ApiResponse<SalesReport>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "sales"
)]
pub async fn mark_paid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> ApiResult<SalesReport> {
    let report = state.services.sales.mark_paid(id, query.date).await?;
    Ok(Json(ApiResponse::success(report)))
}
