use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::common::validate_request;
use super::AppState;
use crate::aggregation::orders::{OrderListView, OrderSummary};
use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::repositories::OrderFlag;
use crate::services::orders::{DraftPreview, DraftRequest, OrderDetail, OrderInput, OrderItemView};
use crate::{ApiResponse, ApiResult};

/// Orders page filters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    /// Day to show; omitted means the earliest day with open orders
    pub date: Option<NaiveDate>,
    /// Case-insensitive customer name search
    pub search: Option<String>,
}

/// Orders for one day, with the date picker
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    summary = "List orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders page", body = ApiResponse<OrderListView>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<OrderListView> {
    let view = state
        .services
        .orders
        .list_view(query.date, query.search)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    summary = "Get order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderDetail>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderDetail> {
    let detail = state.services.orders.get(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/items",
    summary = "List order items",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Items of the order", body = ApiResponse<Vec<OrderItemView>>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<OrderItemView>> {
    let items = state.services.orders.items(id).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Price candidate lines without saving them
#[utoipa::path(
    post,
    path = "/api/v1/orders/preview",
    summary = "Preview order draft",
    request_body = DraftRequest,
    responses(
        (status = 200, description = "Priced lines and running total", body = ApiResponse<DraftPreview>),
        (status = 400, description = "Unknown product or bad quantity", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn preview_order(
    State(state): State<AppState>,
    Json(request): Json<DraftRequest>,
) -> ApiResult<DraftPreview> {
    let preview = state.services.orders.preview(request).await?;
    Ok(Json(ApiResponse::success(preview)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    summary = "Create order",
    request_body = OrderInput,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderDetail>),
        (status = 400, description = "Invalid order", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<OrderInput>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDetail>>), ServiceError> {
    if let Err(rejection) = validate_request(&request) {
        return Ok(rejection);
    }

    tracing::debug!(staff = %user.username, "Creating order");
    let detail = state.services.orders.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(detail).with_message("Order saved")),
    ))
}

/// Replace the header and all items of an open order
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    summary = "Edit order",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = OrderInput,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<OrderDetail>),
        (status = 400, description = "Invalid order", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order already completed", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<OrderInput>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDetail>>), ServiceError> {
    if let Err(rejection) = validate_request(&request) {
        return Ok(rejection);
    }

    let detail = state.services.orders.update(id, request).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(detail).with_message("Order updated")),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    summary = "Delete order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order and its items removed"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.orders.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/toggle-paid",
    summary = "Toggle paid",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Updated order", body = ApiResponse<OrderSummary>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn toggle_paid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderSummary> {
    let order = state.services.orders.toggle(id, OrderFlag::Paid).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/toggle-completed",
    summary = "Toggle completed",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Updated order", body = ApiResponse<OrderSummary>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn toggle_completed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderSummary> {
    let order = state.services.orders.toggle(id, OrderFlag::Completed).await?;
    Ok(Json(ApiResponse::success(order)))
}
