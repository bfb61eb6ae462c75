use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::common::validate_request;
use super::AppState;
use crate::errors::ServiceError;
use crate::services::catalog::{NewProduct, ProductChanges, ProductView};
use crate::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Include products hidden from the menu
    #[serde(default)]
    pub include_inactive: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    summary = "List products",
    params(ProductListQuery),
    responses((status = 200, description = "Catalog", body = ApiResponse<Vec<ProductView>>)),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Vec<ProductView>> {
    let products = state.services.catalog.list(query.include_inactive).await?;
    Ok(Json(ApiResponse::success(products)))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    summary = "Create product",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductView>),
        (status = 400, description = "Invalid product", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<NewProduct>,
) -> Result<(StatusCode, Json<ApiResponse<ProductView>>), ServiceError> {
    if let Err(rejection) = validate_request(&request) {
        return Ok(rejection);
    }

    let product = state.services.catalog.create(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    summary = "Update product",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ProductChanges,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductView>),
        (status = 400, description = "Invalid product", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ProductChanges>,
) -> Result<(StatusCode, Json<ApiResponse<ProductView>>), ServiceError> {
    if let Err(rejection) = validate_request(&request) {
        return Ok(rejection);
    }

    let product = state.services.catalog.update(id, request).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(product))))
}

/// Hide a product from the menu; products are never deleted
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/deactivate",
    summary = "Deactivate product",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deactivated", body = ApiResponse<ProductView>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn deactivate_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProductView> {
    let product = state.services.catalog.deactivate(id).await?;
    Ok(Json(ApiResponse::success(product)))
}
