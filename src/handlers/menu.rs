use axum::{extract::State, Json};

use super::AppState;
use crate::services::catalog::MenuCategory;
use crate::{ApiResponse, ApiResult};

/// Active products grouped by category, for the order form picker
#[utoipa::path(
    get,
    path = "/api/v1/menu",
    summary = "Menu",
    responses(
        (status = 200, description = "Menu grouped by category", body = ApiResponse<Vec<MenuCategory>>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn get_menu(State(state): State<AppState>) -> ApiResult<Vec<MenuCategory>> {
    let menu = state.services.catalog.menu().await?;
    Ok(Json(ApiResponse::success(menu)))
}
