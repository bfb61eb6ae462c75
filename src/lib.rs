//! Bakehouse API Library
//!
//! Order entry, production planning and sales reporting for a small
//! bakery's staff dashboard.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod aggregation;
pub mod auth;
pub mod config;
pub mod db;
pub mod draft;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    http::HeaderValue,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use utoipa::ToSchema;

use crate::auth::{AuthConfig, AuthRouterExt, AuthService};
use crate::services::AppServices;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: AppServices,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = AppServices::new(db.clone(), &config);
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config)));
        Self {
            db,
            config,
            services,
            auth,
        }
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn validation_errors_response_includes_metadata() {
        let response = crate::tracing::scope_request_id(
            crate::tracing::RequestId::new("meta-validation"),
            async { ApiResponse::<()>::validation_errors(vec!["items: required".into()]) },
        )
        .await;

        assert!(!response.success);
        assert_eq!(response.errors.as_deref(), Some(&["items: required".to_string()][..]));
        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-validation"));
    }

    #[test]
    fn with_message_keeps_data() {
        let response = ApiResponse::success(7).with_message("Order saved");
        assert_eq!(response.data, Some(7));
        assert_eq!(response.message.as_deref(), Some("Order saved"));
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Dashboard routes; every one of them requires a staff session.
pub fn api_v1_routes(auth: Arc<AuthService>) -> Router<AppState> {
    use handlers::{menu, orders, production, products, sales};

    let orders = Router::new()
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/preview", post(orders::preview_order))
        .route(
            "/orders/:id",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/orders/:id/items", get(orders::get_order_items))
        .route("/orders/:id/toggle-paid", post(orders::toggle_paid))
        .route("/orders/:id/toggle-completed", post(orders::toggle_completed));

    let catalog = Router::new()
        .route("/menu", get(menu::get_menu))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products/:id", axum::routing::put(products::update_product))
        .route("/products/:id/deactivate", post(products::deactivate_product));

    let reports = Router::new()
        .route("/production", get(production::get_production))
        .route(
            "/production/orders/:id/toggle",
            post(production::toggle_production),
        )
        .route("/sales", get(sales::get_sales))
        .route("/sales/orders/:id/mark-paid", post(sales::mark_paid));

    Router::new()
        .merge(orders)
        .merge(catalog)
        .merge(reports)
        .with_auth(auth)
}

/// CORS from configuration; `None` when nothing is configured and
/// permissive CORS is not allowed.
pub fn cors_layer(cfg: &config::AppConfig) -> Option<CorsLayer> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Some(CorsLayer::permissive())
    } else {
        None
    }
}

/// Full application router: auth, dashboard API, health and docs.
pub fn build_router(state: AppState) -> Result<Router, errors::ServiceError> {
    let cors = cors_layer(&state.config).ok_or_else(|| {
        ::tracing::error!("Missing CORS configuration detected; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true");
        errors::ServiceError::InternalError("Missing CORS configuration".to_string())
    })?;

    let router = Router::<AppState>::new()
        .route("/", get(|| async { "bakehouse-api up" }))
        .nest("/api/v1", api_v1_routes(state.auth.clone()))
        .nest("/auth", auth::auth_routes(state.auth.clone()))
        .nest("/health", health::health_routes(state.db.clone()))
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state);

    Ok(router)
}
