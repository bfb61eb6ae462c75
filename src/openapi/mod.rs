use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bakehouse API",
        version = "0.1.0",
        description = r#"
# Bakehouse Dashboard API

Staff-facing API behind the bakery dashboard.

- **Orders**: enter, edit and track customer orders for a pickup day
- **Production**: pieces to bake per product and per customer
- **Sales**: revenue by day and by baker, unpaid orders
- **Catalog**: the menu staff pick products from

## Authentication

Sign in with `POST /auth/login` and send the returned token on every
`/api/v1` request:

```
Authorization: Bearer <session-token>
```

Sessions expire; `POST /auth/logout` revokes one early.
        "#,
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Staff sessions"),
        (name = "orders", description = "Order entry and the orders page"),
        (name = "catalog", description = "Menu and products"),
        (name = "production", description = "Production planning"),
        (name = "sales", description = "Sales by day and baker"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::auth::login_handler,
        crate::auth::logout_handler,
        crate::auth::session_handler,

        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_order_items,
        crate::handlers::orders::preview_order,
        crate::handlers::orders::create_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,
        crate::handlers::orders::toggle_paid,
        crate::handlers::orders::toggle_completed,

        crate::handlers::menu::get_menu,
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::deactivate_product,

        crate::handlers::production::get_production,
        crate::handlers::production::toggle_production,
        crate::handlers::sales::get_sales,
        crate::handlers::sales::mark_paid,

        crate::health::health_check,
        crate::health::liveness_check,
        crate::health::readiness_check,
    ),
    components(
        schemas(
            crate::ResponseMeta,
            crate::errors::ErrorResponse,
            crate::auth::LoginRequest,
            crate::auth::Session,
            crate::auth::AuthUser,
            crate::entities::UnitType,
            crate::draft::QuantityInput,
            crate::draft::DraftLine,
            crate::services::orders::OrderInput,
            crate::services::orders::OrderItemInput,
            crate::services::orders::DraftRequest,
            crate::services::orders::DraftPreview,
            crate::services::orders::OrderDetail,
            crate::services::orders::OrderItemView,
            crate::services::catalog::ProductView,
            crate::services::catalog::MenuCategory,
            crate::services::catalog::NewProduct,
            crate::services::catalog::ProductChanges,
            crate::aggregation::orders::OrderListView,
            crate::aggregation::orders::OrderSummary,
            crate::aggregation::orders::DateStatus,
            crate::aggregation::production::ProductionReport,
            crate::aggregation::sales::SalesReport,
            crate::health::HealthInfo,
            crate::health::ReadinessInfo,
        )
    )
)]
pub struct ApiDocV1;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDocV1::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_dashboard_paths_and_bearer_scheme() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("Bakehouse API"));
        assert!(json.contains("/api/v1/orders/{id}/toggle-paid"));
        assert!(json.contains("/api/v1/sales/orders/{id}/mark-paid"));
        assert!(json.contains("bearer_auth"));
    }
}
