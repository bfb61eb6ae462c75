//! Seed data script - populates the database with a demo bakery menu
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - the menu (breads, cakes, pastries) split between three bakers
//! - a handful of orders for today and tomorrow
//!
//! Orders go through the order service, so totals and price snapshots
//! follow the same rules as the dashboard.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use uuid::Uuid;

use bakehouse_api::db::{establish_connection, run_migrations};
use bakehouse_api::draft::QuantityInput;
use bakehouse_api::entities::UnitType;
use bakehouse_api::repositories::{OrderRepository, ProductRepository};
use bakehouse_api::services::catalog::{CatalogService, NewProduct};
use bakehouse_api::services::orders::{OrderInput, OrderItemInput, OrderService};

const MENU: &[(&str, &str, Decimal, UnitType, Option<i32>, &str)] = &[
    ("Pandesal", "Bread", dec!(60), UnitType::Pack, Some(10), "Anna"),
    ("Spanish Bread", "Bread", dec!(90), UnitType::Pack, Some(6), "Anna"),
    ("Ensaymada", "Pastry", dec!(270), UnitType::Pack, Some(6), "Nicole"),
    ("Cinnamon Roll", "Pastry", dec!(45), UnitType::Piece, None, "Nicole"),
    ("Ube Roll", "Cake", dec!(250), UnitType::Piece, None, "Mommy"),
    ("Chiffon Cake", "Cake", dec!(380), UnitType::Piece, None, "Mommy"),
    ("Banana Bread", "Bread", dec!(180), UnitType::Piece, None, "Anna"),
];

const ORDERS: &[(&str, i64, &[(&str, i64)])] = &[
    ("Tita Baby", 0, &[("Ensaymada", 2), ("Ube Roll", 1)]),
    ("Mang Tomas", 0, &[("Pandesal", 3), ("Spanish Bread", 1)]),
    ("Aling Nena", 0, &[("Chiffon Cake", 1)]),
    ("Marites", 1, &[("Cinnamon Roll", 12), ("Banana Bread", 2)]),
    ("Bong", 1, &[("Pandesal", 5)]),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("=== Bakehouse Seed Data ===");

    let database_url = std::env::var("APP__DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .unwrap_or_else(|_| "sqlite://bakehouse.db?mode=rwc".to_string());

    info!("Connecting to database: {}", database_url);
    let db = Arc::new(establish_connection(&database_url).await?);
    run_migrations(&db).await?;

    let catalog = CatalogService::new(ProductRepository::new(db.clone()));
    let orders = OrderService::new(db.clone(), OrderRepository::new(db.clone()));

    info!("Creating menu...");
    let mut product_ids: HashMap<&str, Uuid> = HashMap::new();
    for (name, category, price, unit_type, pieces_per_pack, baker) in MENU {
        let product = catalog
            .create(NewProduct {
                name: name.to_string(),
                category: category.to_string(),
                price: *price,
                unit_type: *unit_type,
                pieces_per_pack: *pieces_per_pack,
                baker: baker.to_string(),
            })
            .await?;
        product_ids.insert(*name, product.id);
    }
    info!("  Created {} products", product_ids.len());

    info!("Creating orders...");
    let today = Utc::now().date_naive();
    for (customer, day_offset, lines) in ORDERS {
        let items = lines
            .iter()
            .filter_map(|(name, quantity)| {
                product_ids.get(name).map(|id| OrderItemInput {
                    product_id: *id,
                    quantity: QuantityInput::Number(*quantity),
                })
            })
            .collect();

        let detail = orders
            .create(OrderInput {
                customer_name: customer.to_string(),
                order_date: today + Duration::days(*day_offset),
                items,
            })
            .await?;
        info!(
            "  {} on {}: {} items, total {}",
            detail.order.customer_name,
            detail.order.order_date,
            detail.items.len(),
            detail.order.total_amount
        );
    }

    info!("=== Seed Data Complete ===");
    info!("Sign in at POST /auth/login, then try:");
    info!("  curl -H 'Authorization: Bearer <token>' http://localhost:8080/api/v1/orders");
    info!("  curl -H 'Authorization: Bearer <token>' http://localhost:8080/api/v1/production");
    info!("Or explore interactively at: http://localhost:8080/swagger-ui");

    Ok(())
}
