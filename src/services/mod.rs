// Catalog and menu
pub mod catalog;

// Order entry and the orders page
pub mod orders;

// Daily aggregation pages
pub mod production;
pub mod sales;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::repositories::{OrderRepository, ProductRepository};

pub use catalog::CatalogService;
pub use orders::OrderService;
pub use production::ProductionService;
pub use sales::SalesService;

/// Every service the handlers need, built once at startup.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub orders: Arc<OrderService>,
    pub production: Arc<ProductionService>,
    pub sales: Arc<SalesService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, config: &AppConfig) -> Self {
        let product_repo = ProductRepository::new(db.clone());
        let order_repo = OrderRepository::new(db.clone());

        Self {
            catalog: Arc::new(CatalogService::new(product_repo)),
            orders: Arc::new(OrderService::new(db, order_repo.clone())),
            production: Arc::new(ProductionService::new(order_repo.clone())),
            sales: Arc::new(SalesService::new(
                order_repo,
                config.preferred_baker_list(),
            )),
        }
    }
}
