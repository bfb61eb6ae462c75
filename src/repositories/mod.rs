use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod order_repository;
pub mod product_repository;

pub use order_repository::{day_bounds, OrderFlag, OrderRepository};
pub use product_repository::ProductRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
