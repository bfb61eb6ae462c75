use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::product::{
    ActiveModel as ProductActiveModel, Column, Entity as Product, Model as ProductModel,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::BaseRepository;

/// Repository for catalog reads and writes
#[derive(Debug, Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductModel>, ServiceError> {
        Product::find_by_id(id)
            .one(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Products whose id is in `ids`; unknown ids are simply absent.
    pub async fn find_by_ids<C: ConnectionTrait>(
        conn: &C,
        ids: &[Uuid],
    ) -> Result<Vec<ProductModel>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Product::find()
            .filter(Column::Id.is_in(ids.to_vec()))
            .all(conn)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Catalog ordered by category then name
    pub async fn find_all(&self, include_inactive: bool) -> Result<Vec<ProductModel>, ServiceError> {
        let mut query = Product::find();
        if !include_inactive {
            query = query.filter(Column::IsActive.eq(true));
        }

        query
            .order_by_asc(Column::Category)
            .order_by_asc(Column::Name)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn create(&self, product: ProductActiveModel) -> Result<ProductModel, ServiceError> {
        product
            .insert(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn update(&self, product: ProductActiveModel) -> Result<ProductModel, ServiceError> {
        product
            .update(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

impl Repository for ProductRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
