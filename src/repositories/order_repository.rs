use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::aggregation::LineItem;
use crate::draft::DraftLine;
use crate::entities::order::{
    ActiveModel as OrderActiveModel, Column, Entity as Order, Model as OrderModel,
};
use crate::entities::order_item::{
    self, ActiveModel as OrderItemActiveModel, Entity as OrderItem, Model as OrderItemModel,
};
use crate::entities::product::Entity as Product;
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::BaseRepository;

/// Independent boolean state on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFlag {
    Paid,
    Completed,
    ProductionComplete,
}

impl OrderFlag {
    pub fn get(self, order: &OrderModel) -> bool {
        match self {
            OrderFlag::Paid => order.is_paid,
            OrderFlag::Completed => order.is_completed,
            OrderFlag::ProductionComplete => order.is_production_complete,
        }
    }

    fn set(self, active: &mut OrderActiveModel, value: bool) {
        match self {
            OrderFlag::Paid => active.is_paid = Set(value),
            OrderFlag::Completed => active.is_completed = Set(value),
            OrderFlag::ProductionComplete => active.is_production_complete = Set(value),
        }
    }
}

/// Half-open UTC range `[date 00:00, next day 00:00)`.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
    (start, start + Duration::days(1))
}

/// Repository for order headers and their items
#[derive(Debug, Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<OrderModel>, ServiceError> {
        Order::find_by_id(id)
            .one(conn)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<OrderModel>, ServiceError> {
        Self::find_by_id(self.base.get_db(), id).await
    }

    /// Every order header, by day then creation time
    pub async fn find_all(&self) -> Result<Vec<OrderModel>, ServiceError> {
        Order::find()
            .order_by_asc(Column::OrderDate)
            .order_by_asc(Column::CreatedAt)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Orders whose date falls on `date`
    pub async fn find_on_date(&self, date: NaiveDate) -> Result<Vec<OrderModel>, ServiceError> {
        let (start, end) = day_bounds(date);
        Order::find()
            .filter(Column::OrderDate.gte(start))
            .filter(Column::OrderDate.lt(end))
            .order_by_asc(Column::CreatedAt)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Items of the given orders joined with their products
    pub async fn items_with_products(
        &self,
        order_ids: &[Uuid],
    ) -> Result<Vec<LineItem>, ServiceError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = OrderItem::find()
            .filter(order_item::Column::OrderId.is_in(order_ids.to_vec()))
            .order_by_asc(order_item::Column::CreatedAt)
            .find_also_related(Product)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(rows
            .into_iter()
            .map(|(item, product)| LineItem::new(item, product))
            .collect())
    }

    pub async fn items_for_order<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemModel>, ServiceError> {
        OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn insert_header<C: ConnectionTrait>(
        conn: &C,
        order: OrderActiveModel,
    ) -> Result<OrderModel, ServiceError> {
        order.insert(conn).await.map_err(ServiceError::DatabaseError)
    }

    pub async fn update_header<C: ConnectionTrait>(
        conn: &C,
        order: OrderActiveModel,
    ) -> Result<OrderModel, ServiceError> {
        order.update(conn).await.map_err(ServiceError::DatabaseError)
    }

    /// Deletes every item of `order_id` and inserts `lines` in their place.
    pub async fn replace_items<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
        lines: &[DraftLine],
    ) -> Result<Vec<OrderItemModel>, ServiceError> {
        OrderItem::delete_many()
            .filter(order_item::Column::OrderId.eq(order_id))
            .exec(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let base_time = Utc::now();
        let mut inserted = Vec::with_capacity(lines.len());
        for (position, line) in lines.iter().enumerate() {
            let item = OrderItemActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                subtotal: Set(line.subtotal),
                // keeps entry order stable when sorting by created_at
                created_at: Set(base_time + Duration::microseconds(position as i64)),
            };
            inserted.push(item.insert(conn).await.map_err(ServiceError::DatabaseError)?);
        }

        Ok(inserted)
    }

    /// Writes one flag and returns the updated header.
    pub async fn set_flag(
        &self,
        order: OrderModel,
        flag: OrderFlag,
        value: bool,
    ) -> Result<OrderModel, ServiceError> {
        let mut active = order.into_active_model();
        flag.set(&mut active, value);
        active
            .update(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Deletes the order and its items; returns whether a row was removed.
    pub async fn delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<bool, ServiceError> {
        OrderItem::delete_many()
            .filter(order_item::Column::OrderId.eq(id))
            .exec(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let result = Order::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(result.rows_affected > 0)
    }
}

impl Repository for OrderRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
