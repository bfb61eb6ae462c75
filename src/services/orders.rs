use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, IntoActiveModel, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::aggregation::orders::{build_order_list, OrderListView, OrderSummary};
use crate::aggregation::{money, LineItem, OrderWithItems};
use crate::db::DbPool;
use crate::draft::{DraftLine, OrderDraft, QuantityInput};
use crate::entities::{order, product};
use crate::errors::ServiceError;
use crate::repositories::{day_bounds, OrderFlag, OrderRepository, ProductRepository};

/// One submitted line; prices always come from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    #[serde(default)]
    pub quantity: QuantityInput,
}

/// Request body for creating or editing an order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OrderInput {
    #[validate(length(min = 1, max = 120), custom = "not_blank")]
    pub customer_name: String,
    pub order_date: NaiveDate,
    #[validate(length(min = 1, message = "An order needs at least one item"))]
    pub items: Vec<OrderItemInput>,
}

/// Candidate lines to price without saving
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DraftRequest {
    /// Order being edited, so its saved prices are kept
    pub order_id: Option<Uuid>,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DraftPreview {
    pub lines: Vec<DraftLine>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl From<&LineItem> for OrderItemView {
    fn from(line: &LineItem) -> Self {
        Self {
            id: line.item.id,
            product_id: line.item.product_id,
            product_name: line.product_name().to_string(),
            quantity: line.item.quantity,
            unit_price: money(line.item.unit_price),
            subtotal: money(line.item.subtotal),
        }
    }
}

/// Order header with its items
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: OrderSummary,
    pub items: Vec<OrderItemView>,
}

impl From<&OrderWithItems> for OrderDetail {
    fn from(full: &OrderWithItems) -> Self {
        Self {
            order: OrderSummary::from(&full.order),
            items: full.items.iter().map(OrderItemView::from).collect(),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn order_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Order {} not found", id))
}

/// Prices `items` against the catalog.
///
/// `kept_prices` holds the snapshot price per product already on the order
/// being edited; those products keep that price and may be inactive.
async fn build_draft<C: ConnectionTrait>(
    conn: &C,
    items: &[OrderItemInput],
    kept_prices: &HashMap<Uuid, Decimal>,
) -> Result<OrderDraft, ServiceError> {
    let mut ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    ids.sort();
    ids.dedup();

    let products: HashMap<Uuid, product::Model> = ProductRepository::find_by_ids(conn, &ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut draft = OrderDraft::new();
    for (position, input) in items.iter().enumerate() {
        let line_no = position + 1;
        let product = products.get(&input.product_id).ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "Item {}: product {} does not exist",
                line_no, input.product_id
            ))
        })?;

        let kept = kept_prices.get(&product.id).copied();
        if !product.is_active && kept.is_none() {
            return Err(ServiceError::ValidationError(format!(
                "Item {}: {} is no longer on the menu",
                line_no, product.name
            )));
        }

        let unit_price = kept.unwrap_or(product.price);
        if draft
            .add_item_at_price(product, input.quantity.resolve(), unit_price)
            .is_none()
        {
            return Err(ServiceError::ValidationError(format!(
                "Item {}: quantity must be at least 1",
                line_no
            )));
        }
    }

    Ok(draft)
}

async fn kept_prices<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<HashMap<Uuid, Decimal>, ServiceError> {
    let mut kept = HashMap::new();
    for item in OrderRepository::items_for_order(conn, order_id).await? {
        kept.entry(item.product_id).or_insert(item.unit_price);
    }
    Ok(kept)
}

/// Service for order entry and the orders page
pub struct OrderService {
    db: Arc<DbPool>,
    orders: OrderRepository,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>, orders: OrderRepository) -> Self {
        Self { db, orders }
    }

    /// Orders page for `date` (or the default day) narrowed by `search`.
    #[instrument(skip(self))]
    pub async fn list_view(
        &self,
        date: Option<NaiveDate>,
        search: Option<String>,
    ) -> Result<OrderListView, ServiceError> {
        let all = self.orders.find_all().await.map_err(|e| {
            error!(error = %e, "Failed to load orders");
            e
        })?;
        Ok(build_order_list(&all, date, search.as_deref()))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<OrderDetail, ServiceError> {
        let order = self.orders.get(id).await?.ok_or_else(|| order_not_found(id))?;
        let items = self.orders.items_with_products(&[id]).await?;
        Ok(OrderDetail::from(&OrderWithItems { order, items }))
    }

    #[instrument(skip(self))]
    pub async fn items(&self, id: Uuid) -> Result<Vec<OrderItemView>, ServiceError> {
        if self.orders.get(id).await?.is_none() {
            return Err(order_not_found(id));
        }
        let items = self.orders.items_with_products(&[id]).await.map_err(|e| {
            error!(order_id = %id, error = %e, "Failed to load order items");
            e
        })?;
        Ok(items.iter().map(OrderItemView::from).collect())
    }

    /// Prices candidate lines exactly as a save would, without writing.
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn preview(&self, request: DraftRequest) -> Result<DraftPreview, ServiceError> {
        let db = &*self.db;
        let kept = match request.order_id {
            Some(order_id) => kept_prices(db, order_id).await?,
            None => HashMap::new(),
        };
        let draft = build_draft(db, &request.items, &kept).await?;
        Ok(DraftPreview {
            total: draft.total(),
            lines: draft.into_lines(),
        })
    }

    /// Creates the header and its items in one transaction.
    #[instrument(skip(self, input), fields(customer = %input.customer_name, date = %input.order_date))]
    pub async fn create(&self, input: OrderInput) -> Result<OrderDetail, ServiceError> {
        input.validate()?;

        let txn = self.db.begin().await?;
        let draft = build_draft(&txn, &input.items, &HashMap::new()).await?;

        let now = Utc::now();
        let header = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_name: Set(input.customer_name.trim().to_string()),
            order_date: Set(day_bounds(input.order_date).0),
            total_amount: Set(draft.total()),
            is_paid: Set(false),
            is_completed: Set(false),
            is_production_complete: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let saved = OrderRepository::insert_header(&txn, header).await?;
        OrderRepository::replace_items(&txn, saved.id, draft.lines()).await?;
        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit new order");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %saved.id, lines = draft.len(), total = %saved.total_amount, "Order created");
        self.get(saved.id).await
    }

    /// Replaces the header and every item of an open order in one transaction.
    #[instrument(skip(self, input), fields(date = %input.order_date))]
    pub async fn update(&self, id: Uuid, input: OrderInput) -> Result<OrderDetail, ServiceError> {
        input.validate()?;

        let txn = self.db.begin().await?;
        let existing = OrderRepository::find_by_id(&txn, id)
            .await?
            .ok_or_else(|| order_not_found(id))?;

        if existing.is_completed {
            warn!(order_id = %id, "Refusing to edit a completed order");
            return Err(ServiceError::Conflict(format!(
                "Order {} is completed and can no longer be edited",
                id
            )));
        }

        let kept = kept_prices(&txn, id).await?;
        let draft = build_draft(&txn, &input.items, &kept).await?;

        let mut header = existing.into_active_model();
        header.customer_name = Set(input.customer_name.trim().to_string());
        header.order_date = Set(day_bounds(input.order_date).0);
        header.total_amount = Set(draft.total());

        OrderRepository::update_header(&txn, header).await?;
        OrderRepository::replace_items(&txn, id, draft.lines()).await?;
        txn.commit().await.map_err(|e| {
            error!(order_id = %id, error = %e, "Failed to commit order edit");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %id, lines = draft.len(), total = %draft.total(), "Order updated");
        self.get(id).await
    }

    /// Removes the order together with its items.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        if !OrderRepository::delete(&txn, id).await? {
            return Err(order_not_found(id));
        }
        txn.commit().await?;

        info!(order_id = %id, "Order deleted");
        Ok(())
    }

    /// Flips `flag` and returns the updated order.
    #[instrument(skip(self))]
    pub async fn toggle(&self, id: Uuid, flag: OrderFlag) -> Result<OrderSummary, ServiceError> {
        let order = self.orders.get(id).await?.ok_or_else(|| order_not_found(id))?;
        let value = !flag.get(&order);
        let updated = self.orders.set_flag(order, flag, value).await?;

        info!(order_id = %id, ?flag, value, "Order flag toggled");
        Ok(OrderSummary::from(&updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UnitType;
    use crate::repositories::ProductRepository;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    struct Fixture {
        service: OrderService,
        products: ProductRepository,
    }

    async fn fixture() -> Fixture {
        let db = Arc::new(crate::db::memory_pool().await);
        Fixture {
            service: OrderService::new(db.clone(), OrderRepository::new(db.clone())),
            products: ProductRepository::new(db),
        }
    }

    async fn add_product(products: &ProductRepository, name: &str, price: Decimal) -> product::Model {
        let now = Utc::now();
        products
            .create(product::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(name.to_string()),
                category: Set("Bread".to_string()),
                price: Set(price),
                unit_type: Set(UnitType::Piece),
                pieces_per_pack: Set(None),
                is_active: Set(true),
                baker: Set("Anna".to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            })
            .await
            .unwrap()
    }

    fn input(customer: &str, items: Vec<(Uuid, i64)>) -> OrderInput {
        OrderInput {
            customer_name: customer.to_string(),
            order_date: NaiveDate::from_ymd_opt(2025, 4, 12).unwrap(),
            items: items
                .into_iter()
                .map(|(product_id, q)| OrderItemInput {
                    product_id,
                    quantity: QuantityInput::Number(q),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn create_recomputes_total_from_catalog_prices() {
        let fx = fixture().await;
        let ensaymada = add_product(&fx.products, "Ensaymada", dec!(270)).await;
        let ube = add_product(&fx.products, "Ube Roll", dec!(250)).await;

        let detail = fx
            .service
            .create(input("Tita Baby", vec![(ensaymada.id, 2), (ube.id, 1)]))
            .await
            .unwrap();

        assert_eq!(detail.order.total_amount, dec!(790));
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].product_name, "Ensaymada");
        assert_eq!(detail.items[0].subtotal, dec!(540));
    }

    #[tokio::test]
    async fn create_rejects_bad_lines_without_writing() {
        let fx = fixture().await;
        let p = add_product(&fx.products, "Pandesal", dec!(5)).await;

        assert_matches!(
            fx.service.create(input("A", vec![(p.id, 0)])).await,
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            fx.service.create(input("A", vec![(Uuid::new_v4(), 1)])).await,
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            fx.service.create(input("  ", vec![(p.id, 1)])).await,
            Err(ServiceError::ValidationError(_))
        );

        let view = fx.service.list_view(None, None).await.unwrap();
        assert!(view.available_dates.is_empty());
    }

    #[test]
    fn order_without_items_fails_validation() {
        let empty = input("Aling Nena", vec![]);
        let errors = empty.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));

        assert!(input("Aling Nena", vec![(Uuid::new_v4(), 1)]).validate().is_ok());
    }

    #[tokio::test]
    async fn edit_keeps_snapshot_price_for_existing_products() {
        let fx = fixture().await;
        let cake = add_product(&fx.products, "Chiffon Cake", dec!(300)).await;
        let roll = add_product(&fx.products, "Cinnamon Roll", dec!(40)).await;

        let created = fx.service.create(input("Marites", vec![(cake.id, 1)])).await.unwrap();

        let mut repriced = cake.clone().into_active_model();
        repriced.price = Set(dec!(350));
        fx.products.update(repriced).await.unwrap();

        let edited = fx
            .service
            .update(created.order.id, input("Marites", vec![(cake.id, 2), (roll.id, 1)]))
            .await
            .unwrap();

        assert_eq!(edited.items[0].unit_price, dec!(300));
        assert_eq!(edited.items[0].subtotal, dec!(600));
        assert_eq!(edited.items[1].unit_price, dec!(40));
        assert_eq!(edited.order.total_amount, dec!(640));
    }

    #[tokio::test]
    async fn completed_orders_cannot_be_edited() {
        let fx = fixture().await;
        let p = add_product(&fx.products, "Hopia", dec!(20)).await;
        let created = fx.service.create(input("Bong", vec![(p.id, 3)])).await.unwrap();

        let toggled = fx
            .service
            .toggle(created.order.id, OrderFlag::Completed)
            .await
            .unwrap();
        assert!(toggled.is_completed);

        assert_matches!(
            fx.service.update(created.order.id, input("Bong", vec![(p.id, 1)])).await,
            Err(ServiceError::Conflict(_))
        );
        let unchanged = fx.service.get(created.order.id).await.unwrap();
        assert_eq!(unchanged.items[0].quantity, 3);
    }

    #[tokio::test]
    async fn delete_removes_items_too() {
        let fx = fixture().await;
        let p = add_product(&fx.products, "Pan de Coco", dec!(12)).await;
        let created = fx.service.create(input("Nena", vec![(p.id, 4)])).await.unwrap();

        fx.service.delete(created.order.id).await.unwrap();

        assert_matches!(
            fx.service.items(created.order.id).await,
            Err(ServiceError::NotFound(_))
        );
        let orphans = OrderRepository::items_for_order(&*fx.service.db, created.order.id)
            .await
            .unwrap();
        assert!(orphans.is_empty());
        assert_matches!(
            fx.service.delete(created.order.id).await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn preview_prices_without_saving() {
        let fx = fixture().await;
        let p = add_product(&fx.products, "Ensaymada", dec!(270)).await;

        let preview = fx
            .service
            .preview(DraftRequest {
                order_id: None,
                items: vec![OrderItemInput {
                    product_id: p.id,
                    quantity: QuantityInput::Text("3".into()),
                }],
            })
            .await
            .unwrap();

        assert_eq!(preview.total, dec!(810));
        assert_eq!(preview.lines[0].quantity, 3);
        assert!(fx.service.list_view(None, None).await.unwrap().orders.is_empty());
    }
}
