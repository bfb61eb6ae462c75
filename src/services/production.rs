use chrono::NaiveDate;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::aggregation::production::{build_production_report, default_production_date, ProductionReport};
use crate::errors::ServiceError;
use crate::repositories::{OrderFlag, OrderRepository};

/// Service for the production page
pub struct ProductionService {
    orders: OrderRepository,
}

impl ProductionService {
    pub fn new(orders: OrderRepository) -> Self {
        Self { orders }
    }

    /// Both production views for `date`, or for the earliest day still baking.
    #[instrument(skip(self))]
    pub async fn report(&self, date: Option<NaiveDate>) -> Result<ProductionReport, ServiceError> {
        let all = self.orders.find_all().await.map_err(|e| {
            error!(error = %e, "Failed to load orders for production");
            e
        })?;

        let selected = date.or_else(|| default_production_date(&all));
        let day_ids: Vec<Uuid> = match selected {
            Some(day) => self
                .orders
                .find_on_date(day)
                .await
                .map_err(|e| {
                    error!(error = %e, %day, "Failed to load day orders for production");
                    e
                })?
                .iter()
                .map(|o| o.id)
                .collect(),
            None => Vec::new(),
        };

        let items = self.orders.items_with_products(&day_ids).await.map_err(|e| {
            error!(error = %e, "Failed to load items for production");
            e
        })?;

        Ok(build_production_report(&all, selected, &items))
    }

    /// Flips production completion and re-aggregates the day it belongs to.
    ///
    /// `date` keeps the caller's selected day; without it the order's own day
    /// is used.
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        order_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<ProductionReport, ServiceError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let order_date = order.date();
        let value = !order.is_production_complete;
        self.orders
            .set_flag(order, OrderFlag::ProductionComplete, value)
            .await?;
        info!(%order_id, value, "Production completion toggled");

        self.report(Some(date.unwrap_or(order_date))).await
    }
}
