use chrono::NaiveDate;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::aggregation::sales::{build_sales_report, default_sales_date, SalesReport};
use crate::errors::ServiceError;
use crate::repositories::{OrderFlag, OrderRepository};

/// Service for the sales page
pub struct SalesService {
    orders: OrderRepository,
    preferred_bakers: Vec<String>,
}

impl SalesService {
    pub fn new(orders: OrderRepository, preferred_bakers: Vec<String>) -> Self {
        Self {
            orders,
            preferred_bakers,
        }
    }

    #[instrument(skip(self))]
    pub async fn report(&self, date: Option<NaiveDate>) -> Result<SalesReport, ServiceError> {
        let all = self.orders.find_all().await.map_err(|e| {
            error!(error = %e, "Failed to load orders for sales");
            e
        })?;

        let selected = date.or_else(|| default_sales_date(&all));
        let day_ids: Vec<Uuid> = match selected {
            Some(day) => self
                .orders
                .find_on_date(day)
                .await
                .map_err(|e| {
                    error!(error = %e, %day, "Failed to load day orders for sales");
                    e
                })?
                .iter()
                .map(|o| o.id)
                .collect(),
            None => Vec::new(),
        };

        let items = self.orders.items_with_products(&day_ids).await.map_err(|e| {
            error!(error = %e, "Failed to load items for sales");
            e
        })?;

        Ok(build_sales_report(&all, selected, &items, &self.preferred_bakers))
    }

    /// Marks the order paid and returns the refreshed report.
    #[instrument(skip(self))]
    pub async fn mark_paid(
        &self,
        order_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<SalesReport, ServiceError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let order_date = order.date();
        if order.is_paid {
            debug!(%order_id, "Order already paid");
        } else {
            self.orders.set_flag(order, OrderFlag::Paid, true).await?;
            info!(%order_id, "Order marked paid");
        }

        self.report(Some(date.unwrap_or(order_date))).await
    }
}
