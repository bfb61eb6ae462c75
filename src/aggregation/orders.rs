use super::money;
use crate::entities::order;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// One selectable day in the date picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DateStatus {
    pub date: NaiveDate,
    pub order_count: usize,
    /// Every order on this day has been delivered
    pub all_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderSummary {
    pub id: Uuid,
    pub customer_name: String,
    pub order_date: NaiveDate,
    pub total_amount: Decimal,
    pub is_paid: bool,
    pub is_completed: bool,
    pub is_production_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&order::Model> for OrderSummary {
    fn from(model: &order::Model) -> Self {
        Self {
            id: model.id,
            customer_name: model.customer_name.clone(),
            order_date: model.date(),
            total_amount: money(model.total_amount),
            is_paid: model.is_paid,
            is_completed: model.is_completed,
            is_production_complete: model.is_production_complete,
            created_at: model.created_at,
        }
    }
}

/// Orders page view model
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderListView {
    pub available_dates: Vec<DateStatus>,
    pub selected_date: Option<NaiveDate>,
    pub search: Option<String>,
    pub orders: Vec<OrderSummary>,
}

/// Distinct order days, ascending, with their completion state.
pub fn available_dates(orders: &[order::Model]) -> Vec<DateStatus> {
    let mut by_date: BTreeMap<NaiveDate, (usize, bool)> = BTreeMap::new();
    for o in orders {
        let entry = by_date.entry(o.date()).or_insert((0, true));
        entry.0 += 1;
        entry.1 &= o.is_completed;
    }

    by_date
        .into_iter()
        .map(|(date, (order_count, all_completed))| DateStatus {
            date,
            order_count,
            all_completed,
        })
        .collect()
}

/// Distinct order days, ascending.
pub fn distinct_dates(orders: &[order::Model]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = orders.iter().map(order::Model::date).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Earliest day with an order matching `pending`, else the earliest day overall.
pub fn earliest_pending_date<F>(orders: &[order::Model], pending: F) -> Option<NaiveDate>
where
    F: Fn(&order::Model) -> bool,
{
    orders
        .iter()
        .filter(|o| pending(o))
        .map(order::Model::date)
        .min()
        .or_else(|| orders.iter().map(order::Model::date).min())
}

/// Default day for the orders page: earliest with an undelivered order.
pub fn default_selected_date(orders: &[order::Model]) -> Option<NaiveDate> {
    earliest_pending_date(orders, |o| !o.is_completed)
}

/// Orders on `date` whose customer name contains `query`, in display order.
pub fn filter_orders(
    orders: &[order::Model],
    date: Option<NaiveDate>,
    query: Option<&str>,
) -> Vec<order::Model> {
    let needle = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let mut filtered: Vec<order::Model> = orders
        .iter()
        .filter(|o| date.map_or(true, |d| o.date() == d))
        .filter(|o| {
            needle
                .as_deref()
                .map_or(true, |n| o.customer_name.to_lowercase().contains(n))
        })
        .cloned()
        .collect();

    sort_for_display(&mut filtered);
    filtered
}

/// Undelivered orders first, then oldest first.
pub fn sort_for_display(orders: &mut [order::Model]) {
    orders.sort_by(|a, b| {
        a.is_completed
            .cmp(&b.is_completed)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

/// Builds the orders page; `date` overrides the default selection.
pub fn build_order_list(
    orders: &[order::Model],
    date: Option<NaiveDate>,
    query: Option<&str>,
) -> OrderListView {
    let selected_date = date.or_else(|| default_selected_date(orders));
    let visible = match selected_date {
        Some(day) => filter_orders(orders, Some(day), query),
        None => Vec::new(),
    };

    OrderListView {
        available_dates: available_dates(orders),
        selected_date,
        search: query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string),
        orders: visible.iter().map(OrderSummary::from).collect(),
    }
}
