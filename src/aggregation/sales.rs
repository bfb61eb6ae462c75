use super::orders::distinct_dates;
use super::{money, pieces, LineItem};
use crate::entities::{order, UnitType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BakerProductSales {
    pub product_name: String,
    pub quantity: i64,
    pub unit_type: UnitType,
    pub pieces_per_pack: Option<i32>,
    pub revenue: Decimal,
    /// e.g. "5 pcs"
    pub quantity_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BakerSales {
    pub baker_name: String,
    pub total_revenue: Decimal,
    pub products: Vec<BakerProductSales>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UnpaidOrder {
    pub order_id: Uuid,
    pub customer_name: String,
    pub total_amount: Decimal,
}

/// Sales page view model
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SalesReport {
    pub available_dates: Vec<NaiveDate>,
    pub selected_date: Option<NaiveDate>,
    pub date_revenue: Decimal,
    pub overall_revenue: Decimal,
    pub order_count: usize,
    pub bakers: Vec<BakerSales>,
    pub unpaid_orders: Vec<UnpaidOrder>,
}

/// Default sales day: the most recent one.
pub fn default_sales_date(orders: &[order::Model]) -> Option<NaiveDate> {
    orders.iter().map(order::Model::date).max()
}

pub fn revenue<'a, I>(orders: I) -> Decimal
where
    I: IntoIterator<Item = &'a order::Model>,
{
    money(orders.into_iter().map(|o| o.total_amount).sum())
}

/// Groups lines by baker and, within a baker, by product name.
///
/// Bakers named in `preferred` come first in that order; the rest follow
/// in the order they were first seen. Products keep first-seen order.
pub fn group_by_baker<'a, I>(lines: I, preferred: &[String]) -> Vec<BakerSales>
where
    I: IntoIterator<Item = &'a LineItem>,
{
    let mut bakers: Vec<BakerSales> = Vec::new();
    let mut baker_index: HashMap<String, usize> = HashMap::new();

    for line in lines {
        let baker = line.baker();
        let idx = *baker_index.entry(baker.to_string()).or_insert_with(|| {
            bakers.push(BakerSales {
                baker_name: baker.to_string(),
                total_revenue: Decimal::ZERO,
                products: Vec::new(),
            });
            bakers.len() - 1
        });

        let entry = &mut bakers[idx];
        entry.total_revenue += line.item.subtotal;

        let name = line.product_name();
        match entry.products.iter_mut().find(|p| p.product_name == name) {
            Some(existing) => {
                existing.quantity += i64::from(line.item.quantity);
                existing.revenue += line.item.subtotal;
            }
            None => entry.products.push(BakerProductSales {
                product_name: name.to_string(),
                quantity: i64::from(line.item.quantity),
                unit_type: line.unit_type(),
                pieces_per_pack: line.pieces_per_pack(),
                revenue: line.item.subtotal,
                quantity_label: String::new(),
            }),
        }
    }

    for baker in &mut bakers {
        baker.total_revenue = money(baker.total_revenue);
        for p in &mut baker.products {
            p.revenue = money(p.revenue);
            p.quantity_label = pieces::sales_label(p.quantity, p.unit_type, p.pieces_per_pack);
        }
    }

    order_bakers(bakers, preferred)
}

/// Stable ordering: preferred names by their position, then everyone else.
pub fn order_bakers(mut bakers: Vec<BakerSales>, preferred: &[String]) -> Vec<BakerSales> {
    bakers.sort_by_key(|b| {
        preferred
            .iter()
            .position(|name| name == &b.baker_name)
            .unwrap_or(preferred.len())
    });
    bakers
}

pub fn unpaid_orders<'a, I>(orders: I) -> Vec<UnpaidOrder>
where
    I: IntoIterator<Item = &'a order::Model>,
{
    orders
        .into_iter()
        .filter(|o| !o.is_paid)
        .map(|o| UnpaidOrder {
            order_id: o.id,
            customer_name: o.customer_name.clone(),
            total_amount: money(o.total_amount),
        })
        .collect()
}

/// Builds the sales page for `selected_date`.
///
/// `items` should hold the lines of the selected day's orders; lines for
/// orders on other days are ignored.
pub fn build_sales_report(
    all_orders: &[order::Model],
    selected_date: Option<NaiveDate>,
    items: &[LineItem],
    preferred: &[String],
) -> SalesReport {
    let mut day_orders: Vec<&order::Model> = match selected_date {
        Some(day) => all_orders.iter().filter(|o| o.date() == day).collect(),
        None => Vec::new(),
    };
    day_orders.sort_by_key(|o| o.created_at);

    let day_ids: Vec<Uuid> = day_orders.iter().map(|o| o.id).collect();
    let day_lines = items.iter().filter(|l| day_ids.contains(&l.order_id()));

    SalesReport {
        available_dates: distinct_dates(all_orders),
        selected_date,
        date_revenue: revenue(day_orders.iter().copied()),
        overall_revenue: revenue(all_orders),
        order_count: day_orders.len(),
        bakers: group_by_baker(day_lines, preferred),
        unpaid_orders: unpaid_orders(day_orders.iter().copied()),
    }
}
