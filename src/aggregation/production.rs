use super::orders::distinct_dates;
use super::{pieces, LineItem};
use crate::entities::{order, UnitType};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProductPieces {
    pub product_name: String,
    pub total_pieces: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryProduction {
    pub category: String,
    pub products: Vec<ProductPieces>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProductionLine {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub category: String,
    pub quantity: i32,
    pub unit_type: UnitType,
    pub pieces_per_pack: Option<i32>,
    pub total_pieces: i64,
    /// e.g. "2 packs (12 pcs)"
    pub quantity_label: String,
}

impl From<&LineItem> for ProductionLine {
    fn from(line: &LineItem) -> Self {
        let unit_type = line.unit_type();
        let per_pack = line.pieces_per_pack();
        Self {
            product_id: line.product.as_ref().map(|p| p.id),
            product_name: line.product_name().to_string(),
            category: line.category().to_string(),
            quantity: line.item.quantity,
            unit_type,
            pieces_per_pack: per_pack,
            total_pieces: line.total_pieces(),
            quantity_label: pieces::production_label(line.item.quantity, unit_type, per_pack),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CustomerProduction {
    pub order_id: Uuid,
    pub customer_name: String,
    pub is_production_complete: bool,
    pub is_completed: bool,
    pub is_paid: bool,
    pub items: Vec<ProductionLine>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProductionSummary {
    pub incomplete: usize,
    pub completed: usize,
}

/// Production page view model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProductionReport {
    pub available_dates: Vec<NaiveDate>,
    pub selected_date: Option<NaiveDate>,
    pub summary: ProductionSummary,
    /// Pieces still to bake, by category then product
    pub by_product: Vec<CategoryProduction>,
    pub incomplete_orders: Vec<CustomerProduction>,
    pub completed_orders: Vec<CustomerProduction>,
}

/// Default production day: earliest with an order still being baked.
pub fn default_production_date(orders: &[order::Model]) -> Option<NaiveDate> {
    super::orders::earliest_pending_date(orders, |o| !o.is_production_complete)
}

/// Sums pieces per category and product over the given lines.
pub fn group_pieces<'a, I>(lines: I) -> Vec<CategoryProduction>
where
    I: IntoIterator<Item = &'a LineItem>,
{
    let mut grouped: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    for line in lines {
        *grouped
            .entry(line.category().to_string())
            .or_default()
            .entry(line.product_name().to_string())
            .or_default() += line.total_pieces();
    }

    grouped
        .into_iter()
        .map(|(category, products)| CategoryProduction {
            category,
            products: products
                .into_iter()
                .map(|(product_name, total_pieces)| ProductPieces {
                    product_name,
                    total_pieces,
                })
                .collect(),
        })
        .collect()
}

/// Builds both production views for `selected_date`.
///
/// `all_orders` supplies the date picker; only orders on the selected day
/// contribute to the views. `items` may contain lines for any order.
pub fn build_production_report(
    all_orders: &[order::Model],
    selected_date: Option<NaiveDate>,
    items: &[LineItem],
) -> ProductionReport {
    let mut day_orders: Vec<&order::Model> = match selected_date {
        Some(day) => all_orders.iter().filter(|o| o.date() == day).collect(),
        None => Vec::new(),
    };
    day_orders.sort_by_key(|o| o.created_at);

    let mut items_by_order: HashMap<Uuid, Vec<&LineItem>> = HashMap::new();
    for line in items {
        items_by_order.entry(line.order_id()).or_default().push(line);
    }

    let mut summary = ProductionSummary::default();
    let mut incomplete_orders = Vec::new();
    let mut completed_orders = Vec::new();
    let mut pending_lines: Vec<&LineItem> = Vec::new();

    for o in day_orders {
        let lines = items_by_order.remove(&o.id).unwrap_or_default();
        let customer = CustomerProduction {
            order_id: o.id,
            customer_name: o.customer_name.clone(),
            is_production_complete: o.is_production_complete,
            is_completed: o.is_completed,
            is_paid: o.is_paid,
            items: lines.iter().map(|l| ProductionLine::from(*l)).collect(),
        };

        if o.is_production_complete {
            summary.completed += 1;
            completed_orders.push(customer);
        } else {
            summary.incomplete += 1;
            pending_lines.extend(lines);
            incomplete_orders.push(customer);
        }
    }

    ProductionReport {
        available_dates: distinct_dates(all_orders),
        selected_date,
        summary,
        by_product: group_pieces(pending_lines),
        incomplete_orders,
        completed_orders,
    }
}
