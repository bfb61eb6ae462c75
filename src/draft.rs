//! Candidate line items for an order that has not been saved yet.

use crate::aggregation::money;
use crate::entities::product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

/// Quantity as typed by staff: a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum QuantityInput {
    Number(i64),
    Text(String),
}

impl Default for QuantityInput {
    fn default() -> Self {
        QuantityInput::Number(1)
    }
}

impl QuantityInput {
    /// Text that does not parse yields 1; numbers pass through unchanged.
    pub fn resolve(&self) -> i64 {
        match self {
            QuantityInput::Number(n) => *n,
            QuantityInput::Text(raw) => parse_quantity(raw),
        }
    }
}

/// Coerces textual input into a quantity; empty or invalid text becomes 1.
pub fn parse_quantity(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DraftLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    /// Price captured when the line was added
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// In-memory list of lines; the running total is always derived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDraft {
    lines: Vec<DraftLine>,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` of `product` at its current price.
    ///
    /// Returns `None` and leaves the draft untouched when the quantity is
    /// below one.
    pub fn add_item(&mut self, product: &product::Model, quantity: i64) -> Option<&DraftLine> {
        self.add_item_at_price(product, quantity, product.price)
    }

    /// Adds a line with an explicit snapshot price, used when re-editing
    /// a saved order so its original prices survive.
    pub fn add_item_at_price(
        &mut self,
        product: &product::Model,
        quantity: i64,
        unit_price: Decimal,
    ) -> Option<&DraftLine> {
        let quantity = match i32::try_from(quantity) {
            Ok(q) if q >= 1 => q,
            _ => {
                debug!(product_id = %product.id, quantity, "Refusing draft line with quantity below one");
                return None;
            }
        };

        self.lines.push(DraftLine {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            unit_price,
            subtotal: money(unit_price * Decimal::from(quantity)),
        });
        self.lines.last()
    }

    /// Removes the line at `index`, if present.
    pub fn remove_item(&mut self, index: usize) -> Option<DraftLine> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn total(&self) -> Decimal {
        money(self.lines.iter().map(|l| l.subtotal).sum())
    }

    pub fn into_lines(self) -> Vec<DraftLine> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UnitType;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn product(name: &str, price: Decimal) -> product::Model {
        product::Model {
            id: Uuid::new_v4(),
            name: name.into(),
            category: "Cake".into(),
            price,
            unit_type: UnitType::Piece,
            pieces_per_pack: None,
            is_active: true,
            baker: "Anna".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn total_is_sum_of_subtotals() {
        let mut draft = OrderDraft::new();
        draft.add_item(&product("Ube Halaya", dec!(270.00)), 2).unwrap();
        draft.add_item(&product("Leche Flan", dec!(250.00)), 1).unwrap();

        assert_eq!(draft.total(), dec!(790.00));
        assert_eq!(draft.lines()[0].subtotal, dec!(540.00));
    }

    #[test]
    fn sub_cent_prices_keep_total_equal_to_subtotals() {
        let mut draft = OrderDraft::new();
        let p = product("Polvoron", dec!(0.5));
        for _ in 0..3 {
            draft.add_item_at_price(&p, 1, dec!(0.125)).unwrap();
        }

        assert_eq!(draft.lines()[0].subtotal, dec!(0.13));
        let summed: Decimal = draft.lines().iter().map(|l| l.subtotal).sum();
        assert_eq!(draft.total(), summed);
        assert_eq!(draft.total(), dec!(0.39));
    }

    #[test]
    fn quantity_below_one_is_refused() {
        let mut draft = OrderDraft::new();
        let p = product("Brownies", dec!(30));

        assert!(draft.add_item(&p, 0).is_none());
        assert!(draft.add_item(&p, -3).is_none());
        assert!(draft.is_empty());
        assert_eq!(draft.total(), Decimal::ZERO);
    }

    #[test]
    fn remove_by_position_updates_total() {
        let mut draft = OrderDraft::new();
        draft.add_item(&product("A", dec!(10)), 1).unwrap();
        draft.add_item(&product("B", dec!(20)), 1).unwrap();
        draft.add_item(&product("C", dec!(30)), 1).unwrap();

        let removed = draft.remove_item(1).unwrap();
        assert_eq!(removed.product_name, "B");
        assert_eq!(draft.total(), dec!(40));
        assert!(draft.remove_item(5).is_none());
        assert_eq!(draft.len(), 2);
    }

    #[test]
    fn snapshot_price_is_kept_after_catalog_change() {
        let mut p = product("Cheese Roll", dec!(20));
        let mut draft = OrderDraft::new();
        draft.add_item(&p, 3).unwrap();
        p.price = dec!(25);

        assert_eq!(draft.lines()[0].unit_price, dec!(20));
        assert_eq!(draft.total(), dec!(60));
    }

    #[test]
    fn textual_quantities_are_coerced() {
        assert_eq!(parse_quantity("4"), 4);
        assert_eq!(parse_quantity(" 12 "), 12);
        assert_eq!(parse_quantity(""), 1);
        assert_eq!(parse_quantity("two"), 1);
        assert_eq!(parse_quantity("0"), 0);
        assert_eq!(QuantityInput::Text("abc".into()).resolve(), 1);
        assert_eq!(QuantityInput::Number(7).resolve(), 7);
    }

    #[test]
    fn quantity_input_accepts_numbers_and_strings() {
        let n: QuantityInput = serde_json::from_str("3").unwrap();
        let s: QuantityInput = serde_json::from_str("\"3\"").unwrap();
        assert_eq!(n.resolve(), 3);
        assert_eq!(s.resolve(), 3);
    }
}
