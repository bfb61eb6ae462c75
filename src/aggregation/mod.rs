//! Pure transformations from stored rows to dashboard view models.
//!
//! Nothing in here touches the database; services load rows and hand them
//! over, so every grouping and ordering rule can be tested in isolation.

pub mod orders;
pub mod pieces;
pub mod production;
pub mod sales;

use crate::entities::{order, order_item, product, UnitType};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

/// Placeholder name for an item whose product no longer resolves
pub const UNKNOWN_PRODUCT: &str = "Unknown";
/// Category used for items whose product no longer resolves
pub const FALLBACK_CATEGORY: &str = "Others";
/// Baker label for products without one
pub const UNASSIGNED_BAKER: &str = "Unassigned";

/// An order item joined with its product, if the product still exists.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub item: order_item::Model,
    pub product: Option<product::Model>,
}

impl LineItem {
    pub fn new(item: order_item::Model, product: Option<product::Model>) -> Self {
        Self { item, product }
    }

    pub fn order_id(&self) -> Uuid {
        self.item.order_id
    }

    pub fn product_name(&self) -> &str {
        self.product
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or(UNKNOWN_PRODUCT)
    }

    pub fn category(&self) -> &str {
        self.product
            .as_ref()
            .map(|p| p.category.as_str())
            .unwrap_or(FALLBACK_CATEGORY)
    }

    pub fn baker(&self) -> &str {
        match self.product.as_ref().map(|p| p.baker.trim()) {
            Some(baker) if !baker.is_empty() => baker,
            _ => UNASSIGNED_BAKER,
        }
    }

    pub fn unit_type(&self) -> UnitType {
        self.product
            .as_ref()
            .map(|p| p.unit_type)
            .unwrap_or_default()
    }

    pub fn pieces_per_pack(&self) -> Option<i32> {
        self.product.as_ref().and_then(|p| p.pieces_per_pack)
    }

    pub fn total_pieces(&self) -> i64 {
        pieces::total_pieces(self.item.quantity, self.unit_type(), self.pieces_per_pack())
    }
}

/// An order header with all of its items.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderWithItems {
    pub order: order::Model,
    pub items: Vec<LineItem>,
}

/// Normalizes a money amount to two decimal places.
pub fn money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_product_uses_placeholders() {
        let item = line(Uuid::new_v4(), None, 2, dec!(10));
        assert_eq!(item.product_name(), UNKNOWN_PRODUCT);
        assert_eq!(item.category(), FALLBACK_CATEGORY);
        assert_eq!(item.baker(), UNASSIGNED_BAKER);
        assert_eq!(item.unit_type(), UnitType::Piece);
        assert_eq!(item.total_pieces(), 2);
    }

    #[test]
    fn blank_baker_is_unassigned() {
        let p = product("Ensaymada", "Bread", "  ", UnitType::Piece, None, dec!(35));
        let item = line(Uuid::new_v4(), Some(&p), 1, dec!(35));
        assert_eq!(item.baker(), UNASSIGNED_BAKER);
    }

    #[test]
    fn money_has_two_decimal_places() {
        assert_eq!(money(dec!(790)).to_string(), "790.00");
        assert_eq!(money(dec!(12.345)).to_string(), "12.35");
        assert_eq!(money(dec!(0.125)).to_string(), "0.13");
        assert_eq!(money(dec!(-12.345)).to_string(), "-12.35");
        assert_eq!(money(dec!(12.344)).to_string(), "12.34");
    }
}
