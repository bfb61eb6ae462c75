pub mod order;
pub mod order_item;
pub mod product;

pub use product::UnitType;
