pub mod common;
pub mod menu;
pub mod orders;
pub mod production;
pub mod products;
pub mod sales;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
