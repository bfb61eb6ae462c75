use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::product::{self, UnitType};
use crate::errors::ServiceError;
use crate::repositories::ProductRepository;

/// Product as shown on the menu and in the catalog admin
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub unit_type: UnitType,
    pub pieces_per_pack: Option<i32>,
    pub is_active: bool,
    pub baker: String,
}

impl From<&product::Model> for ProductView {
    fn from(p: &product::Model) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            category: p.category.clone(),
            price: crate::aggregation::money(p.price),
            unit_type: p.unit_type,
            pieces_per_pack: p.pieces_per_pack,
            is_active: p.is_active,
            baker: p.baker.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MenuCategory {
    pub category: String,
    pub products: Vec<ProductView>,
}

/// Request body for adding a product to the catalog
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 120), custom = "not_blank")]
    pub name: String,
    #[validate(length(min = 1, max = 60), custom = "not_blank")]
    pub category: String,
    #[validate(custom = "valid_price")]
    pub price: Decimal,
    #[serde(default)]
    pub unit_type: UnitType,
    #[validate(range(min = 1, max = 1000))]
    pub pieces_per_pack: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 60))]
    pub baker: String,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProductChanges {
    #[validate(length(min = 1, max = 120), custom = "not_blank")]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 60), custom = "not_blank")]
    pub category: Option<String>,
    #[validate(custom = "valid_price")]
    pub price: Option<Decimal>,
    pub unit_type: Option<UnitType>,
    #[validate(range(min = 1, max = 1000))]
    pub pieces_per_pack: Option<i32>,
    #[validate(length(max = 60))]
    pub baker: Option<String>,
    pub is_active: Option<bool>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Prices are whole cents and never below zero.
fn valid_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("negative_price"));
    }
    if price.normalize().scale() > 2 {
        return Err(ValidationError::new("price_precision"));
    }
    Ok(())
}

/// Packs need a positive pack size; pieces never carry one.
fn pack_size(unit_type: UnitType, pieces_per_pack: Option<i32>) -> Result<Option<i32>, ServiceError> {
    match unit_type {
        UnitType::Pack => match pieces_per_pack {
            Some(n) if n >= 1 => Ok(Some(n)),
            _ => Err(ServiceError::ValidationError(
                "pieces_per_pack is required for pack products".to_string(),
            )),
        },
        UnitType::Piece => Ok(None),
    }
}

/// Groups products already ordered by category then name.
pub fn group_menu(products: &[product::Model]) -> Vec<MenuCategory> {
    let mut menu: Vec<MenuCategory> = Vec::new();
    for p in products {
        match menu.last_mut() {
            Some(group) if group.category == p.category => group.products.push(p.into()),
            _ => menu.push(MenuCategory {
                category: p.category.clone(),
                products: vec![p.into()],
            }),
        }
    }
    menu
}

/// Service for the product catalog
pub struct CatalogService {
    products: ProductRepository,
}

impl CatalogService {
    pub fn new(products: ProductRepository) -> Self {
        Self { products }
    }

    /// Active products grouped by category for the order form picker
    #[instrument(skip(self))]
    pub async fn menu(&self) -> Result<Vec<MenuCategory>, ServiceError> {
        let products = self.products.find_all(false).await.map_err(|e| {
            error!(error = %e, "Failed to load menu");
            e
        })?;
        Ok(group_menu(&products))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<ProductView>, ServiceError> {
        let products = self.products.find_all(include_inactive).await.map_err(|e| {
            error!(error = %e, "Failed to list products");
            e
        })?;
        Ok(products.iter().map(ProductView::from).collect())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: NewProduct) -> Result<ProductView, ServiceError> {
        input.validate()?;
        let pieces_per_pack = pack_size(input.unit_type, input.pieces_per_pack)?;

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            category: Set(input.category.trim().to_string()),
            price: Set(input.price),
            unit_type: Set(input.unit_type),
            pieces_per_pack: Set(pieces_per_pack),
            is_active: Set(true),
            baker: Set(input.baker.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = self.products.create(model).await.map_err(|e| {
            error!(error = %e, "Failed to create product");
            e
        })?;

        info!(product_id = %created.id, category = %created.category, "Product created");
        Ok(ProductView::from(&created))
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<ProductView, ServiceError> {
        changes.validate()?;
        let existing = self.find(id).await?;

        let unit_type = changes.unit_type.unwrap_or(existing.unit_type);
        let pieces_per_pack =
            pack_size(unit_type, changes.pieces_per_pack.or(existing.pieces_per_pack))?;

        let mut active = existing.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(category) = changes.category {
            active.category = Set(category.trim().to_string());
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(baker) = changes.baker {
            active.baker = Set(baker.trim().to_string());
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.unit_type = Set(unit_type);
        active.pieces_per_pack = Set(pieces_per_pack);

        let updated = self.products.update(active).await?;
        info!(product_id = %updated.id, "Product updated");
        Ok(ProductView::from(&updated))
    }

    /// Hides a product from the menu; existing order lines keep referencing it.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: Uuid) -> Result<ProductView, ServiceError> {
        let existing = self.find(id).await?;
        if !existing.is_active {
            return Ok(ProductView::from(&existing));
        }

        let mut active = existing.into_active_model();
        active.is_active = Set(false);
        let updated = self.products.update(active).await?;
        info!(product_id = %updated.id, "Product deactivated");
        Ok(ProductView::from(&updated))
    }

    async fn find(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::fixtures;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn menu_groups_consecutive_categories() {
        let products = vec![
            fixtures::product("Pandesal", "Bread", "Anna", UnitType::Pack, Some(10), dec!(50)),
            fixtures::product("Spanish Bread", "Bread", "Anna", UnitType::Piece, None, dec!(15)),
            fixtures::product("Ube Roll", "Cake", "Nicole", UnitType::Piece, None, dec!(250)),
        ];

        let menu = group_menu(&products);
        assert_eq!(menu.len(), 2);
        assert_eq!(menu[0].category, "Bread");
        assert_eq!(menu[0].products.len(), 2);
        assert_eq!(menu[1].products[0].name, "Ube Roll");
    }

    #[test]
    fn pack_products_need_a_pack_size() {
        assert_matches!(
            pack_size(UnitType::Pack, None),
            Err(ServiceError::ValidationError(_))
        );
        assert_eq!(pack_size(UnitType::Pack, Some(6)).unwrap(), Some(6));
        assert_eq!(pack_size(UnitType::Piece, Some(6)).unwrap(), None);
    }

    #[test]
    fn new_product_rejects_blank_name_and_negative_price() {
        let input = NewProduct {
            name: "   ".into(),
            category: "Bread".into(),
            price: dec!(-1),
            unit_type: UnitType::Piece,
            pieces_per_pack: None,
            baker: String::new(),
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
    }

    #[test]
    fn prices_are_limited_to_cents() {
        assert!(valid_price(&dec!(270.00)).is_ok());
        assert!(valid_price(&dec!(12.5)).is_ok());
        assert!(valid_price(&dec!(40.000)).is_ok());
        assert!(valid_price(&dec!(0.125)).is_err());

        let changes = ProductChanges {
            price: Some(dec!(99.999)),
            ..Default::default()
        };
        assert!(changes.validate().unwrap_err().field_errors().contains_key("price"));
    }
}
