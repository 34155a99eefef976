use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Category, Product};

/// Editable product fields. Used for both create and update; an update
/// replaces every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub old_price: Option<Decimal>,
    pub image: String,
    pub category: Category,
    pub count_in_stock: i32,
    pub brand: String,
    pub description: String,
    #[serde(default)]
    pub badge: Option<String>,
}

impl ProductInput {
    /// Checks the invariants the catalog relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".into());
        }
        if self.price.is_sign_negative() {
            return Err("price must not be negative".into());
        }
        if self.old_price.is_some_and(|p| p.is_sign_negative()) {
            return Err("old price must not be negative".into());
        }
        if self.count_in_stock < 0 {
            return Err("count in stock must not be negative".into());
        }
        Ok(())
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: "Cloud Runner".into(),
            price: Decimal::new(8900, 2),
            old_price: None,
            image: "/images/cloud.jpg".into(),
            category: Category::Unisex,
            count_in_stock: 4,
            brand: "QUENX".into(),
            description: "Light".into(),
            badge: Some("New".into()),
        }
    }

    #[test]
    fn accepts_well_formed_input() {
        assert_eq!(input().validate(), Ok(()));
    }

    #[test]
    fn rejects_negative_amounts_and_blank_name() {
        let mut bad = input();
        bad.price = Decimal::new(-1, 2);
        assert!(bad.validate().is_err());

        let mut bad = input();
        bad.count_in_stock = -1;
        assert!(bad.validate().is_err());

        let mut bad = input();
        bad.name = "  ".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn optional_fields_may_be_omitted() {
        let json = serde_json::json!({
            "name": "Cloud Runner",
            "price": "89.00",
            "image": "/images/cloud.jpg",
            "category": "women",
            "countInStock": 3,
            "brand": "QUENX",
            "description": "Light"
        });
        let parsed: ProductInput = serde_json::from_value(json).expect("parse");
        assert_eq!(parsed.old_price, None);
        assert_eq!(parsed.category, Category::Women);
    }
}
