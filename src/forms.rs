//! Admin form input, parsed and validated before it reaches a gateway.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{cart::InputError, dto::products::ProductInput, models::Category};

/// Raw text of the add/edit product form. Empty optional fields mean "none".
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub old_price: String,
    pub image: String,
    pub category: String,
    pub count_in_stock: String,
    pub brand: String,
    pub description: String,
    pub badge: String,
}

impl ProductForm {
    pub fn parse(&self) -> Result<ProductInput, InputError> {
        let price = parse_amount("price", required("price", &self.price)?)?;
        let old_price = optional(&self.old_price)
            .map(|raw| parse_amount("old_price", raw))
            .transpose()?;
        let category = Category::from_str(required("category", &self.category)?)
            .map_err(|reason| InputError::InvalidField {
                field: "category",
                reason,
            })?;
        let count_in_stock = required("count_in_stock", &self.count_in_stock)?
            .parse::<i32>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| InputError::InvalidField {
                field: "count_in_stock",
                reason: "expected a whole number of 0 or more".into(),
            })?;

        Ok(ProductInput {
            name: required("name", &self.name)?.to_string(),
            price,
            old_price,
            image: required("image", &self.image)?.to_string(),
            category,
            count_in_stock,
            brand: required("brand", &self.brand)?.to_string(),
            description: required("description", &self.description)?.to_string(),
            badge: optional(&self.badge).map(str::to_string),
        })
    }
}

fn required<'a>(field: &'static str, raw: &'a str) -> Result<&'a str, InputError> {
    optional(raw).ok_or(InputError::Missing(field))
}

fn optional(raw: &str) -> Option<&str> {
    Some(raw.trim()).filter(|s| !s.is_empty())
}

fn parse_amount(field: &'static str, raw: &str) -> Result<Decimal, InputError> {
    let value = Decimal::from_str(raw).map_err(|_| InputError::InvalidField {
        field,
        reason: format!("`{raw}` is not a decimal amount"),
    })?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(InputError::InvalidField {
            field,
            reason: "must not be negative".into(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "Trail Vegan High".into(),
            price: "120.50".into(),
            old_price: String::new(),
            image: "/images/trail.jpg".into(),
            category: "Men".into(),
            count_in_stock: "7".into(),
            brand: "QUENX".into(),
            description: "Grippy".into(),
            badge: " ".into(),
        }
    }

    #[test]
    fn parses_typed_input() {
        let input = form().parse().expect("valid form");
        assert_eq!(input.price, Decimal::new(12050, 2));
        assert_eq!(input.category, Category::Men);
        assert_eq!(input.count_in_stock, 7);
        assert_eq!(input.old_price, None);
        assert_eq!(input.badge, None);
    }

    #[test]
    fn rejects_bad_numbers() {
        let mut bad = form();
        bad.price = "12,50".into();
        assert!(matches!(bad.parse(), Err(InputError::InvalidField { field: "price", .. })));

        let mut bad = form();
        bad.price = "-1".into();
        assert!(matches!(bad.parse(), Err(InputError::InvalidField { field: "price", .. })));

        let mut bad = form();
        bad.count_in_stock = "3.5".into();
        assert!(matches!(
            bad.parse(),
            Err(InputError::InvalidField { field: "count_in_stock", .. })
        ));
    }

    #[test]
    fn rejects_missing_and_unknown_fields() {
        let mut bad = form();
        bad.brand = String::new();
        assert_eq!(bad.parse().unwrap_err(), InputError::Missing("brand"));

        let mut bad = form();
        bad.category = "kids".into();
        assert!(matches!(bad.parse(), Err(InputError::InvalidField { field: "category", .. })));
    }
}
