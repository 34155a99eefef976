use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::{Cart, summarize};
use crate::models::UserProfile;

/// Why a cart could not be turned into an order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckoutRejection {
    #[error("Please login to proceed with checkout")]
    Unauthenticated,

    #[error("Your cart is empty")]
    EmptyCart,
}

impl CheckoutRejection {
    /// The caller should send the user to the login flow.
    pub fn requires_login(&self) -> bool {
        matches!(self, CheckoutRejection::Unauthenticated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequestLine {
    pub product_id: Uuid,
    pub quantity: u32,
    pub price: Decimal,
}

/// Immutable order payload. Only [`build_order_request`] creates one, so a
/// value of this type always has a user and at least one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    user: Uuid,
    items: Vec<OrderRequestLine>,
    total_amount: Decimal,
}

impl OrderRequest {
    pub fn user(&self) -> Uuid {
        self.user
    }

    pub fn items(&self) -> &[OrderRequestLine] {
        &self.items
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }
}

/// Validates checkout preconditions (user first, then cart contents) and
/// snapshots the cart into an order request.
pub fn build_order_request(
    cart: &Cart,
    current_user: Option<&UserProfile>,
) -> Result<OrderRequest, CheckoutRejection> {
    let user = current_user.ok_or(CheckoutRejection::Unauthenticated)?;
    if cart.is_empty() {
        return Err(CheckoutRejection::EmptyCart);
    }

    let items = cart
        .lines()
        .iter()
        .map(|line| OrderRequestLine {
            product_id: line.product_id,
            quantity: line.quantity,
            price: line.price,
        })
        .collect();

    Ok(OrderRequest {
        user: user.id,
        items,
        total_amount: summarize(cart).total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;

    fn shopper() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            is_admin: false,
        }
    }

    fn cart_with(lines: &[(i64, u32)]) -> Cart {
        Cart::normalized(
            lines
                .iter()
                .map(|&(cents, quantity)| CartLine {
                    product_id: Uuid::new_v4(),
                    name: "item".into(),
                    price: Decimal::new(cents, 2),
                    image: String::new(),
                    quantity,
                })
                .collect(),
        )
    }

    #[test]
    fn missing_user_is_checked_first() {
        let rejection = build_order_request(&Cart::new(), None).unwrap_err();
        assert_eq!(rejection, CheckoutRejection::Unauthenticated);
        assert!(rejection.requires_login());

        let rejection = build_order_request(&cart_with(&[(2000, 1)]), None).unwrap_err();
        assert_eq!(rejection, CheckoutRejection::Unauthenticated);
    }

    #[test]
    fn empty_cart_is_rejected_for_signed_in_user() {
        let user = shopper();
        let rejection = build_order_request(&Cart::new(), Some(&user)).unwrap_err();
        assert_eq!(rejection, CheckoutRejection::EmptyCart);
        assert!(!rejection.requires_login());
    }

    #[test]
    fn request_snapshots_lines_and_total() {
        let user = shopper();
        let cart = cart_with(&[(2000, 1), (1500, 2)]);
        let request = build_order_request(&cart, Some(&user)).expect("valid request");

        assert_eq!(request.user(), user.id);
        assert_eq!(request.items().len(), 2);
        assert_eq!(request.items()[1].quantity, 2);
        assert_eq!(request.items()[1].price, Decimal::new(1500, 2));
        // 50.00 subtotal, free shipping, 4.00 tax
        assert_eq!(request.total_amount(), Decimal::new(5400, 2));
    }

    #[test]
    fn request_serializes_camel_case() {
        let user = shopper();
        let request = build_order_request(&cart_with(&[(2000, 1)]), Some(&user)).expect("valid");
        let json = serde_json::to_value(&request).expect("json");
        assert!(json.get("totalAmount").is_some());
        assert!(json["items"][0].get("productId").is_some());
    }
}
