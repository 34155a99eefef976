//! Session-owned shopping cart: the line model, pricing, the persisted store,
//! order assembly and the command parsing that feeds them.

pub mod assembler;
pub mod command;
pub mod pricing;
pub mod store;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Product;

pub use assembler::{CheckoutRejection, OrderRequest, OrderRequestLine, build_order_request};
pub use command::{CartCommand, InputError, parse_product_id, parse_quantity};
pub use pricing::{PriceSummary, format_money, summarize};
pub use store::{CartSnapshot, CartStore, QuantityDelta};

/// One product's entry in the cart. Name, price and image are captured when
/// the product is first added and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
}

impl CartLine {
    fn snapshot(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Ordered collection of cart lines, at most one per product.
///
/// Every line held here has a quantity of at least one; operations that would
/// bring a line to zero delete it instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn get(&self, product_id: Uuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    pub fn contains(&self, product_id: Uuid) -> bool {
        self.get(product_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total number of units across all lines, shown on the cart badge.
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Returns `false` when nothing was added (zero quantity).
    pub(crate) fn add(&mut self, product: &Product, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        match self.lines.iter_mut().find(|line| line.product_id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine::snapshot(product, quantity)),
        }
        true
    }

    /// Applies `delta` to the line's quantity. Returns `false` when the product
    /// is not in the cart.
    pub(crate) fn adjust(&mut self, product_id: Uuid, delta: i64) -> bool {
        let Some(index) = self.position(product_id) else {
            return false;
        };
        let next = i64::from(self.lines[index].quantity) + delta;
        if next <= 0 {
            self.lines.remove(index);
        } else {
            self.lines[index].quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
        true
    }

    pub(crate) fn remove(&mut self, product_id: Uuid) -> bool {
        match self.position(product_id) {
            Some(index) => {
                self.lines.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
    }

    /// Drops lines that could not have been produced by the cart operations:
    /// zero quantities and repeated product ids (later duplicates are merged
    /// into the first occurrence).
    pub(crate) fn normalized(lines: Vec<CartLine>) -> Self {
        let mut cart = Cart::new();
        for line in lines.into_iter().filter(|line| line.quantity > 0) {
            match cart
                .lines
                .iter_mut()
                .find(|existing| existing.product_id == line.product_id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity)
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }

    fn position(&self, product_id: Uuid) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id == product_id)
    }
}
