use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::Cart;

/// Orders with a subtotal strictly above this ship for free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(3500, 0, 0, false, 2);
/// Shipping charged at or below the threshold.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(500, 0, 0, false, 2);
/// Applied to the subtotal only; shipping is not taxed.
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Derived totals for a set of priced lines. Values are exact; rounding only
/// happens in [`format_money`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl PriceSummary {
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let shipping = shipping_for(subtotal);
        let tax = subtotal * TAX_RATE;
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    /// Summarizes `(unit price, quantity)` pairs.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (Decimal, u32)>,
    {
        let subtotal = lines
            .into_iter()
            .map(|(price, quantity)| price * Decimal::from(quantity))
            .sum();
        Self::from_subtotal(subtotal)
    }

    /// Like [`PriceSummary::from_lines`], but returns `None` instead of
    /// overflowing on untrusted input.
    pub fn checked_from_lines<I>(lines: I) -> Option<Self>
    where
        I: IntoIterator<Item = (Decimal, u32)>,
    {
        let subtotal = lines.into_iter().try_fold(Decimal::ZERO, |acc, (price, quantity)| {
            acc.checked_add(price.checked_mul(Decimal::from(quantity))?)
        })?;
        let shipping = shipping_for(subtotal);
        let tax = subtotal.checked_mul(TAX_RATE)?;
        let total = subtotal.checked_add(shipping)?.checked_add(tax)?;
        Some(Self {
            subtotal,
            shipping,
            tax,
            total,
        })
    }

    pub fn is_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }

    pub fn shipping_label(&self) -> String {
        if self.is_free_shipping() {
            "FREE".to_string()
        } else {
            format_money(self.shipping)
        }
    }
}

fn shipping_for(subtotal: Decimal) -> Decimal {
    if subtotal > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING
    }
}

pub fn summarize(cart: &Cart) -> PriceSummary {
    PriceSummary::from_lines(
        cart.lines()
            .iter()
            .map(|line| (line.price, line.quantity)),
    )
}

/// Renders an amount for display, e.g. `$26.60`.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}
