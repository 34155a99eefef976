use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use super::{Cart, CartLine, PriceSummary, summarize};
use crate::{
    models::Product,
    storage::{CART_KEY, DurableStore},
};

/// What subscribers see after each change: the lines, the badge count and the
/// freshly derived totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub item_count: u32,
    pub summary: PriceSummary,
}

impl CartSnapshot {
    fn of(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().to_vec(),
            item_count: cart.item_count(),
            summary: summarize(cart),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityDelta {
    Increment,
    Decrement,
}

impl QuantityDelta {
    fn as_i64(self) -> i64 {
        match self {
            QuantityDelta::Increment => 1,
            QuantityDelta::Decrement => -1,
        }
    }
}

/// Owns the session cart. Every effective mutation is written to durable
/// storage before the method returns and is then published to subscribers.
pub struct CartStore {
    cart: Cart,
    storage: Arc<dyn DurableStore>,
    notifier: watch::Sender<CartSnapshot>,
}

impl CartStore {
    /// Loads the persisted cart, falling back to an empty one when nothing is
    /// stored or the stored value cannot be read.
    pub fn restore(storage: Arc<dyn DurableStore>) -> Self {
        let cart = match storage.load(CART_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartLine>>(&raw) {
                Ok(lines) => Cart::normalized(lines),
                Err(err) => {
                    tracing::warn!(error = %err, "stored cart is malformed, starting empty");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read stored cart, starting empty");
                Cart::new()
            }
        };
        tracing::debug!(lines = cart.len(), "cart restored");

        let (notifier, _) = watch::channel(CartSnapshot::of(&cart));
        Self {
            cart,
            storage,
            notifier,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::of(&self.cart)
    }

    pub fn summary(&self) -> PriceSummary {
        summarize(&self.cart)
    }

    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.notifier.subscribe()
    }

    /// Adds `quantity` units of `product`, merging into an existing line.
    /// A zero quantity leaves the cart, storage and subscribers untouched.
    pub fn add(&mut self, product: &Product, quantity: u32) -> CartSnapshot {
        if !self.cart.add(product, quantity) {
            return self.snapshot();
        }
        tracing::debug!(product_id = %product.id, quantity, "cart add");
        self.commit()
    }

    /// Returns `None` when the product is not in the cart.
    pub fn update_quantity(
        &mut self,
        product_id: Uuid,
        delta: QuantityDelta,
    ) -> Option<CartSnapshot> {
        if !self.cart.adjust(product_id, delta.as_i64()) {
            return None;
        }
        tracing::debug!(%product_id, ?delta, "cart quantity updated");
        Some(self.commit())
    }

    /// Returns `None` when the product is not in the cart.
    pub fn remove(&mut self, product_id: Uuid) -> Option<CartSnapshot> {
        if !self.cart.remove(product_id) {
            return None;
        }
        tracing::debug!(%product_id, "cart line removed");
        Some(self.commit())
    }

    pub fn clear(&mut self) -> CartSnapshot {
        self.cart.clear();
        tracing::debug!("cart cleared");
        self.commit()
    }

    fn commit(&mut self) -> CartSnapshot {
        self.persist();
        let snapshot = CartSnapshot::of(&self.cart);
        self.notifier.send_replace(snapshot.clone());
        snapshot
    }

    fn persist(&self) {
        let raw = match serde_json::to_string(&self.cart) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "could not serialize cart");
                return;
            }
        };
        if let Err(err) = self.storage.save(CART_KEY, &raw) {
            tracing::warn!(error = %err, "could not persist cart");
        }
    }
}
