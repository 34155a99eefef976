//! The client application: routes UI commands to the cart, runs checkout and
//! backs the catalog and admin views.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    cart::{
        CartCommand, CartSnapshot, CartStore, CheckoutRejection, InputError, build_order_request,
        store::QuantityDelta,
    },
    dto::products::ProductInput,
    gateway::{
        ApiClient, CatalogGateway, GatewayError, HttpCatalogGateway, HttpOrderGateway,
        HttpUserGateway, OrderGateway, ProductFilter, UserGateway,
    },
    models::{Order, Product},
    session::Session,
    storage::DurableStore,
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Rejected(#[from] CheckoutRejection),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl CheckoutError {
    pub fn requires_login(&self) -> bool {
        match self {
            CheckoutError::Rejected(rejection) => rejection.requires_login(),
            CheckoutError::Gateway(err) => *err == GatewayError::Unauthenticated,
        }
    }
}

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Please login first")]
    Unauthenticated,

    #[error("Admin access required")]
    Forbidden,
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub product_count: usize,
    pub order_count: usize,
    pub revenue: Decimal,
}

impl Dashboard {
    pub fn from_lists(products: &[Product], orders: &[Order]) -> Self {
        Self {
            product_count: products.len(),
            order_count: orders.len(),
            revenue: orders.iter().map(|order| order.total_amount).sum(),
        }
    }
}

#[derive(Clone)]
pub struct Gateways {
    pub catalog: Arc<dyn CatalogGateway>,
    pub orders: Arc<dyn OrderGateway>,
    pub users: Arc<dyn UserGateway>,
}

impl Gateways {
    pub fn http(api: ApiClient) -> Self {
        Self {
            catalog: Arc::new(HttpCatalogGateway::new(api.clone())),
            orders: Arc::new(HttpOrderGateway::new(api.clone())),
            users: Arc::new(HttpUserGateway::new(api)),
        }
    }
}

pub struct Storefront {
    cart: CartStore,
    session: Session,
    catalog: Arc<dyn CatalogGateway>,
    orders: Arc<dyn OrderGateway>,
}

impl Storefront {
    /// Restores the cart and the session from `storage`.
    pub async fn open(storage: Arc<dyn DurableStore>, gateways: Gateways) -> Self {
        let cart = CartStore::restore(storage.clone());
        let session = Session::restore(storage, gateways.users).await;
        Self {
            cart,
            session,
            catalog: gateways.catalog,
            orders: gateways.orders,
        }
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Applies one cart command. Returns `None` when the command did not
    /// change the cart (the product was not in it).
    pub async fn dispatch(
        &mut self,
        command: CartCommand,
    ) -> Result<Option<CartSnapshot>, StorefrontError> {
        let snapshot = match command {
            CartCommand::Add {
                product_id,
                quantity,
            } => {
                let product = self.catalog.fetch_by_id(product_id).await?;
                Some(self.cart.add(&product, quantity))
            }
            CartCommand::Increment(id) => self.cart.update_quantity(id, QuantityDelta::Increment),
            CartCommand::Decrement(id) => self.cart.update_quantity(id, QuantityDelta::Decrement),
            CartCommand::Remove(id) => self.cart.remove(id),
            CartCommand::Clear => Some(self.cart.clear()),
        };
        Ok(snapshot)
    }

    /// Submits the cart as an order. The cart is cleared only once the order
    /// store has accepted the order.
    pub async fn checkout(&mut self) -> Result<Order, CheckoutError> {
        let request = build_order_request(self.cart.cart(), self.session.user())?;
        let token = self
            .session
            .token()
            .ok_or(CheckoutRejection::Unauthenticated)?;

        let order = self.orders.submit(&request, token).await?;
        tracing::info!(order_id = %order.id, total = %order.total_amount, "order placed");
        self.cart.clear();
        Ok(order)
    }

    pub async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StorefrontError> {
        Ok(self.catalog.fetch_all(filter).await?)
    }

    pub async fn featured(&self, limit: u64) -> Result<Vec<Product>, StorefrontError> {
        Ok(self.catalog.fetch_featured(limit).await?)
    }

    pub async fn product(&self, id: Uuid) -> Result<Product, StorefrontError> {
        Ok(self.catalog.fetch_by_id(id).await?)
    }

    pub async fn my_orders(&self) -> Result<Vec<Order>, StorefrontError> {
        Ok(self.orders.list_mine(self.token()?).await?)
    }

    pub async fn order(&self, id: Uuid) -> Result<Order, StorefrontError> {
        Ok(self.orders.fetch_by_id(id, self.token()?).await?)
    }

    /// All orders. Authorization is left to the order store.
    pub async fn all_orders(&self) -> Result<Vec<Order>, StorefrontError> {
        Ok(self.orders.list_all(self.token()?).await?)
    }

    pub async fn dashboard(&self) -> Result<Dashboard, StorefrontError> {
        let token = self.admin_token()?;
        let everything = ProductFilter::default();
        let (products, orders) = tokio::join!(
            self.catalog.fetch_all(&everything),
            self.orders.list_all(token)
        );
        Ok(Dashboard::from_lists(&products?, &orders?))
    }

    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, StorefrontError> {
        Ok(self.catalog.create(input, self.admin_token()?).await?)
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        input: &ProductInput,
    ) -> Result<Product, StorefrontError> {
        Ok(self.catalog.update(id, input, self.admin_token()?).await?)
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<String, StorefrontError> {
        Ok(self.catalog.delete(id, self.admin_token()?).await?)
    }

    fn token(&self) -> Result<&str, StorefrontError> {
        self.session.token().ok_or(StorefrontError::Unauthenticated)
    }

    fn admin_token(&self) -> Result<&str, StorefrontError> {
        let token = self.token()?;
        if !self.session.is_admin() {
            return Err(StorefrontError::Forbidden);
        }
        Ok(token)
    }
}
