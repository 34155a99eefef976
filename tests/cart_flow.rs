//! End-to-end client flows against in-memory gateways.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use quenx_storefront::{
    cart::{CartCommand, CheckoutRejection, OrderRequest, format_money},
    dto::auth::{LoginRequest, RegisterRequest},
    dto::products::ProductInput,
    gateway::{CatalogGateway, GatewayError, OrderGateway, ProductFilter, UserGateway},
    models::{Category, Order, OrderItem, OrderStatus, OrderUser, Product, UserProfile},
    storage::{CART_KEY, DurableStore, MemoryStore, TOKEN_KEY},
    storefront::{CheckoutError, Gateways, Storefront, StorefrontError},
};

const SHOPPER_TOKEN: &str = "shopper-token";
const ADMIN_TOKEN: &str = "admin-token";

fn dec(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn product(name: &str, cents: i64) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price: dec(cents),
        old_price: None,
        image: format!("/images/{name}.jpg"),
        category: Category::Unisex,
        count_in_stock: 10,
        brand: "Stride".into(),
        description: "test sneaker".into(),
        badge: None,
        created_at: Utc::now(),
    }
}

struct FakeCatalog {
    products: HashMap<Uuid, Product>,
}

#[async_trait]
impl CatalogGateway for FakeCatalog {
    async fn fetch_by_id(&self, id: Uuid) -> Result<Product, GatewayError> {
        self.products.get(&id).cloned().ok_or(GatewayError::NotFound)
    }

    async fn fetch_all(&self, filter: &ProductFilter) -> Result<Vec<Product>, GatewayError> {
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        Ok(self.products.values().take(limit).cloned().collect())
    }

    async fn create(&self, _input: &ProductInput, _token: &str) -> Result<Product, GatewayError> {
        Err(GatewayError::Forbidden)
    }

    async fn update(
        &self,
        id: Uuid,
        input: &ProductInput,
        _token: &str,
    ) -> Result<Product, GatewayError> {
        let existing = self.products.get(&id).ok_or(GatewayError::NotFound)?;
        Ok(Product {
            id,
            name: input.name.clone(),
            price: input.price,
            old_price: input.old_price,
            image: input.image.clone(),
            category: input.category,
            count_in_stock: input.count_in_stock,
            brand: input.brand.clone(),
            description: input.description.clone(),
            badge: input.badge.clone(),
            created_at: existing.created_at,
        })
    }

    async fn delete(&self, _id: Uuid, _token: &str) -> Result<String, GatewayError> {
        Ok("Product removed".into())
    }
}

#[derive(Default)]
struct FakeOrders {
    submitted: Mutex<Vec<OrderRequest>>,
    placed: Mutex<Vec<Order>>,
    failure: Option<GatewayError>,
}

#[async_trait]
impl OrderGateway for FakeOrders {
    async fn submit(&self, request: &OrderRequest, _token: &str) -> Result<Order, GatewayError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.submitted.lock().unwrap().push(request.clone());
        let order = Order {
            id: Uuid::new_v4(),
            user: OrderUser {
                id: request.user(),
                name: "Jane".into(),
            },
            items: request
                .items()
                .iter()
                .map(|line| OrderItem {
                    product_id: line.product_id,
                    name: String::new(),
                    quantity: line.quantity as i32,
                    price: line.price,
                })
                .collect(),
            total_amount: request.total_amount(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        self.placed.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn list_mine(&self, _token: &str) -> Result<Vec<Order>, GatewayError> {
        Ok(Vec::new())
    }

    async fn list_all(&self, _token: &str) -> Result<Vec<Order>, GatewayError> {
        Ok(Vec::new())
    }

    async fn fetch_by_id(&self, id: Uuid, _token: &str) -> Result<Order, GatewayError> {
        self.placed
            .lock()
            .unwrap()
            .iter()
            .find(|order| order.id == id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }
}

struct FakeUsers {
    profiles: HashMap<String, UserProfile>,
    outage: Option<GatewayError>,
}

impl FakeUsers {
    fn new() -> Self {
        let shopper = UserProfile {
            id: Uuid::new_v4(),
            name: "Jane".into(),
            email: "jane@quenx.test".into(),
            is_admin: false,
        };
        let admin = UserProfile {
            id: Uuid::new_v4(),
            name: "Admin".into(),
            email: "admin@quenx.test".into(),
            is_admin: true,
        };
        Self {
            profiles: HashMap::from([
                (SHOPPER_TOKEN.to_string(), shopper),
                (ADMIN_TOKEN.to_string(), admin),
            ]),
            outage: None,
        }
    }

    fn unreachable() -> Self {
        Self {
            outage: Some(GatewayError::Transport("connection refused".into())),
            ..Self::new()
        }
    }
}

#[async_trait]
impl UserGateway for FakeUsers {
    async fn profile(&self, token: &str) -> Result<UserProfile, GatewayError> {
        if let Some(err) = &self.outage {
            return Err(err.clone());
        }
        self.profiles
            .get(token)
            .cloned()
            .ok_or(GatewayError::Unauthenticated)
    }

    async fn login(&self, request: &LoginRequest) -> Result<String, GatewayError> {
        self.profiles
            .iter()
            .find(|(_, p)| p.email == request.email)
            .map(|(token, _)| token.clone())
            .ok_or(GatewayError::Unauthenticated)
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<String, GatewayError> {
        Err(GatewayError::Rejected("User already exists".into()))
    }
}

struct Harness {
    storage: Arc<MemoryStore>,
    orders: Arc<FakeOrders>,
    catalog: Arc<FakeCatalog>,
    shoes: Vec<Product>,
}

impl Harness {
    fn new(orders: FakeOrders) -> Self {
        let shoes = vec![product("canvas", 2000), product("runner", 1500)];
        let catalog = FakeCatalog {
            products: shoes.iter().map(|p| (p.id, p.clone())).collect(),
        };
        Self {
            storage: Arc::new(MemoryStore::new()),
            orders: Arc::new(orders),
            catalog: Arc::new(catalog),
            shoes,
        }
    }

    fn sign_in_as(&self, token: &str) {
        self.storage.save(TOKEN_KEY, token).unwrap();
    }

    async fn open(&self) -> Storefront {
        self.open_with(FakeUsers::new()).await
    }

    async fn open_with(&self, users: FakeUsers) -> Storefront {
        let gateways = Gateways {
            catalog: self.catalog.clone(),
            orders: self.orders.clone(),
            users: Arc::new(users),
        };
        Storefront::open(self.storage.clone(), gateways).await
    }

    fn add(&self, index: usize, quantity: u32) -> CartCommand {
        CartCommand::Add {
            product_id: self.shoes[index].id,
            quantity,
        }
    }
}

#[tokio::test]
async fn single_item_below_threshold_pays_shipping() {
    let harness = Harness::new(FakeOrders::default());
    let mut shop = harness.open().await;

    shop.dispatch(harness.add(0, 1)).await.unwrap();

    let summary = shop.cart().summary();
    assert_eq!(summary.subtotal, dec(2000));
    assert_eq!(summary.shipping, dec(500));
    assert_eq!(summary.tax, dec(160));
    assert_eq!(format_money(summary.total), "$26.60");
    assert_eq!(summary.shipping_label(), "$5.00");
}

#[tokio::test]
async fn threshold_crossing_ships_free() {
    let harness = Harness::new(FakeOrders::default());
    let mut shop = harness.open().await;

    shop.dispatch(harness.add(0, 2)).await.unwrap();

    let summary = shop.cart().summary();
    assert_eq!(summary.subtotal, dec(4000));
    assert!(summary.is_free_shipping());
    assert_eq!(summary.shipping_label(), "FREE");
    assert_eq!(format_money(summary.total), "$43.20");
}

#[tokio::test]
async fn adding_twice_merges_and_removing_empties() {
    let harness = Harness::new(FakeOrders::default());
    harness.sign_in_as(SHOPPER_TOKEN);
    let mut shop = harness.open().await;

    shop.dispatch(harness.add(1, 1)).await.unwrap();
    let snapshot = shop.dispatch(harness.add(1, 1)).await.unwrap().unwrap();
    assert_eq!(snapshot.lines.len(), 1);
    assert_eq!(snapshot.item_count, 2);

    let snapshot = shop
        .dispatch(CartCommand::Remove(harness.shoes[1].id))
        .await
        .unwrap()
        .unwrap();
    assert!(snapshot.is_empty());

    let err = shop.checkout().await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Rejected(CheckoutRejection::EmptyCart)
    ));
    assert!(harness.orders.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn decrement_of_single_unit_removes_line() {
    let harness = Harness::new(FakeOrders::default());
    let mut shop = harness.open().await;
    let id = harness.shoes[0].id;

    shop.dispatch(harness.add(0, 1)).await.unwrap();
    let snapshot = shop.dispatch(CartCommand::Decrement(id)).await.unwrap().unwrap();
    assert!(!snapshot.lines.iter().any(|line| line.product_id == id));

    // Absent product is a no-op.
    assert!(shop.dispatch(CartCommand::Increment(id)).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_product_leaves_cart_untouched() {
    let harness = Harness::new(FakeOrders::default());
    let mut shop = harness.open().await;

    let err = shop
        .dispatch(CartCommand::Add {
            product_id: Uuid::new_v4(),
            quantity: 1,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Gateway(GatewayError::NotFound)
    ));
    assert!(shop.cart().cart().is_empty());
}

#[tokio::test]
async fn guest_checkout_asks_for_login_and_keeps_cart() {
    let harness = Harness::new(FakeOrders::default());
    let mut shop = harness.open().await;
    shop.dispatch(harness.add(0, 1)).await.unwrap();

    let err = shop.checkout().await.unwrap_err();
    assert!(err.requires_login());
    assert_eq!(err.to_string(), "Please login to proceed with checkout");
    assert_eq!(shop.cart().cart().item_count(), 1);
}

#[tokio::test]
async fn successful_checkout_submits_snapshot_and_clears_cart() {
    let harness = Harness::new(FakeOrders::default());
    harness.sign_in_as(SHOPPER_TOKEN);
    let mut shop = harness.open().await;
    let user_id = shop.session().user().unwrap().id;

    shop.dispatch(harness.add(0, 1)).await.unwrap();
    shop.dispatch(harness.add(1, 2)).await.unwrap();
    let expected_total = shop.cart().summary().total;

    let order = shop.checkout().await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, expected_total);

    let submitted = harness.orders.submitted.lock().unwrap();
    let request = &submitted[0];
    assert_eq!(request.user(), user_id);
    assert_eq!(request.items().len(), 2);
    assert_eq!(request.items()[0].product_id, harness.shoes[0].id);
    assert_eq!(request.items()[1].quantity, 2);
    assert_eq!(request.total_amount(), expected_total);

    assert!(shop.cart().cart().is_empty());
    assert_eq!(harness.storage.load(CART_KEY).unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn rejected_order_keeps_cart() {
    let harness = Harness::new(FakeOrders {
        failure: Some(GatewayError::Rejected("Insufficient stock for canvas".into())),
        ..Default::default()
    });
    harness.sign_in_as(SHOPPER_TOKEN);
    let mut shop = harness.open().await;
    shop.dispatch(harness.add(0, 3)).await.unwrap();

    let err = shop.checkout().await.unwrap_err();
    assert!(!err.requires_login());
    assert!(matches!(err, CheckoutError::Gateway(GatewayError::Rejected(_))));
    assert_eq!(shop.cart().cart().item_count(), 3);
}

#[tokio::test]
async fn cart_survives_restart() {
    let harness = Harness::new(FakeOrders::default());
    {
        let mut shop = harness.open().await;
        shop.dispatch(harness.add(0, 2)).await.unwrap();
        shop.dispatch(harness.add(1, 1)).await.unwrap();
    }

    let shop = harness.open().await;
    let cart = shop.cart().cart();
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.get(harness.shoes[0].id).unwrap().quantity, 2);
    assert_eq!(cart.lines()[1].product_id, harness.shoes[1].id);
}

#[tokio::test]
async fn subscribers_observe_changes() {
    let harness = Harness::new(FakeOrders::default());
    let mut shop = harness.open().await;
    let mut rx = shop.cart().subscribe();

    shop.dispatch(harness.add(0, 2)).await.unwrap();
    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone();
    assert_eq!(seen.item_count, 2);
    assert_eq!(seen.summary, shop.cart().summary());

    // No-op: nothing to remove.
    shop.dispatch(CartCommand::Remove(harness.shoes[1].id))
        .await
        .unwrap();
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn rejected_credential_is_discarded_on_restore() {
    let harness = Harness::new(FakeOrders::default());
    harness.sign_in_as("stale-token");

    let shop = harness.open().await;
    assert!(shop.session().user().is_none());
    assert_eq!(harness.storage.load(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn login_then_logout_keeps_cart() {
    let harness = Harness::new(FakeOrders::default());
    let mut shop = harness.open().await;
    shop.dispatch(harness.add(0, 1)).await.unwrap();

    let user = shop
        .session_mut()
        .login("jane@quenx.test", "user1234")
        .await
        .unwrap();
    assert_eq!(user.name, "Jane");
    assert_eq!(
        harness.storage.load(TOKEN_KEY).unwrap().as_deref(),
        Some(SHOPPER_TOKEN)
    );

    shop.session_mut().logout().unwrap();
    assert!(shop.session().user().is_none());
    assert_eq!(harness.storage.load(TOKEN_KEY).unwrap(), None);
    assert_eq!(shop.cart().cart().item_count(), 1);
}

#[tokio::test]
async fn dashboard_is_admin_only() {
    let harness = Harness::new(FakeOrders::default());
    harness.sign_in_as(SHOPPER_TOKEN);
    let shop = harness.open().await;
    assert!(matches!(
        shop.dashboard().await,
        Err(StorefrontError::Forbidden)
    ));

    let harness = Harness::new(FakeOrders::default());
    harness.sign_in_as(ADMIN_TOKEN);
    let shop = harness.open().await;
    let dashboard = shop.dashboard().await.unwrap();
    assert_eq!(dashboard.product_count, 2);
    assert_eq!(dashboard.order_count, 0);
    assert_eq!(dashboard.revenue, Decimal::ZERO);
}

#[tokio::test]
async fn transport_failure_at_checkout_keeps_cart() {
    let harness = Harness::new(FakeOrders {
        failure: Some(GatewayError::Transport("connection reset".into())),
        ..Default::default()
    });
    harness.sign_in_as(SHOPPER_TOKEN);
    let mut shop = harness.open().await;
    shop.dispatch(harness.add(0, 1)).await.unwrap();
    shop.dispatch(harness.add(1, 2)).await.unwrap();
    let before = shop.cart().snapshot();

    let err = shop.checkout().await.unwrap_err();
    assert!(!err.requires_login());
    assert!(matches!(err, CheckoutError::Gateway(GatewayError::Transport(_))));

    assert_eq!(shop.cart().snapshot(), before);
    assert_eq!(shop.session().user().map(|u| u.name.as_str()), Some("Jane"));
    assert_eq!(
        harness.storage.load(TOKEN_KEY).unwrap().as_deref(),
        Some(SHOPPER_TOKEN)
    );
    assert!(harness.orders.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_identity_store_keeps_stored_token() {
    let harness = Harness::new(FakeOrders::default());
    harness.sign_in_as(SHOPPER_TOKEN);

    let shop = harness.open_with(FakeUsers::unreachable()).await;
    assert!(shop.session().user().is_none());
    assert_eq!(
        harness.storage.load(TOKEN_KEY).unwrap().as_deref(),
        Some(SHOPPER_TOKEN)
    );

    // Once the store is back the same credential restores the user.
    let shop = harness.open().await;
    assert_eq!(shop.session().user().map(|u| u.name.as_str()), Some("Jane"));
}

#[tokio::test]
async fn featured_returns_at_most_limit() {
    let harness = Harness::new(FakeOrders::default());
    let shop = harness.open().await;

    assert_eq!(shop.featured(1).await.unwrap().len(), 1);
    assert_eq!(shop.featured(4).await.unwrap().len(), 2);
}

#[tokio::test]
async fn placed_order_can_be_fetched_by_id() {
    let harness = Harness::new(FakeOrders::default());
    harness.sign_in_as(SHOPPER_TOKEN);
    let mut shop = harness.open().await;
    shop.dispatch(harness.add(0, 1)).await.unwrap();
    let placed = shop.checkout().await.unwrap();

    let fetched = shop.order(placed.id).await.unwrap();
    assert_eq!(fetched.id, placed.id);
    assert_eq!(fetched.total_amount, placed.total_amount);
    assert_eq!(fetched.items.len(), 1);

    assert!(matches!(
        shop.order(Uuid::new_v4()).await,
        Err(StorefrontError::Gateway(GatewayError::NotFound))
    ));
}

#[tokio::test]
async fn guest_cannot_view_orders() {
    let harness = Harness::new(FakeOrders::default());
    let shop = harness.open().await;
    assert!(matches!(
        shop.order(Uuid::new_v4()).await,
        Err(StorefrontError::Unauthenticated)
    ));
}

fn edited(product: &Product) -> ProductInput {
    ProductInput {
        name: format!("{} v2", product.name),
        price: dec(1800),
        old_price: Some(product.price),
        image: product.image.clone(),
        category: Category::Women,
        count_in_stock: 4,
        brand: product.brand.clone(),
        description: product.description.clone(),
        badge: Some("Sale".into()),
    }
}

#[tokio::test]
async fn admin_can_update_product() {
    let harness = Harness::new(FakeOrders::default());
    harness.sign_in_as(ADMIN_TOKEN);
    let shop = harness.open().await;
    let original = &harness.shoes[0];

    let updated = shop
        .update_product(original.id, &edited(original))
        .await
        .unwrap();
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.name, "canvas v2");
    assert_eq!(updated.price, dec(1800));
    assert_eq!(updated.old_price, Some(dec(2000)));
    assert_eq!(updated.category, Category::Women);
    assert_eq!(updated.badge.as_deref(), Some("Sale"));
}

#[tokio::test]
async fn shoppers_cannot_update_products() {
    let harness = Harness::new(FakeOrders::default());
    harness.sign_in_as(SHOPPER_TOKEN);
    let shop = harness.open().await;
    let original = &harness.shoes[0];

    assert!(matches!(
        shop.update_product(original.id, &edited(original)).await,
        Err(StorefrontError::Forbidden)
    ));
}
