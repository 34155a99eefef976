use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    cart::PriceSummary,
    dto::orders::{CreateOrderRequest, OrderList},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderItem, OrderStatus, OrderUser},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Largest unit price a `NUMERIC(12,2)` column holds.
const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Checks the request on its own, before any product is looked at.
fn validate_request(user: &AuthUser, payload: &CreateOrderRequest) -> AppResult<()> {
    if payload.user.is_some_and(|id| id != user.user_id) {
        return Err(AppError::Forbidden("Cannot place an order for another user"));
    }
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("No order items".into()));
    }

    let mut seen = HashSet::new();
    for item in &payload.items {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest("Order has invalid quantity".into()));
        }
        if item.price.is_sign_negative() || item.price > MAX_UNIT_PRICE {
            return Err(AppError::BadRequest("Order has invalid price".into()));
        }
        if !seen.insert(item.product_id) {
            return Err(AppError::BadRequest(format!(
                "Product {} appears more than once",
                item.product_id
            )));
        }
    }

    let expected = PriceSummary::checked_from_lines(
        payload
            .items
            .iter()
            .map(|item| (item.price, item.quantity as u32)),
    )
    .ok_or_else(|| AppError::BadRequest("Order total is out of range".into()))?
    .total;
    if expected != payload.total_amount {
        return Err(AppError::BadRequest(format!(
            "Order total {} does not match its items ({expected})",
            payload.total_amount
        )));
    }
    Ok(())
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    validate_request(user, &payload)?;

    let txn = state.orm.begin().await?;

    let ids: Vec<Uuid> = payload.items.iter().map(|item| item.product_id).collect();
    let products: HashMap<Uuid, _> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    for item in &payload.items {
        let product = products.get(&item.product_id).ok_or_else(|| {
            AppError::BadRequest(format!("Product {} not found", item.product_id))
        })?;
        if product.price != item.price {
            return Err(AppError::BadRequest(format!(
                "Price of {} has changed",
                product.name
            )));
        }
        if product.count_in_stock < item.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        total_amount: Set(payload.total_amount),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        let name = products
            .get(&line.product_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            name: Set(name),
            quantity: Set(line.quantity),
            price: Set(line.price),
        }
        .insert(&txn)
        .await?;
        items.push(item);

        Products::update_many()
            .col_expr(
                ProdCol::CountInStock,
                Expr::col(ProdCol::CountInStock).sub(line.quantity),
            )
            .filter(ProdCol::Id.eq(line.product_id))
            .exec(&txn)
            .await?;
    }

    let customer = order_user(&txn, user.user_id).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, user_id = %user.user_id, total = %order.total_amount, "order created");
    Ok(ApiResponse::success(
        "Order created",
        order_from_entity(order, customer, items)?,
        Some(Meta::empty()),
    ))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderList>> {
    let models = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = hydrate(&state.orm, models).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let models = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = hydrate(&state.orm, models).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

/// Visible to the order's owner and to admins.
pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let model = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    if model.user_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden("Not authorized to view this order"));
    }

    let mut orders = hydrate(&state.orm, vec![model]).await?;
    let order = orders.pop().ok_or(AppError::NotFound("Order"))?;
    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

async fn order_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<OrderUser> {
    let user = Users::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(OrderUser {
        id: user.id,
        name: user.name,
    })
}

/// Attaches items and customer names to order rows, keeping their order.
async fn hydrate<C: ConnectionTrait>(conn: &C, models: Vec<OrderModel>) -> AppResult<Vec<Order>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = models.iter().map(|o| o.id).collect();
    let user_ids: Vec<Uuid> = models
        .iter()
        .map(|o| o.user_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let mut items_by_order: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
    for item in OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .all(conn)
        .await?
    {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    let users: HashMap<Uuid, OrderUser> = Users::find()
        .filter(UserCol::Id.is_in(user_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|u| (u.id, OrderUser { id: u.id, name: u.name }))
        .collect();

    models
        .into_iter()
        .map(|model| {
            let customer = users.get(&model.user_id).cloned().unwrap_or(OrderUser {
                id: model.user_id,
                name: String::new(),
            });
            let items = items_by_order.remove(&model.id).unwrap_or_default();
            order_from_entity(model, customer, items)
        })
        .collect()
}

fn order_from_entity(
    model: OrderModel,
    user: OrderUser,
    items: Vec<OrderItemModel>,
) -> AppResult<Order> {
    let status = model
        .status
        .parse::<OrderStatus>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(Order {
        id: model.id,
        user,
        items: items.into_iter().map(order_item_from_entity).collect(),
        total_amount: model.total_amount,
        status,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        product_id: model.product_id,
        name: model.name,
        quantity: model.quantity,
        price: model.price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::orders::OrderLineRequest;

    fn shopper() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: "user".into(),
        }
    }

    fn request(lines: &[(i64, i32)], total_cents: i64) -> CreateOrderRequest {
        CreateOrderRequest {
            user: None,
            items: lines
                .iter()
                .map(|&(cents, quantity)| OrderLineRequest {
                    product_id: Uuid::new_v4(),
                    quantity,
                    price: Decimal::new(cents, 2),
                })
                .collect(),
            total_amount: Decimal::new(total_cents, 2),
        }
    }

    #[test]
    fn accepts_consistent_request() {
        assert!(validate_request(&shopper(), &request(&[(2000, 1)], 2660)).is_ok());
    }

    #[test]
    fn rejects_empty_orders() {
        let err = validate_request(&shopper(), &request(&[], 500)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn rejects_total_mismatch() {
        let err = validate_request(&shopper(), &request(&[(4000, 1)], 4000)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn price_ceiling_matches_column_precision() {
        assert_eq!(MAX_UNIT_PRICE, Decimal::new(999_999_999_999, 2));
    }

    #[test]
    fn rejects_out_of_range_prices() {
        let mut huge = request(&[(2000, 2)], 0);
        huge.items[0].price = Decimal::MAX;
        let err = validate_request(&shopper(), &huge).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = validate_request(&shopper(), &request(&[(-2000, 1)], 500)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn huge_quantities_at_the_price_ceiling_do_not_overflow() {
        let mut lines = request(&[(0, i32::MAX), (0, i32::MAX)], 0);
        for item in &mut lines.items {
            item.price = MAX_UNIT_PRICE;
        }
        let err = validate_request(&shopper(), &lines).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let err = validate_request(&shopper(), &request(&[(2000, 0)], 500)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn rejects_orders_for_someone_else() {
        let mut payload = request(&[(2000, 1)], 2660);
        payload.user = Some(Uuid::new_v4());
        assert!(matches!(
            validate_request(&shopper(), &payload),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn rejects_repeated_products() {
        let mut payload = request(&[(1000, 1), (1000, 1)], 2660);
        payload.items[1].product_id = payload.items[0].product_id;
        assert!(matches!(
            validate_request(&shopper(), &payload),
            Err(AppError::BadRequest(_))
        ));
    }
}
