use std::str::FromStr;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::{
    dto::products::{ProductInput, ProductList},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Product},
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let mut condition = Condition::all();
    if let Some(category) = query.category {
        condition = condition.add(Column::Category.eq(category.as_str()));
    }

    let mut finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt)
        .order_by_asc(Column::Name);
    let limit = query.normalized_limit();
    if let Some(limit) = limit {
        finder = finder.limit(limit);
    }

    let items = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(limit, items.len() as u64);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let model = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    Ok(ApiResponse::success("Product", product_from_entity(model)?, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: ProductInput,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate().map_err(AppError::BadRequest)?;

    let mut active = ActiveModel {
        id: Set(Uuid::new_v4()),
        created_by: Set(Some(user.user_id)),
        created_at: NotSet,
        ..Default::default()
    };
    apply_input(&mut active, payload);
    let product = active.insert(&state.orm).await?;
    tracing::info!(product_id = %product.id, user_id = %user.user_id, "product created");

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ProductInput,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate().map_err(AppError::BadRequest)?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    let mut active: ActiveModel = existing.into();
    apply_input(&mut active, payload);
    let product = active.update(&state.orm).await?;
    tracing::info!(product_id = %product.id, user_id = %user.user_id, "product updated");

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Product"));
    }
    tracing::info!(product_id = %id, user_id = %user.user_id, "product removed");

    Ok(ApiResponse::success(
        "Product removed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn apply_input(active: &mut ActiveModel, input: ProductInput) {
    active.name = Set(input.name.trim().to_string());
    active.price = Set(input.price);
    active.old_price = Set(input.old_price);
    active.image = Set(input.image);
    active.category = Set(input.category.as_str().to_string());
    active.count_in_stock = Set(input.count_in_stock);
    active.brand = Set(input.brand);
    active.description = Set(input.description);
    active.badge = Set(input.badge);
}

pub(crate) fn product_from_entity(model: ProductModel) -> AppResult<Product> {
    let category = Category::from_str(&model.category)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(Product {
        id: model.id,
        name: model.name,
        price: model.price,
        old_price: model.old_price,
        image: model.image,
        category,
        count_in_stock: model.count_in_stock,
        brand: model.brand,
        description: model.description,
        badge: model.badge,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
