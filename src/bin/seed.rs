use quenx_storefront::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    models::Category,
    services::auth_service::hash_password,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

struct SeedProduct {
    name: &'static str,
    price_cents: i64,
    old_price_cents: Option<i64>,
    image: &'static str,
    category: Category,
    count_in_stock: i32,
    brand: &'static str,
    description: &'static str,
    badge: Option<&'static str>,
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Air Stride Runner",
        price_cents: 12_999,
        old_price_cents: Some(15_999),
        image: "/images/air-stride-runner.jpg",
        category: Category::Men,
        count_in_stock: 24,
        brand: "Stride",
        description: "Lightweight running shoe with a responsive foam midsole.",
        badge: Some("Sale"),
    },
    SeedProduct {
        name: "Cloud Walk Slip-On",
        price_cents: 7_450,
        old_price_cents: None,
        image: "/images/cloud-walk-slip-on.jpg",
        category: Category::Women,
        count_in_stock: 40,
        brand: "Cloudline",
        description: "Everyday slip-on with a knit upper and cushioned insole.",
        badge: Some("New"),
    },
    SeedProduct {
        name: "Court Classic Low",
        price_cents: 8_900,
        old_price_cents: None,
        image: "/images/court-classic-low.jpg",
        category: Category::Unisex,
        count_in_stock: 15,
        brand: "Courtside",
        description: "Leather court sneaker with a vulcanized rubber sole.",
        badge: None,
    },
    SeedProduct {
        name: "Trail Grip Mid",
        price_cents: 14_500,
        old_price_cents: None,
        image: "/images/trail-grip-mid.jpg",
        category: Category::Men,
        count_in_stock: 8,
        brand: "Summit",
        description: "Waterproof mid-cut hiker with a lugged outsole.",
        badge: None,
    },
    SeedProduct {
        name: "Canvas Everyday",
        price_cents: 2_000,
        old_price_cents: Some(2_500),
        image: "/images/canvas-everyday.jpg",
        category: Category::Women,
        count_in_stock: 60,
        brand: "Stride",
        description: "Simple canvas sneaker for everyday wear.",
        badge: Some("Sale"),
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let pool = orm.get_postgres_connection_pool();

    let admin_id = ensure_user(pool, "Admin", "admin@quenx.test", "admin123", "admin").await?;
    let user_id = ensure_user(pool, "Jane Doe", "jane@quenx.test", "user1234", "user").await?;
    seed_products(pool, admin_id).await?;

    tracing::info!(%admin_id, %user_id, "seed completed");
    Ok(())
}

async fn ensure_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    tracing::info!(email, role, "ensured user");
    Ok(id)
}

async fn seed_products(pool: &PgPool, admin_id: Uuid) -> anyhow::Result<()> {
    for product in PRODUCTS {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, price, old_price, image, category, count_in_stock, brand, description, badge, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product.name)
        .bind(Decimal::new(product.price_cents, 2))
        .bind(product.old_price_cents.map(|cents| Decimal::new(cents, 2)))
        .bind(product.image)
        .bind(product.category.as_str())
        .bind(product.count_in_stock)
        .bind(product.brand)
        .bind(product.description)
        .bind(product.badge)
        .bind(admin_id)
        .execute(pool)
        .await?;
    }

    tracing::info!(count = PRODUCTS.len(), "seeded products");
    Ok(())
}
