//! Terminal storefront for QUENX.
//!
//! ```bash
//! quenx products --category women --limit 4
//! quenx products --featured
//! quenx cart add <product-id> 2
//! quenx login -e jane@quenx.test -p user1234
//! quenx checkout
//! ```
//!
//! The cart and the session token live under `QUENX_STATE_DIR` so they
//! survive between invocations.

use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use quenx_storefront::{
    cart::{CartCommand, CartSnapshot, format_money, parse_product_id},
    config::ClientConfig,
    forms::ProductForm,
    gateway::{ApiClient, ProductFilter},
    models::{Category, Order, Product},
    storage::FileStore,
    storefront::{Gateways, Storefront},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quenx")]
#[command(author, version, about = "QUENX storefront in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[arg(short, long)]
        limit: Option<u64>,

        /// `men`, `women` or `unisex`
        #[arg(short, long, conflicts_with = "featured")]
        category: Option<Category>,

        /// Only the newest arrivals (four unless `--limit` says otherwise)
        #[arg(long)]
        featured: bool,
    },
    /// Show one product
    Product { id: String },
    /// Show one of your orders
    Order { id: String },
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Sign in with an existing account
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored credential
    Logout,
    /// Place an order for the cart contents
    Checkout,
    /// List your orders, or every order with `--all`
    Orders {
        #[arg(long)]
        all: bool,
    },
    /// Catalog management for admins
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    Show,
    Add {
        product_id: String,
        quantity: Option<String>,
    },
    Inc { product_id: String },
    Dec { product_id: String },
    Remove { product_id: String },
    Clear,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Product count, order count and revenue
    Dashboard,
    AddProduct {
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Replace every field of an existing product
    EditProduct {
        id: String,
        #[command(flatten)]
        fields: ProductFields,
    },
    DeleteProduct { id: String },
}

#[derive(Args)]
struct ProductFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: String,
    #[arg(long, default_value = "")]
    old_price: String,
    #[arg(long)]
    image: String,
    #[arg(long)]
    category: String,
    #[arg(long)]
    stock: String,
    #[arg(long)]
    brand: String,
    #[arg(long)]
    description: String,
    #[arg(long, default_value = "")]
    badge: String,
}

impl From<ProductFields> for ProductForm {
    fn from(fields: ProductFields) -> Self {
        ProductForm {
            name: fields.name,
            price: fields.price,
            old_price: fields.old_price,
            image: fields.image,
            category: fields.category,
            count_in_stock: fields.stock,
            brand: fields.brand,
            description: fields.description,
            badge: fields.badge,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::from_env();
    let api = ApiClient::from_config(&config)?;
    let storage = Arc::new(FileStore::new(config.state_dir.clone()));
    let mut shop = Storefront::open(storage, Gateways::http(api)).await;

    match cli.command {
        Commands::Products {
            limit,
            category,
            featured,
        } => {
            let products = if featured {
                shop.featured(limit.unwrap_or(4)).await?
            } else {
                shop.products(&ProductFilter { limit, category }).await?
            };
            print_products(&products);
        }
        Commands::Product { id } => {
            let product = shop.product(parse_product_id(&id)?).await?;
            print_product(&product);
        }
        Commands::Order { id } => {
            let id = id.trim().parse().context("not a valid order id")?;
            print_order(&shop.order(id).await?);
        }
        Commands::Cart { action } => {
            let command = match action.unwrap_or(CartAction::Show) {
                CartAction::Show => None,
                CartAction::Add {
                    product_id,
                    quantity,
                } => Some(CartCommand::parse(
                    "add",
                    Some(&product_id),
                    quantity.as_deref(),
                )?),
                CartAction::Inc { product_id } => {
                    Some(CartCommand::parse("inc", Some(&product_id), None)?)
                }
                CartAction::Dec { product_id } => {
                    Some(CartCommand::parse("dec", Some(&product_id), None)?)
                }
                CartAction::Remove { product_id } => {
                    Some(CartCommand::parse("remove", Some(&product_id), None)?)
                }
                CartAction::Clear => Some(CartCommand::Clear),
            };
            if let Some(command) = command {
                if shop.dispatch(command).await?.is_none() {
                    println!("That product is not in your cart.");
                }
            }
            print_cart(&shop.cart().snapshot());
        }
        Commands::Login { email, password } => {
            let user = shop.session_mut().login(&email, &password).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            let user = shop
                .session_mut()
                .register(&name, &email, &password)
                .await?;
            println!("Welcome, {}!", user.name);
        }
        Commands::Logout => {
            shop.session_mut().logout()?;
            println!("Signed out.");
        }
        Commands::Checkout => match shop.checkout().await {
            Ok(order) => {
                println!("Order placed.");
                print_order(&order);
            }
            Err(e) if e.requires_login() => {
                anyhow::bail!("{e}. Run `quenx login` first.");
            }
            Err(e) => return Err(e).context("checkout failed, your cart was kept"),
        },
        Commands::Orders { all } => {
            let orders = if all {
                shop.all_orders().await?
            } else {
                shop.my_orders().await?
            };
            if orders.is_empty() {
                println!("No orders yet.");
            }
            for order in &orders {
                print_order(order);
            }
        }
        Commands::Admin { action } => run_admin(&shop, action).await?,
    }
    Ok(())
}

async fn run_admin(shop: &Storefront, action: AdminAction) -> anyhow::Result<()> {
    match action {
        AdminAction::Dashboard => {
            let dashboard = shop.dashboard().await?;
            println!("Products: {}", dashboard.product_count);
            println!("Orders:   {}", dashboard.order_count);
            println!("Revenue:  {}", format_money(dashboard.revenue));
        }
        AdminAction::AddProduct { fields } => {
            let input = ProductForm::from(fields).parse()?;
            let product = shop.create_product(&input).await?;
            println!("Created {} ({})", product.name, product.id);
        }
        AdminAction::EditProduct { id, fields } => {
            let id = parse_product_id(&id)?;
            let input = ProductForm::from(fields).parse()?;
            let product = shop.update_product(id, &input).await?;
            println!("Updated {} ({})", product.name, product.id);
        }
        AdminAction::DeleteProduct { id } => {
            let message = shop.delete_product(parse_product_id(&id)?).await?;
            println!("{message}");
        }
    }
    Ok(())
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
    }
    for p in products {
        let badge = p.badge.as_deref().map(|b| format!(" [{b}]")).unwrap_or_default();
        println!(
            "{}  {:<28} {:>9}  {:<7} stock {}{badge}",
            p.id,
            p.name,
            format_money(p.price),
            p.category.as_str(),
            p.count_in_stock
        );
    }
}

fn print_product(p: &Product) {
    println!("{} by {}", p.name, p.brand);
    match p.old_price {
        Some(old) => println!("{} (was {})", format_money(p.price), format_money(old)),
        None => println!("{}", format_money(p.price)),
    }
    println!("{} | {} in stock", p.category, p.count_in_stock);
    println!();
    println!("{}", p.description);
}

fn print_cart(snapshot: &CartSnapshot) {
    if snapshot.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for line in &snapshot.lines {
        println!(
            "{:>3} x {:<28} {:>9}",
            line.quantity,
            line.name,
            format_money(line.line_total())
        );
    }
    let summary = &snapshot.summary;
    println!("Items:    {}", snapshot.item_count);
    println!("Subtotal: {}", format_money(summary.subtotal));
    println!("Shipping: {}", summary.shipping_label());
    println!("Tax:      {}", format_money(summary.tax));
    println!("Total:    {}", format_money(summary.total));
}

fn print_order(order: &Order) {
    println!(
        "{}  {}  {:<9} {}",
        order.id,
        order.created_at.format("%Y-%m-%d"),
        order.status.as_str(),
        format_money(order.total_amount)
    );
    for item in &order.items {
        println!("    {:>3} x {} @ {}", item.quantity, item.name, format_money(item.price));
    }
}
