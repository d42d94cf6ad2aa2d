//! Order Store smoke run
//!
//! Connects to the configured store, bootstraps the schema, then walks one
//! sample order through create, status change and lookup.

use anyhow::{Context, Result};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use order_core::domain::order::{Order, OrderItem};
use order_store::{OpContext, OrderRepository, PgOrderRepository, StoreConfig, db};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "order_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting order store smoke run");

    let config = StoreConfig::from_env()?;
    config.validate().context("Invalid store configuration")?;

    let repo = PgOrderRepository::connect(&config)
        .await
        .context("Failed to create database pool")?;

    db::run_migrations(repo.pool())
        .await
        .context("Failed to run database migrations")?;

    let order = sample_order()?;
    let order_id = order.id.clone();
    let ctx = OpContext::with_timeout(Duration::from_secs(30));

    repo.create_order(&ctx, order).await?;
    info!("Created order {}", order_id);

    repo.change_order_status(&ctx, &order_id, "approved").await?;
    info!("Approved order {}", order_id);

    let stored = repo.get_order_by_id(&ctx, &order_id).await?;
    println!("{}", serde_json::to_string_pretty(&stored)?);

    repo.close().await?;
    Ok(())
}

fn sample_order() -> Result<Order> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?;

    Ok(Order {
        id: format!("smoke-{}", now.as_nanos()),
        customer_id: "456".to_string(),
        status: "pending".to_string(),
        created_on: now.as_secs() as i64,
        restaurant_id: "789".to_string(),
        order_items: vec![
            OrderItem {
                product_code: "ABC123".to_string(),
                name: "Product 1".to_string(),
                unit_price: 9.99,
                quantity: 2,
            },
            OrderItem {
                product_code: "XYZ789".to_string(),
                name: "Product 2".to_string(),
                unit_price: 14.99,
                quantity: 1,
            },
        ],
    })
}
