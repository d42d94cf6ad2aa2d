use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::config::StoreConfig;

pub async fn create_pool(config: &StoreConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create orders table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            customerid TEXT NOT NULL,
            status TEXT NOT NULL,
            createdon BIGINT NOT NULL,
            restaurantid TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create order items table (denormalized read model)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orderitems (
            id BIGSERIAL PRIMARY KEY,
            orderid TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            customerid TEXT NOT NULL,
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            unitprice DOUBLE PRECISION NOT NULL,
            quantity INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orderitems_orderid ON orderitems(orderid)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
