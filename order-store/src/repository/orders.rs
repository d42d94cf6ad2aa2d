//! Orders repository
//!
//! Handles all database operations related to orders:
//! - Creating an order with its items in one retrying transaction
//! - Changing an order's status
//! - Fetching an order header by id

use async_trait::async_trait;
use order_core::domain::order::Order;
use sqlx::{PgConnection, PgPool};
use tracing::Instrument;

use crate::config::StoreConfig;
use crate::context::OpContext;
use crate::db;
use crate::error::{RepositoryError, Result};
use crate::retry::{RetryPolicy, execute_tx};

/// Repository trait for order persistence
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts the order header and one row per item atomically
    ///
    /// The transaction is re-run on serialization conflicts; any other failure
    /// aborts it and nothing from the call persists.
    async fn create_order(&self, ctx: &OpContext, order: Order) -> Result<()>;

    /// Sets the status of an order
    ///
    /// Succeeds even when no order has the given id.
    async fn change_order_status(
        &self,
        ctx: &OpContext,
        order_id: &str,
        status: &str,
    ) -> Result<()>;

    /// Fetches the order header
    ///
    /// Items are not loaded; the returned order has an empty item list.
    /// Fails with [`RepositoryError::NotFound`] when no order has the given id.
    async fn get_order_by_id(&self, ctx: &OpContext, id: &str) -> Result<Order>;

    /// Closes the underlying pool
    async fn close(&self) -> Result<()>;
}

/// Postgres-wire implementation of OrderRepository (Postgres, CockroachDB)
#[derive(Debug, Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
    retry_policy: RetryPolicy,
    span: tracing::Span,
}

impl PgOrderRepository {
    /// Wraps an established pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            retry_policy: RetryPolicy::default(),
            span: tracing::info_span!("order_repository", rep = "postgres"),
        }
    }

    /// Connects a pool from configuration and wraps it
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = db::create_pool(config).await?;
        Ok(Self::new(pool).with_retry_policy(config.retry_policy()))
    }

    /// Overrides the retry policy used by `create_order`
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_order(&self, ctx: &OpContext, order: Order) -> Result<()> {
        let order_id = order.id.clone();
        let rows = order.row_count();

        let result = execute_tx(&self.pool, &self.retry_policy, ctx, move |conn| {
            let order = order.clone();
            Box::pin(async move { insert_order(conn, &order).await })
        })
        .instrument(self.span.clone())
        .await;

        match &result {
            Ok(()) => {
                tracing::debug!(parent: &self.span, order_id = %order_id, rows, "Order created")
            }
            Err(err) => tracing::error!(
                parent: &self.span,
                order_id = %order_id,
                error = %err,
                "Failed to create order"
            ),
        }
        result
    }

    async fn change_order_status(
        &self,
        ctx: &OpContext,
        order_id: &str,
        status: &str,
    ) -> Result<()> {
        let result = ctx
            .run(async {
                sqlx::query(
                    r#"
                    UPDATE orders
                    SET status = $1
                    WHERE id = $2
                    "#,
                )
                .bind(status)
                .bind(order_id)
                .execute(&self.pool)
                .await?;

                Ok::<(), RepositoryError>(())
            })
            .instrument(self.span.clone())
            .await;

        match &result {
            Ok(()) => {
                tracing::debug!(parent: &self.span, order_id, status, "Order status changed")
            }
            Err(err) => tracing::error!(
                parent: &self.span,
                order_id,
                error = %err,
                "Failed to change order status"
            ),
        }
        result
    }

    async fn get_order_by_id(&self, ctx: &OpContext, id: &str) -> Result<Order> {
        let result = ctx
            .run(async {
                let row = sqlx::query_as::<_, OrderRow>(
                    r#"
                    SELECT id, customerid, status, createdon, restaurantid
                    FROM orders
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

                row.map(Order::from)
                    .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
            })
            .instrument(self.span.clone())
            .await;

        match &result {
            Ok(_) => {}
            Err(err) if err.is_not_found() => {
                tracing::debug!(parent: &self.span, order_id = id, "Order not found")
            }
            Err(err) => {
                tracing::error!(parent: &self.span, order_id = id, error = %err, "Failed to fetch order")
            }
        }
        result
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        tracing::info!(parent: &self.span, "Order repository closed");
        Ok(())
    }
}

// =============================================================================
// Statements
// =============================================================================

async fn insert_order(
    conn: &mut PgConnection,
    order: &Order,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO orders (id, customerid, status, createdon, restaurantid)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&order.id)
    .bind(&order.customer_id)
    .bind(&order.status)
    .bind(order.created_on)
    .bind(&order.restaurant_id)
    .execute(&mut *conn)
    .await?;

    // Items repeat the customer id so reads avoid a join
    for item in &order.order_items {
        sqlx::query(
            r#"
            INSERT INTO orderitems (orderid, customerid, code, name, unitprice, quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(&item.product_code)
        .bind(&item.name)
        .bind(item.unit_price)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    customerid: String,
    status: String,
    createdon: i64,
    restaurantid: String,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            customer_id: row.customerid,
            status: row.status,
            created_on: row.createdon,
            restaurant_id: row.restaurantid,
            order_items: Vec::new(),
        }
    }
}
