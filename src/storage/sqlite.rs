//! SQLite storage backend using sqlx.
//!
//! Provides [`SqliteOrderStore`], an [`OrderStore`] backed by a
//! `sqlx::SqlitePool`. This is the default backend and the one used by the
//! test suite (through an in-memory database).
//!
//! # Schema
//!
//! - `orders (id, customer_name, ordered_at)`
//! - `items (id, item_code, description, quantity, order_id)` with
//!   `order_id → orders.id ON DELETE CASCADE`
//!
//! Identifiers use `AUTOINCREMENT` so that a deleted id is never handed out
//! again. Timestamps are stored as RFC 3339 text.

use crate::config::DatabaseConfig;
use crate::core::error::{ConfigError, EntityError, OrderApiResult, StorageError};
use crate::core::order::{
    Item, ItemId, NewItem, NewOrder, Order, OrderId, OrderPatch, validate_items,
    validate_new_order,
};
use crate::core::store::{OrderStore, normalize_ids};
use crate::storage::rows::{ItemRow, OrderRow, assemble, convert_items, inserted_item};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

const BACKEND: &str = "SQLite";

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_name TEXT NOT NULL CHECK (customer_name <> ''),
        ordered_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_code TEXT NOT NULL CHECK (item_code <> ''),
        description TEXT,
        quantity INTEGER NOT NULL CHECK (quantity >= 0),
        order_id INTEGER NOT NULL REFERENCES orders (id) ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS idx_items_order_id ON items (order_id)",
];

// ---------------------------------------------------------------------------
// SqliteOrderStore
// ---------------------------------------------------------------------------

/// Order storage backed by SQLite.
///
/// # Example
///
/// ```rust,ignore
/// use order_api::config::DatabaseConfig;
/// use order_api::storage::SqliteOrderStore;
///
/// let store = SqliteOrderStore::connect(&DatabaseConfig::with_url("sqlite://orders.db?mode=rwc")).await?;
/// let order = store.create(NewOrder::new("contoh").with_item(NewItem::new("A1", 2))).await?;
/// ```
#[derive(Clone, Debug)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    /// Wrap an existing pool. The schema is not touched; call
    /// [`ensure_schema`](Self::ensure_schema) if needed.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a pool for `config.url` and create the tables if missing
    ///
    /// In-memory databases get a single connection that is never recycled,
    /// since each SQLite connection would otherwise see its own empty database.
    /// File databases run in WAL mode so readers never block the writer.
    pub async fn connect(config: &DatabaseConfig) -> OrderApiResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| ConfigError::InvalidValue {
                field: "database.url".to_string(),
                value: config.url.clone(),
                message: e.to_string(),
            })?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(config.acquire_timeout_secs));

        let pool_options =
            SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));
        let in_memory = is_in_memory(&config.url);
        let options = if in_memory {
            options
        } else {
            options.journal_mode(SqliteJournalMode::Wal)
        };
        let pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(config.max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionError {
                backend: BACKEND.to_string(),
                message: e.to_string(),
            })?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        tracing::debug!(url = %config.url, "connected to SQLite");
        Ok(store)
    }

    /// A fresh private database, mainly for tests and local runs
    pub async fn in_memory() -> OrderApiResult<Self> {
        Self::connect(&DatabaseConfig::in_memory_sqlite()).await
    }

    /// Apply the required tables and indexes (idempotent)
    pub async fn ensure_schema(&self) -> OrderApiResult<()> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Close the pool; later calls fail with `StorageError::Unavailable`
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.pool.is_closed() {
            return Err(StorageError::Unavailable {
                backend: BACKEND.to_string(),
            });
        }
        Ok(())
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn transaction_error(err: sqlx::Error) -> StorageError {
    StorageError::TransactionError {
        message: err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Row helpers (run on a pooled connection or inside a transaction)
// ---------------------------------------------------------------------------

async fn fetch_order(conn: &mut SqliteConnection, id: OrderId) -> OrderApiResult<Option<Order>> {
    let row: Option<OrderRow> =
        sqlx::query_as("SELECT id, customer_name, ordered_at FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    let Some(row) = row else {
        return Ok(None);
    };

    let items: Vec<ItemRow> = sqlx::query_as(
        "SELECT id, item_code, description, quantity, order_id \
         FROM items WHERE order_id = ? ORDER BY id",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(row.into_order(convert_items(items)?)))
}

async fn insert_items(
    conn: &mut SqliteConnection,
    order_id: OrderId,
    items: Vec<NewItem>,
) -> OrderApiResult<Vec<Item>> {
    let mut inserted = Vec::with_capacity(items.len());
    for item in items {
        let id: ItemId = sqlx::query_scalar(
            "INSERT INTO items (item_code, description, quantity, order_id) \
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&item.item_code)
        .bind(&item.description)
        .bind(i64::from(item.quantity))
        .bind(order_id)
        .fetch_one(&mut *conn)
        .await?;
        inserted.push(inserted_item(id, order_id, item));
    }
    Ok(inserted)
}

fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    builder.push(" IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn create(&self, order: NewOrder) -> OrderApiResult<Order> {
        validate_new_order(&order)?;
        self.ensure_open()?;
        let ordered_at = order.resolved_ordered_at();

        let mut tx = self.pool.begin().await.map_err(transaction_error)?;

        let id: OrderId = sqlx::query_scalar(
            "INSERT INTO orders (customer_name, ordered_at) VALUES (?, ?) RETURNING id",
        )
        .bind(&order.customer_name)
        .bind(ordered_at)
        .fetch_one(&mut *tx)
        .await?;
        let items = insert_items(&mut tx, id, order.items).await?;

        tx.commit().await.map_err(transaction_error)?;

        let created = Order {
            id,
            customer_name: order.customer_name,
            ordered_at,
            items,
        };
        tracing::info!(order_id = id, items = created.items.len(), "order created");
        Ok(created)
    }

    async fn get_by_id(&self, id: OrderId) -> OrderApiResult<Order> {
        self.ensure_open()?;

        // Order row and items come from the same snapshot.
        let mut tx = self.pool.begin().await.map_err(transaction_error)?;
        let order = fetch_order(&mut tx, id)
            .await?
            .ok_or_else(|| EntityError::order_not_found(id))?;
        tx.commit().await.map_err(transaction_error)?;

        tracing::debug!(order_id = id, items = order.items.len(), "order loaded");
        Ok(order)
    }

    async fn find_by_ids(&self, ids: &[OrderId]) -> OrderApiResult<Vec<Order>> {
        let ids = normalize_ids(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_open()?;
        let mut tx = self.pool.begin().await.map_err(transaction_error)?;

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, customer_name, ordered_at FROM orders WHERE id",
        );
        push_id_list(&mut query, &ids);
        query.push(" ORDER BY id");
        let orders: Vec<OrderRow> = query.build_query_as().fetch_all(&mut *tx).await?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, item_code, description, quantity, order_id FROM items WHERE order_id",
        );
        push_id_list(&mut query, &found);
        query.push(" ORDER BY id");
        let items: Vec<ItemRow> = query.build_query_as().fetch_all(&mut *tx).await?;
        tx.commit().await.map_err(transaction_error)?;

        Ok(assemble(orders, items)?)
    }

    async fn update_by_id(&self, id: OrderId, patch: OrderPatch) -> OrderApiResult<Order> {
        if let Some(items) = &patch.items {
            validate_items(items)?;
        }
        self.ensure_open()?;

        let mut tx = self.pool.begin().await.map_err(transaction_error)?;

        // Write first: the transaction holds the write lock before it reads,
        // so concurrent writers wait on the busy timeout instead of failing.
        // Dropping `tx` on any early return rolls everything back.
        let claimed = sqlx::query("UPDATE orders SET id = id WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if claimed == 0 {
            return Err(EntityError::order_not_found(id).into());
        }

        let mut order = fetch_order(&mut tx, id)
            .await?
            .ok_or_else(|| EntityError::order_not_found(id))?;
        order.apply_patch(&patch);

        sqlx::query("UPDATE orders SET customer_name = ?, ordered_at = ? WHERE id = ?")
            .bind(&order.customer_name)
            .bind(order.ordered_at)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(items) = patch.items {
            sqlx::query("DELETE FROM items WHERE order_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            order.items = insert_items(&mut tx, id, items).await?;
        }

        tx.commit().await.map_err(transaction_error)?;

        tracing::info!(order_id = id, items = order.items.len(), "order updated");
        Ok(order)
    }

    async fn delete_by_id(&self, id: OrderId) -> OrderApiResult<()> {
        self.ensure_open()?;

        let mut tx = self.pool.begin().await.map_err(transaction_error)?;

        // Only writes, so the write lock is taken by the first statement.
        let cleared = sqlx::query("DELETE FROM items WHERE order_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let removed = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            return Err(EntityError::order_not_found(id).into());
        }

        tx.commit().await.map_err(transaction_error)?;

        tracing::info!(order_id = id, items_cleared = cleared, "order deleted");
        Ok(())
    }

    async fn get_items_by_ids(&self, ids: &[ItemId]) -> OrderApiResult<Vec<Item>> {
        let ids = normalize_ids(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_open()?;

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, item_code, description, quantity, order_id FROM items WHERE id",
        );
        push_id_list(&mut query, &ids);
        query.push(" ORDER BY id");
        let rows: Vec<ItemRow> = query.build_query_as().fetch_all(&self.pool).await?;

        Ok(convert_items(rows)?)
    }
}
