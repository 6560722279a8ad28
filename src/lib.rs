//! # order-api
//!
//! A REST service for orders and the items they own, backed by a relational
//! database.
//!
//! ## Features
//!
//! - **Aggregate persistence**: an order and its items are written in one
//!   transaction, replaced wholesale on update and cleared together on delete
//! - **Typed errors**: not-found, validation and storage failures are distinct
//!   variants mapped to 404, 400 and 500
//! - **Pluggable storage**: SQLite by default, PostgreSQL with the `postgres`
//!   feature, both behind the [`OrderStore`](core::store::OrderStore) trait
//! - **Injected state**: the store is built at startup and handed to the
//!   server, no global connection handle
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use order_api::prelude::*;
//!
//! let store = SqliteOrderStore::in_memory().await?;
//! let order = store
//!     .create(NewOrder::new("contoh").with_item(NewItem::new("A1", 2)))
//!     .await?;
//!
//! ServerBuilder::new()
//!     .with_store(store)
//!     .serve("0.0.0.0:8080")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::error::{
        ConfigError, EntityError, OrderApiError, OrderApiResult, RequestError, StorageError,
        ValidationError,
    };
    pub use crate::core::order::{Item, ItemId, NewItem, NewOrder, Order, OrderId, OrderPatch};
    pub use crate::core::store::OrderStore;

    // === Storage ===
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresOrderStore;
    pub use crate::storage::SqliteOrderStore;

    // === Config ===
    pub use crate::config::{DatabaseConfig, ServerConfig, ServiceConfig};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
}
