//! Storage implementations for different backends

#[cfg(feature = "postgres")]
pub mod postgres;
mod rows;
pub mod sqlite;

#[cfg(feature = "postgres")]
pub use postgres::PostgresOrderStore;
pub use sqlite::SqliteOrderStore;

use crate::config::DatabaseConfig;
use crate::core::error::{ConfigError, OrderApiResult};
use crate::core::store::OrderStore;
use std::sync::Arc;

/// Open the backend selected by the URL scheme and make sure its schema exists
pub async fn connect(config: &DatabaseConfig) -> OrderApiResult<Arc<dyn OrderStore>> {
    match config.scheme() {
        "sqlite" => Ok(Arc::new(SqliteOrderStore::connect(config).await?)),
        #[cfg(feature = "postgres")]
        "postgres" | "postgresql" => Ok(Arc::new(PostgresOrderStore::connect(config).await?)),
        #[cfg(not(feature = "postgres"))]
        "postgres" | "postgresql" => Err(ConfigError::InvalidValue {
            field: "database.url".to_string(),
            value: "postgres".to_string(),
            message: "PostgreSQL support requires the `postgres` feature".to_string(),
        }
        .into()),
        other => Err(ConfigError::InvalidValue {
            field: "database.url".to_string(),
            value: other.to_string(),
            message: "unsupported database scheme (expected sqlite or postgres)".to_string(),
        }
        .into()),
    }
}
