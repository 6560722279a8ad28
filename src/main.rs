//! order-api server binary
//!
//! Usage: `order-api [config.yaml]`
//!
//! The config path may also come from `ORDER_API_CONFIG`. Without one, the
//! defaults apply (SQLite file `orders.db`, listening on 0.0.0.0:8080).
//! `ORDER_API_DATABASE_URL` and `ORDER_API_BIND` override the loaded values.

use anyhow::{Context, Result};
use order_api::config::{ENV_CONFIG_PATH, ServiceConfig};
use order_api::server::ServerBuilder;
use order_api::storage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("order_api=info,tower_http=info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok());
    let config = match config_path {
        Some(path) => ServiceConfig::from_yaml_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => ServiceConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;

    tracing::info!(backend = config.database.scheme(), "opening database");
    let store = storage::connect(&config.database)
        .await
        .context("connecting to the database")?;

    ServerBuilder::new()
        .with_shared_store(store)
        .serve(&config.server.bind)
        .await
}
