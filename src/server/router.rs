//! Route table of the service

use crate::server::handlers::{
    AppState, create_order, delete_order, get_order, get_orders, update_order,
};
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

/// Build the order routes
///
/// - GET    /orders?ids=1,2    - Batch lookup
/// - POST   /orders            - Create an order with its items
/// - GET    /orders/{order_id} - Get one order
/// - PUT    /orders/{order_id} - Patch an order (items are replaced wholesale)
/// - DELETE /orders/{order_id} - Delete an order and its items
pub fn build_order_routes(state: AppState) -> Router {
    Router::new()
        .route("/orders", get(get_orders).post(create_order))
        .route(
            "/orders/{order_id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .with_state(state)
}

/// Build health check routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "order-api"
    }))
}
