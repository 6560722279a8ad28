//! HTTP handlers for order operations
//!
//! Handlers only parse input, call the [`OrderStore`] and shape the JSON
//! response. All persistence rules live behind the store.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::error::{OrderApiResult, RequestError};
use crate::core::order::{NewOrder, Order, OrderId, OrderPatch};
use crate::core::store::OrderStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }
}

/// Response carrying one order
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
}

/// Response carrying several orders
#[derive(Debug, Serialize, Deserialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
    pub count: usize,
}

/// Confirmation for mutations, with the resulting order when there is one
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

/// Query string of the batch lookup
#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    /// Comma-separated order ids, e.g. `1,2,3`
    pub ids: Option<String>,
}

/// Parse an order id from a path segment
///
/// Ids are unsigned on the wire; anything that does not fit is rejected
/// before it reaches the store.
pub fn parse_order_id(raw: &str) -> Result<OrderId, RequestError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(|id| OrderId::try_from(id).ok())
        .ok_or_else(|| RequestError::InvalidEntityId { id: raw.to_string() })
}

/// Parse the `ids` query parameter of the batch lookup
pub fn parse_id_list(raw: &str) -> Result<Vec<OrderId>, RequestError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            parse_order_id(part).map_err(|_| RequestError::InvalidQuery {
                parameter: "ids".to_string(),
                message: format!("'{}' is not a valid order id", part),
            })
        })
        .collect()
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RequestError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| RequestError::InvalidBody {
            message: rejection.body_text(),
        })
}

/// Create an order with its items
///
/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<NewOrder>, JsonRejection>,
) -> OrderApiResult<(StatusCode, Json<OrderResponse>)> {
    let new_order = json_body(payload)?;
    let order = state.store.create(new_order).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse { order })))
}

/// Get one order with its items
///
/// GET /orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> OrderApiResult<Json<OrderResponse>> {
    let id = parse_order_id(&order_id)?;
    let order = state.store.get_by_id(id).await?;
    Ok(Json(OrderResponse { order }))
}

/// Get several orders at once
///
/// GET /orders?ids=1,2,3
///
/// Ids that do not exist are left out; the request fails with 404 only when
/// none of them exist.
pub async fn get_orders(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
) -> OrderApiResult<Json<OrdersResponse>> {
    let raw = query.ids.ok_or_else(|| RequestError::InvalidQuery {
        parameter: "ids".to_string(),
        message: "a comma-separated list of order ids is required".to_string(),
    })?;
    let ids = parse_id_list(&raw)?;
    let orders = state.store.get_by_ids(&ids).await?;
    Ok(Json(OrdersResponse {
        count: orders.len(),
        orders,
    }))
}

/// Patch an order; a present `items` list replaces all previous items
///
/// PUT /orders/{order_id}
pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    payload: Result<Json<OrderPatch>, JsonRejection>,
) -> OrderApiResult<Json<MessageResponse>> {
    let id = parse_order_id(&order_id)?;
    let patch = json_body(payload)?;
    let order = state.store.update_by_id(id, patch).await?;
    Ok(Json(MessageResponse {
        message: format!("order {} updated", id),
        order: Some(order),
    }))
}

/// Delete an order and its items
///
/// DELETE /orders/{order_id}
pub async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> OrderApiResult<Json<MessageResponse>> {
    let id = parse_order_id(&order_id)?;
    state.store.delete_by_id(id).await?;
    Ok(Json(MessageResponse {
        message: format!("order {} deleted", id),
        order: None,
    }))
}
