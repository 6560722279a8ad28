//! Persistence contract for the order aggregate

use crate::core::error::{EntityError, OrderApiResult};
use crate::core::order::{Item, ItemId, NewOrder, Order, OrderId, OrderPatch};
use async_trait::async_trait;

/// Storage service for orders and their items
///
/// Implementations own every multi-row write: each mutating call runs in a
/// single transaction and either fully applies or leaves storage untouched.
/// The handler layer is agnostic to the underlying database.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Validate and insert an order together with its items
    ///
    /// An unset `ordered_at` becomes the current time. Returns the order with
    /// all generated identifiers filled in.
    async fn create(&self, order: NewOrder) -> OrderApiResult<Order>;

    /// Fetch one order and its items
    async fn get_by_id(&self, id: OrderId) -> OrderApiResult<Order>;

    /// Fetch every existing order among `ids`, ordered by id
    ///
    /// Missing ids are skipped; an empty result is not an error here.
    async fn find_by_ids(&self, ids: &[OrderId]) -> OrderApiResult<Vec<Order>>;

    /// Merge a patch into an existing order
    ///
    /// A present item list replaces the whole collection in the same
    /// transaction as the field merge.
    async fn update_by_id(&self, id: OrderId, patch: OrderPatch) -> OrderApiResult<Order>;

    /// Remove an order and all of its items
    async fn delete_by_id(&self, id: OrderId) -> OrderApiResult<()>;

    /// Fetch items by their own identifiers
    async fn get_items_by_ids(&self, ids: &[ItemId]) -> OrderApiResult<Vec<Item>>;

    /// Batch fetch
    ///
    /// - no ids: empty result
    /// - one id: same as [`get_by_id`](Self::get_by_id)
    /// - several ids: the orders that exist; fails only when none of them do
    async fn get_by_ids(&self, ids: &[OrderId]) -> OrderApiResult<Vec<Order>> {
        match ids {
            [] => Ok(Vec::new()),
            [id] => Ok(vec![self.get_by_id(*id).await?]),
            _ => {
                let orders = self.find_by_ids(ids).await?;
                if orders.is_empty() {
                    return Err(EntityError::NoneFound {
                        entity_type: "order",
                        ids: ids.to_vec(),
                    }
                    .into());
                }
                Ok(orders)
            }
        }
    }
}

/// Sort and deduplicate a batch of identifiers before querying
pub fn normalize_ids(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
