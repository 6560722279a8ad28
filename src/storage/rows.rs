//! Row types shared by the SQL backends and the assembly of orders from rows

use crate::core::error::StorageError;
use crate::core::order::{Item, ItemId, NewItem, Order, OrderId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One row of the `orders` table
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderRow {
    pub id: OrderId,
    pub customer_name: String,
    pub ordered_at: DateTime<Utc>,
}

/// One row of the `items` table
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemRow {
    pub id: ItemId,
    pub item_code: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub order_id: OrderId,
}

impl TryFrom<ItemRow> for Item {
    type Error = StorageError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| StorageError::IntegrityError {
            message: format!("item {} has out-of-range quantity {}", row.id, row.quantity),
        })?;
        Ok(Item {
            id: row.id,
            item_code: row.item_code,
            description: row.description,
            quantity,
            order_id: row.order_id,
        })
    }
}

impl OrderRow {
    pub fn into_order(self, items: Vec<Item>) -> Order {
        Order {
            id: self.id,
            customer_name: self.customer_name,
            ordered_at: self.ordered_at,
            items,
        }
    }
}

/// Build an item from its insert payload and the generated identifier
pub(crate) fn inserted_item(id: ItemId, order_id: OrderId, item: NewItem) -> Item {
    Item {
        id,
        item_code: item.item_code,
        description: item.description,
        quantity: item.quantity,
        order_id,
    }
}

pub(crate) fn convert_items(rows: Vec<ItemRow>) -> Result<Vec<Item>, StorageError> {
    rows.into_iter().map(Item::try_from).collect()
}

/// Attach each item to its order, keeping the order of both inputs
pub(crate) fn assemble(orders: Vec<OrderRow>, items: Vec<ItemRow>) -> Result<Vec<Order>, StorageError> {
    let mut by_order: HashMap<OrderId, Vec<Item>> = HashMap::new();
    for row in items {
        let item = Item::try_from(row)?;
        by_order.entry(item.order_id).or_default().push(item);
    }
    Ok(orders
        .into_iter()
        .map(|row| {
            let items = by_order.remove(&row.id).unwrap_or_default();
            row.into_order(items)
        })
        .collect())
}
