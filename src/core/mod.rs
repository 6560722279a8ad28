//! Core module containing the order model, its errors and the storage contract

pub mod error;
pub mod order;
pub mod store;

pub use error::{OrderApiError, OrderApiResult};
pub use order::{Item, ItemId, NewItem, NewOrder, Order, OrderId, OrderPatch};
pub use store::OrderStore;
