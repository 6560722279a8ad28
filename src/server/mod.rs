//! HTTP layer: handlers, routes and the server builder
//!
//! The layer depends on persistence only through [`OrderStore`](crate::core::store::OrderStore),
//! injected once via [`ServerBuilder::with_store`].

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
