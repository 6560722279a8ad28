//! Shared test harness for order store backends
//!
//! Provides payload builders, assertions, and two macro-generated suites:
//! - `order_store_tests!` validates an `OrderStore` implementation directly
//! - `rest_integration_tests!` drives the same store through the HTTP layer
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//! use store_harness::*;
//!
//! order_store_tests!(SqliteOrderStore::in_memory().await.unwrap());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod rest_tests;

use chrono::{DateTime, Duration, Utc};
use order_api::core::error::{EntityError, OrderApiError};
use order_api::core::order::{NewItem, NewOrder, Order, OrderPatch};
use order_api::core::store::OrderStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ---------------------------------------------------------------------------
// Payload builders
// ---------------------------------------------------------------------------

/// Build a create payload with the given `(item_code, quantity)` lines
pub fn new_order(customer_name: &str, lines: &[(&str, u32)]) -> NewOrder {
    lines
        .iter()
        .fold(NewOrder::new(customer_name), |order, (code, quantity)| {
            order.with_item(NewItem::new(*code, *quantity))
        })
}

/// A few distinct orders for batch lookups
pub fn sample_batch(n: usize) -> Vec<NewOrder> {
    (0..n)
        .map(|i| {
            new_order(
                &format!("customer-{}", i),
                &[("A1", (i as u32) + 1), ("B2", 1)],
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Assertions helpers
// ---------------------------------------------------------------------------

/// Assert that a timestamp lies within a few seconds of now
pub fn assert_recent(at: DateTime<Utc>) {
    let now = Utc::now();
    assert!(
        at <= now && now - at < Duration::seconds(5),
        "Expected a timestamp close to {}, got {}",
        now,
        at
    );
}

/// Assert that an order carries exactly the given `(item_code, quantity)` lines
pub fn assert_lines(order: &Order, expected: &[(&str, u32)]) {
    let lines: Vec<(&str, u32)> = order
        .items
        .iter()
        .map(|item| (item.item_code.as_str(), item.quantity))
        .collect();
    assert_eq!(lines, expected, "Unexpected items on order {}", order.id);
    for item in &order.items {
        assert_eq!(item.order_id, order.id, "Item {} points at the wrong order", item.id);
    }
}

/// Identifiers of an order's items
pub fn item_ids(order: &Order) -> Vec<i64> {
    order.items.iter().map(|item| item.id).collect()
}

// ---------------------------------------------------------------------------
// Concurrency scenarios (shared by the macro suite and file-backed tests)
// ---------------------------------------------------------------------------

/// Many writers replace the same order at once; every update must succeed
/// and the final state must come from exactly one of them.
pub async fn assert_concurrent_updates_succeed<S>(store: S, writers: u32)
where
    S: OrderStore + Clone + 'static,
{
    let order = store.create(new_order("contoh", &[("A1", 1)])).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..writers {
        let s = store.clone();
        let id = order.id;
        handles.push(tokio::spawn(async move {
            let patch = OrderPatch::default()
                .customer_name(format!("writer-{}", i))
                .items(vec![NewItem::new(format!("W{}", i), i)]);
            s.update_by_id(id, patch).await
        }));
    }
    let mut failures = Vec::new();
    for handle in handles {
        if let Err(e) = handle.await.unwrap() {
            failures.push(e);
        }
    }
    assert!(failures.is_empty(), "Concurrent updates failed: {:?}", failures);

    let fetched = store.get_by_id(order.id).await.unwrap();
    assert_eq!(fetched.items.len(), 1);
    let writer = fetched.customer_name.trim_start_matches("writer-");
    assert_eq!(fetched.items[0].item_code, format!("W{}", writer));
}

/// Two deletes race for each order: exactly one wins, the other sees NotFound.
pub async fn assert_concurrent_deletes_resolve<S>(store: S)
where
    S: OrderStore + Clone + 'static,
{
    let mut orders = Vec::new();
    for order in sample_batch(4) {
        orders.push(store.create(order).await.unwrap());
    }

    let mut handles = Vec::new();
    for order in &orders {
        for _ in 0..2 {
            let s = store.clone();
            let id = order.id;
            handles.push((id, tokio::spawn(async move { s.delete_by_id(id).await })));
        }
    }

    let mut deleted = Vec::new();
    for (id, handle) in handles {
        match handle.await.unwrap() {
            Ok(()) => deleted.push(id),
            Err(OrderApiError::Entity(EntityError::NotFound { .. })) => {}
            Err(other) => panic!("Delete of order {} failed: {:?}", id, other),
        }
    }
    deleted.sort_unstable();
    let mut expected: Vec<i64> = orders.iter().map(|o| o.id).collect();
    expected.sort_unstable();
    assert_eq!(deleted, expected, "Each order must be deleted exactly once");

    for order in &orders {
        assert!(store.get_by_id(order.id).await.is_err());
        assert!(store.get_items_by_ids(&item_ids(order)).await.unwrap().is_empty());
    }
}

/// Readers running next to a writer never see the name of one version
/// together with the items of another.
pub async fn assert_reads_see_whole_updates<S>(store: S, rounds: u32)
where
    S: OrderStore + Clone + 'static,
{
    let order = store
        .create(new_order("v0", &[("v0", 1), ("v0", 2)]))
        .await
        .unwrap();
    let id = order.id;
    let done = Arc::new(AtomicBool::new(false));

    let mut readers = Vec::new();
    for _ in 0..2 {
        let s = store.clone();
        let done = done.clone();
        readers.push(tokio::spawn(async move {
            let mut reads = 0u32;
            while !done.load(Ordering::Acquire) {
                let seen = s.get_by_id(id).await.unwrap();
                assert_eq!(seen.items.len(), 2, "Partial item set: {:?}", seen);
                for item in &seen.items {
                    assert_eq!(
                        item.item_code, seen.customer_name,
                        "Mixed versions in one read: {:?}",
                        seen
                    );
                }
                let batch = s.find_by_ids(&[id]).await.unwrap();
                assert_eq!(batch[0].items[0].item_code, batch[0].customer_name);
                reads += 1;
            }
            reads
        }));
    }

    for i in 1..=rounds {
        let version = format!("v{}", i);
        let patch = OrderPatch::default()
            .customer_name(version.clone())
            .items(vec![NewItem::new(version.clone(), 1), NewItem::new(version, 2)]);
        store.update_by_id(id, patch).await.unwrap();
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        reader.await.unwrap();
    }
}
