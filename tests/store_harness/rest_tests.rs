//! REST integration test macro for order store backends.
//!
//! The `rest_integration_tests!` macro generates HTTP-level tests that drive
//! an `OrderStore` through full round-trips:
//! JSON → HTTP request → handler → OrderStore → HTTP response → JSON.

/// Generate a REST integration test suite for a storage backend.
///
/// `$store_factory` must produce an `impl OrderStore + 'static`.
///
/// # Generated Tests
///
/// ## CRUD
/// - `test_rest_create`: POST 201 + `{"order": ...}` body
/// - `test_rest_zero_ordered_at_means_unset`: zero time is treated as absent
/// - `test_rest_get`: GET 200 + the stored order
/// - `test_rest_update`: PUT 200 + message and patched order
/// - `test_rest_delete`: DELETE 200, then GET 404
/// - `test_rest_batch_get`: GET /orders?ids=... returns the found subset
///
/// ## Error handling
/// - `test_rest_error_not_found`: unknown id → 404
/// - `test_rest_error_invalid_id`: garbage id → 400
/// - `test_rest_error_invalid_body`: malformed JSON → 400
/// - `test_rest_error_validation`: empty customer name → 400 with field list
#[macro_export]
macro_rules! rest_integration_tests {
    ($store_factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use order_api::server::ServerBuilder;
            use serde_json::{Value, json};

            async fn make_server() -> TestServer {
                let store = $store_factory;
                let router = ServerBuilder::new().with_store(store).build().unwrap();
                TestServer::try_new(router).unwrap()
            }

            async fn create(server: &TestServer, body: Value) -> Value {
                let response = server.post("/orders").json(&body).await;
                response.assert_status(StatusCode::CREATED);
                response.json::<Value>()["order"].clone()
            }

            // ==============================================================
            // CRUD
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create() {
                let server = make_server().await;

                let response = server
                    .post("/orders")
                    .json(&json!({
                        "customerName": "contoh",
                        "orderedAt": "2019-11-09T21:21:46Z",
                        "items": [
                            { "itemCode": "A1", "description": "first", "quantity": 2 }
                        ]
                    }))
                    .await;

                response.assert_status(StatusCode::CREATED);

                let body: Value = response.json();
                let order = &body["order"];
                assert!(order["id"].as_i64().unwrap() > 0);
                assert_eq!(order["customerName"], "contoh");
                assert_eq!(order["orderedAt"], "2019-11-09T21:21:46Z");
                assert_eq!(order["items"][0]["itemCode"], "A1");
                assert_eq!(order["items"][0]["description"], "first");
                assert_eq!(order["items"][0]["quantity"], 2);
                assert_eq!(order["items"][0]["orderId"], order["id"]);
            }

            #[tokio::test]
            async fn test_rest_zero_ordered_at_means_unset() {
                let server = make_server().await;
                let created = create(
                    &server,
                    json!({ "customerName": "contoh", "orderedAt": "0001-01-01T00:00:00Z" }),
                )
                .await;
                let stamped = created["orderedAt"].as_str().unwrap().to_string();
                assert!(!stamped.starts_with("0001"), "zero time was stored: {}", stamped);

                let response = server
                    .put(&format!("/orders/{}", created["id"]))
                    .json(&json!({ "orderedAt": "0001-01-01T00:00:00Z" }))
                    .await;
                response.assert_status_ok();
                assert_eq!(response.json::<Value>()["order"]["orderedAt"], stamped.as_str());
            }

            #[tokio::test]
            async fn test_rest_get() {
                let server = make_server().await;
                let created = create(
                    &server,
                    json!({ "customerName": "contoh", "items": [{ "itemCode": "A1", "quantity": 2 }] }),
                )
                .await;

                let response = server.get(&format!("/orders/{}", created["id"])).await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["order"], created);
            }

            #[tokio::test]
            async fn test_rest_update() {
                let server = make_server().await;
                let created = create(
                    &server,
                    json!({ "customerName": "contoh", "items": [{ "itemCode": "A1", "quantity": 2 }] }),
                )
                .await;
                let id = created["id"].as_i64().unwrap();

                let response = server
                    .put(&format!("/orders/{}", id))
                    .json(&json!({ "items": [{ "itemCode": "B2", "quantity": 1 }] }))
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["message"], format!("order {} updated", id));
                assert_eq!(body["order"]["customerName"], "contoh");
                assert_eq!(body["order"]["orderedAt"], created["orderedAt"]);
                let items = body["order"]["items"].as_array().unwrap();
                assert_eq!(items.len(), 1);
                assert_eq!(items[0]["itemCode"], "B2");
                assert_ne!(items[0]["id"], created["items"][0]["id"]);

                let fetched: Value = server.get(&format!("/orders/{}", id)).await.json();
                assert_eq!(fetched["order"], body["order"]);
            }

            #[tokio::test]
            async fn test_rest_update_name_only() {
                let server = make_server().await;
                let created = create(
                    &server,
                    json!({ "customerName": "contoh", "items": [{ "itemCode": "A1", "quantity": 2 }] }),
                )
                .await;

                let response = server
                    .put(&format!("/orders/{}", created["id"]))
                    .json(&json!({ "customerName": "renamed" }))
                    .await;
                response.assert_status_ok();

                let order = &response.json::<Value>()["order"];
                assert_eq!(order["customerName"], "renamed");
                assert_eq!(order["items"], created["items"]);
            }

            #[tokio::test]
            async fn test_rest_delete() {
                let server = make_server().await;
                let created = create(&server, json!({ "customerName": "contoh" })).await;
                let id = created["id"].as_i64().unwrap();

                let response = server.delete(&format!("/orders/{}", id)).await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["message"], format!("order {} deleted", id));
                assert!(body.get("order").is_none());

                server
                    .get(&format!("/orders/{}", id))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
                server
                    .delete(&format!("/orders/{}", id))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_batch_get() {
                let server = make_server().await;
                let first = create(&server, json!({ "customerName": "first" })).await;
                let second = create(&server, json!({ "customerName": "second" })).await;

                let response = server
                    .get(&format!("/orders?ids={},999999,{}", second["id"], first["id"]))
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["count"], 2);
                assert_eq!(body["orders"][0]["customerName"], "first");
                assert_eq!(body["orders"][1]["customerName"], "second");

                server
                    .get("/orders?ids=999998,999999")
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
                server
                    .get("/orders")
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
                server
                    .get("/orders?ids=1,abc")
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
            }

            // ==============================================================
            // Error handling
            // ==============================================================

            #[tokio::test]
            async fn test_rest_error_not_found() {
                let server = make_server().await;

                let response = server.get("/orders/424242").await;
                response.assert_status(StatusCode::NOT_FOUND);

                let body: Value = response.json();
                assert_eq!(body["code"], "ENTITY_NOT_FOUND");
                assert_eq!(body["details"]["id"], 424242);

                server
                    .put("/orders/424242")
                    .json(&json!({ "customerName": "ghost" }))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_error_invalid_id() {
                let server = make_server().await;

                let response = server.get("/orders/not-a-number").await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(response.json::<Value>()["code"], "INVALID_ENTITY_ID");

                server
                    .delete("/orders/-3")
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
            }

            #[tokio::test]
            async fn test_rest_error_invalid_body() {
                let server = make_server().await;

                let response = server
                    .post("/orders")
                    .json(&json!({ "customerName": 5, "items": "nope" }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(response.json::<Value>()["code"], "INVALID_BODY");

                server
                    .post("/orders")
                    .json(&json!({ "customerName": "contoh", "items": [{ "itemCode": "A1", "quantity": -1 }] }))
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
            }

            #[tokio::test]
            async fn test_rest_error_validation() {
                let server = make_server().await;

                let response = server
                    .post("/orders")
                    .json(&json!({ "customerName": "", "items": [{ "itemCode": "", "quantity": 1 }] }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);

                let body: Value = response.json();
                assert_eq!(body["code"], "VALIDATION_ERROR");
                let fields: Vec<&str> = body["details"]["fields"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|f| f["field"].as_str().unwrap())
                    .collect();
                assert_eq!(fields, vec!["customer_name", "items[0].item_code"]);
            }

            #[tokio::test]
            async fn test_rest_health() {
                let server = make_server().await;
                for path in ["/health", "/healthz"] {
                    let response = server.get(path).await;
                    response.assert_status_ok();
                    assert_eq!(response.json::<Value>()["status"], "ok");
                }
            }
        }
    };
}
