//! Integration tests for `UpstreamClient`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no
//! real network traffic is made. Covers single and multi-page category
//! fetches, the envelope variants, every error variant a page fetch can
//! propagate, and order forwarding.

use heatshop_core::Category;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use heatshop_upstream::{UpstreamClient, UpstreamError};

/// Builds an `UpstreamClient` for tests: 5-second timeout, descriptive UA.
fn test_client(server: &MockServer) -> UpstreamClient {
    UpstreamClient::new(&server.uri(), 5, "heatshop-test/0.1")
        .expect("failed to build test UpstreamClient")
}

fn products(ids: std::ops::Range<i64>) -> Vec<serde_json::Value> {
    ids.map(|id| json!({ "id": id, "name": format!("Product {id}"), "nalichie": 1 }))
        .collect()
}

// ---------------------------------------------------------------------------
// fetch_all_category
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_all_category_returns_empty_vec_for_empty_category() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/iqos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "iqos": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server)
        .fetch_all_category(Category::Iqos, 50, 0)
        .await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    assert!(result.unwrap().is_empty());
}

#[tokio::test]
async fn fetch_all_category_stops_on_short_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "terea": products(0..3) })))
        .expect(1)
        .mount(&server)
        .await;

    let all = test_client(&server)
        .fetch_all_category(Category::Terea, 50, 0)
        .await
        .expect("fetch should succeed");

    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn fetch_all_category_walks_skip_until_short_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/devices"))
        .and(query_param("skip", "0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "devices": products(0..2) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/devices"))
        .and(query_param("skip", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "devices": products(2..4) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/devices"))
        .and(query_param("skip", "4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "devices": products(4..5) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let all = test_client(&server)
        .fetch_all_category(Category::Devices, 2, 1)
        .await
        .expect("fetch should succeed");

    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn fetch_all_category_accepts_bare_array_and_products_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/iqos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(products(0..2))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "products": products(0..1), "total": 1 })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let iqos = client.fetch_all_category(Category::Iqos, 50, 0).await.unwrap();
    let terea = client.fetch_all_category(Category::Terea, 50, 0).await.unwrap();

    assert_eq!(iqos.len(), 2);
    assert_eq!(terea.len(), 1);
}

#[tokio::test]
async fn fetch_all_category_discards_earlier_pages_on_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .and(query_param("skip", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "terea": products(0..2) })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .and(query_param("skip", "2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = test_client(&server)
        .fetch_all_category(Category::Terea, 2, 0)
        .await;

    assert!(
        matches!(
            result,
            Err(UpstreamError::UnexpectedStatus { status: 502, .. })
        ),
        "expected UnexpectedStatus(502), got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_all_category_hits_pagination_limit_on_endless_pages() {
    let server = MockServer::start().await;

    // Every page is full, so the loop never sees a short page.
    Mock::given(method("GET"))
        .and(path("/products/iqos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "iqos": products(0..1) })))
        .mount(&server)
        .await;

    let result = test_client(&server)
        .fetch_all_category(Category::Iqos, 1, 0)
        .await;

    assert!(
        matches!(result, Err(UpstreamError::PaginationLimit { max_pages: 200, .. })),
        "expected PaginationLimit, got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// fetch_category_page errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_category_page_maps_404_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/devices"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = test_client(&server)
        .fetch_category_page(Category::Devices, 0, 50)
        .await;

    assert!(
        matches!(result, Err(UpstreamError::NotFound { .. })),
        "expected NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_category_page_reports_invalid_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = test_client(&server)
        .fetch_category_page(Category::Terea, 0, 50)
        .await;

    assert!(
        matches!(result, Err(UpstreamError::Deserialize { .. })),
        "expected Deserialize, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_category_page_reports_missing_product_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 0 })))
        .mount(&server)
        .await;

    let result = test_client(&server)
        .fetch_category_page(Category::Terea, 0, 50)
        .await;

    assert!(
        matches!(result, Err(UpstreamError::UnexpectedShape { .. })),
        "expected UnexpectedShape, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_category_page_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/iqos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "iqos": [] }))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = UpstreamClient::new(&server.uri(), 1, "heatshop-test/0.1").unwrap();
    let result = client.fetch_category_page(Category::Iqos, 0, 50).await;

    assert!(
        matches!(result, Err(UpstreamError::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// submit_order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_order_forwards_body_and_relays_reply() {
    let server = MockServer::start().await;
    let order = json!({
        "customer_name": "Иван",
        "phone_number": "+79990001122",
        "is_delivery": false,
        "ordered_items": [
            { "product_name": "Terea Sienna", "quantity": 2, "price_at_time_of_order": 510.0 }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(header("content-type", "application/json"))
        .and(body_json(&order))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 77 })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = test_client(&server)
        .submit_order(&order)
        .await
        .expect("order should be forwarded");

    assert_eq!(reply.status, 201);
    assert_eq!(reply.body, json!({ "id": 77 }));
}

#[tokio::test]
async fn submit_order_relays_upstream_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "detail": "phone_number invalid" })),
        )
        .mount(&server)
        .await;

    let reply = test_client(&server)
        .submit_order(&json!({ "customer_name": "x" }))
        .await
        .unwrap();

    assert_eq!(reply.status, 422);
    assert_eq!(reply.body["detail"], "phone_number invalid");
}
