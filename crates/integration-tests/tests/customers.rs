//! Customer routes.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::{Value, json};
use storelens_integration_tests::{TestContext, admin_path};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn customer(id: i64, spent: &str, orders: u64, verified: bool) -> Value {
    json!({
        "id": id,
        "first_name": format!("First{id}"),
        "last_name": "Customer",
        "email": format!("c{id}@example.com"),
        "verified_email": verified,
        "total_spent": spent,
        "orders_count": orders,
    })
}

#[tokio::test]
async fn test_stats_over_customer_page() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path(admin_path("customers.json")))
        .and(query_param("limit", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customers": [
                customer(1, "100.00", 2, true),
                customer(2, "300.00", 4, false),
                customer(3, "0.00", 0, true),
            ]
        })))
        .expect(1)
        .mount(&ctx.shopify)
        .await;

    let res = ctx.get("/api/customers/stats").await;

    assert_eq!(res.status, StatusCode::OK);
    let stats = &res.body["data"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["verified"], 2);
    assert_eq!(stats["unverified"], 1);
    assert_eq!(stats["totalSpent"], "400.00");
    assert_eq!(stats["totalOrders"], 6);
    assert_eq!(stats["averageOrderValue"], "66.67");
    assert_eq!(stats["topCustomers"][0]["id"], 2);
    assert_eq!(stats["topCustomers"][0]["name"], "First2 Customer");
}

#[tokio::test]
async fn test_list_and_show() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path(admin_path("customers.json")))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customers": [customer(1, "1.00", 1, true), customer(2, "2.00", 1, true)]
        })))
        .mount(&ctx.shopify)
        .await;
    Mock::given(method("GET"))
        .and(path(admin_path("customers/1.json")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "customer": customer(1, "1.00", 1, true) })),
        )
        .mount(&ctx.shopify)
        .await;

    let list = ctx.get("/api/customers?limit=2").await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["count"], 2);

    let one = ctx.get("/api/customers/1").await;
    assert_eq!(one.status, StatusCode::OK);
    assert_eq!(one.body["data"]["email"], "c1@example.com");

    let missing = ctx.get("/api/customers/2").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "Customer not found");

    let invalid = ctx.get("/api/customers/x").await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}
