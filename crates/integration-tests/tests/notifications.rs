//! Notification feed and its read/archive state.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use storelens_integration_tests::{TestContext, admin_path};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn recent_order(id: Option<i64>, minutes_ago: i64, total: &str, financial: &str) -> Value {
    json!({
        "id": id,
        "order_number": id.map(|i| i + 1000),
        "name": id.map(|i| format!("#{}", i + 1000)),
        "created_at": (Utc::now() - Duration::minutes(minutes_ago)).to_rfc3339(),
        "total_price": total,
        "currency": "USD",
        "financial_status": financial,
        "fulfillment_status": null,
        "customer": { "id": 5, "first_name": "Grace", "last_name": "Hopper" },
        "line_items": []
    })
}

async fn mount_recent_orders(ctx: &TestContext) {
    Mock::given(method("GET"))
        .and(path(admin_path("orders.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orders": [
                recent_order(Some(1), 90, "1200.00", "paid"),
                recent_order(Some(2), 10, "25.00", "pending"),
                recent_order(None, 5, "10.00", "paid"),
            ]
        })))
        .mount(&ctx.shopify)
        .await;
}

#[tokio::test]
async fn test_list_classifies_and_skips_orders_without_id() {
    let ctx = TestContext::new().await;
    mount_recent_orders(&ctx).await;

    let res = ctx.get("/api/notifications?hours=48&limit=20").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["count"], 2);
    assert_eq!(res.body["timeRange"], "48 hours");

    let newest = &res.body["data"][0];
    assert_eq!(newest["id"], 2);
    assert_eq!(newest["orderId"], "#1002");
    assert_eq!(newest["type"], "payment-pending");
    assert_eq!(newest["priority"], "low");
    assert_eq!(newest["customer"], "Grace Hopper");
    assert_eq!(newest["read"], false);

    let big = &res.body["data"][1];
    assert_eq!(big["type"], "high-value");
    assert_eq!(big["priority"], "high");
    assert_eq!(big["orderValue"], 1200.0);
}

#[tokio::test]
async fn test_list_sends_limit_upstream() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path(admin_path("orders.json")))
        .and(query_param("limit", "50"))
        .and(query_param("status", "any"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "orders": [] })))
        .expect(1)
        .mount(&ctx.shopify)
        .await;

    let res = ctx.get("/api/notifications").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["timeRange"], "24 hours");
    assert_eq!(res.body["count"], 0);
}

#[tokio::test]
async fn test_read_and_archive_state_is_merged_into_the_feed() {
    let ctx = TestContext::new().await;
    mount_recent_orders(&ctx).await;

    let read = ctx.patch("/api/notifications/1/read").await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["notificationId"], 1);
    assert_eq!(read.body["data"], json!({ "read": true, "archived": false }));

    let archived = ctx.patch("/api/notifications/2/archive").await;
    assert_eq!(archived.body["data"], json!({ "read": false, "archived": true }));

    let feed = ctx.get("/api/notifications").await;
    let by_id = |id: i64| {
        feed.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|n| n["id"] == id)
            .cloned()
            .unwrap()
    };
    assert_eq!(by_id(1)["read"], true);
    assert_eq!(by_id(2)["archived"], true);
    assert_eq!(by_id(2)["read"], false);

    let stats = ctx.get("/api/notifications/stats").await;
    assert_eq!(
        stats.body["data"],
        json!({ "total": 2, "read": 1, "unread": 1, "archived": 1, "active": 1 })
    );
}

#[tokio::test]
async fn test_mark_all_read_skips_archived() {
    let ctx = TestContext::new().await;

    ctx.patch("/api/notifications/10/archive").await;
    ctx.patch("/api/notifications/11/read").await;
    ctx.patch("/api/notifications/12/read").await;

    let res = ctx.patch("/api/notifications/mark-all-read").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["count"], 2);
    assert_eq!(res.body["message"], "2 notifications marked as read");

    let stats = ctx.get("/api/notifications/stats").await;
    assert_eq!(stats.body["data"]["read"], 2);
    assert_eq!(stats.body["data"]["archived"], 1);
}

#[tokio::test]
async fn test_parameter_validation() {
    let ctx = TestContext::new().await;

    for uri in [
        "/api/notifications?hours=0",
        "/api/notifications?hours=169",
        "/api/notifications?limit=101",
    ] {
        let res = ctx.get(uri).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{uri}");
    }

    let res = ctx.patch("/api/notifications/abc/read").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Valid notification ID is required");
}
